//! # Consensus Locations: Positions in the Bridge Topology
//!
//! A location is a number of steps *up* the hierarchy (`parents`) followed by
//! a path of steps *down* (`Junction`s). Two junction kinds are enough for a
//! bridge: `GlobalConsensus` selects a whole consensus system (a relay chain
//! and everything under it), `Parachain` selects one chain inside it.
//!
//! ```text
//! (parents: 2, [GlobalConsensus(Rococo)])
//!      │                    │
//!      │                    └── then enter the Rococo consensus
//!      └── from a parachain: up to the relay chain, up to the global root
//! ```
//!
//! ## Invariant
//!
//! At most one `GlobalConsensus` junction, and if present it is the first
//! element of the path. [`ConsensusLocation::new()`] is the only constructor
//! and enforces this; deserialization goes through the same check.
//!
//! ## Encoding
//!
//! `NetworkId` derives SCALE `Encode` with explicit indices matching the
//! cross-consensus wire format. Derived accounts hash these bytes, so the
//! indices must never be renumbered.

use std::fmt;

use parity_scale_codec::Encode;
use serde::{Deserialize, Serialize};

use crate::error::LocationError;

/// Identifier of a global consensus system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Serialize, Deserialize)]
pub enum NetworkId {
    /// Network identified by its genesis hash.
    #[codec(index = 0)]
    ByGenesis([u8; 32]),
    /// Network that forked from another at a given block.
    #[codec(index = 1)]
    ByFork {
        /// Block number of the fork point.
        block_number: u64,
        /// Hash of the fork block.
        block_hash: [u8; 32],
    },
    /// The Polkadot relay chain.
    #[codec(index = 2)]
    Polkadot,
    /// The Kusama relay chain.
    #[codec(index = 3)]
    Kusama,
    /// The Westend test relay chain.
    #[codec(index = 4)]
    Westend,
    /// The Rococo test relay chain.
    #[codec(index = 5)]
    Rococo,
    /// The Wococo test relay chain.
    #[codec(index = 6)]
    Wococo,
    /// An Ethereum network, by EIP-155 chain id.
    #[codec(index = 7)]
    Ethereum {
        /// EIP-155 chain id.
        #[codec(compact)]
        chain_id: u64,
    },
    /// Bitcoin.
    #[codec(index = 8)]
    BitcoinCore,
    /// Bitcoin Cash.
    #[codec(index = 9)]
    BitcoinCash,
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByGenesis(hash) => write!(f, "ByGenesis(0x{})", hex::encode(hash)),
            Self::ByFork { block_number, .. } => write!(f, "ByFork(#{block_number})"),
            Self::Polkadot => f.write_str("Polkadot"),
            Self::Kusama => f.write_str("Kusama"),
            Self::Westend => f.write_str("Westend"),
            Self::Rococo => f.write_str("Rococo"),
            Self::Wococo => f.write_str("Wococo"),
            Self::Ethereum { chain_id } => write!(f, "Ethereum({chain_id})"),
            Self::BitcoinCore => f.write_str("BitcoinCore"),
            Self::BitcoinCash => f.write_str("BitcoinCash"),
        }
    }
}

/// One step down the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Junction {
    /// A whole consensus system.
    GlobalConsensus(NetworkId),
    /// A parachain by id, within the current consensus.
    Parachain(u32),
}

impl fmt::Display for Junction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GlobalConsensus(n) => write!(f, "GlobalConsensus({n})"),
            Self::Parachain(id) => write!(f, "Parachain({id})"),
        }
    }
}

/// Unvalidated wire shape of a location, used only for deserialization.
#[derive(Deserialize)]
struct RawLocation {
    parents: u8,
    #[serde(default)]
    path: Vec<Junction>,
}

/// A validated position in the topology.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLocation")]
pub struct ConsensusLocation {
    parents: u8,
    path: Vec<Junction>,
}

impl TryFrom<RawLocation> for ConsensusLocation {
    type Error = LocationError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        Self::new(raw.parents, raw.path)
    }
}

impl ConsensusLocation {
    /// Build a location, checking the `GlobalConsensus` placement invariant.
    pub fn new(parents: u8, path: Vec<Junction>) -> Result<Self, LocationError> {
        let mut seen = false;
        for (index, junction) in path.iter().enumerate() {
            if let Junction::GlobalConsensus(_) = junction {
                if seen {
                    return Err(LocationError::DuplicateGlobalConsensus { index });
                }
                if index != 0 {
                    return Err(LocationError::MisplacedGlobalConsensus { index });
                }
                seen = true;
            }
        }
        Ok(Self { parents, path })
    }

    /// The location of the current context (`(0, [])`).
    pub fn here() -> Self {
        Self {
            parents: 0,
            path: Vec::new(),
        }
    }

    /// `(parents, [Parachain(id)])`.
    pub fn parachain(parents: u8, id: u32) -> Self {
        Self {
            parents,
            path: vec![Junction::Parachain(id)],
        }
    }

    /// `(parents, [GlobalConsensus(network)])`.
    pub fn global_consensus(parents: u8, network: NetworkId) -> Self {
        Self {
            parents,
            path: vec![Junction::GlobalConsensus(network)],
        }
    }

    /// `(parents, [GlobalConsensus(network), Parachain(id)])`.
    pub fn global_parachain(parents: u8, network: NetworkId, id: u32) -> Self {
        Self {
            parents,
            path: vec![Junction::GlobalConsensus(network), Junction::Parachain(id)],
        }
    }

    /// Number of levels this location ascends before descending.
    pub fn parents(&self) -> u8 {
        self.parents
    }

    /// The descending path.
    pub fn path(&self) -> &[Junction] {
        &self.path
    }

    /// The leading `GlobalConsensus`, if any.
    pub fn global_network(&self) -> Option<NetworkId> {
        match self.path.first() {
            Some(Junction::GlobalConsensus(n)) => Some(*n),
            _ => None,
        }
    }

    /// Interpret `relative` from the point of view of `self`.
    ///
    /// Each parent of `relative` removes one trailing junction of `self`;
    /// the remaining junctions of `relative` are then appended. The result is
    /// re-validated, so `[GlobalConsensus(A)] + (0, [GlobalConsensus(B)])`
    /// fails rather than producing a doubly-rooted path.
    pub fn appended_with(&self, relative: &ConsensusLocation) -> Result<Self, LocationError> {
        let ascend = usize::from(relative.parents);
        if ascend > self.path.len() {
            return Err(LocationError::AscendsPastRoot {
                parents: relative.parents,
                depth: self.path.len(),
            });
        }
        let keep = self.path.len() - ascend;
        let mut path = self.path[..keep].to_vec();
        path.extend_from_slice(&relative.path);
        Self::new(self.parents, path)
    }
}

impl fmt::Display for ConsensusLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, [", self.parents)?;
        for (i, junction) in self.path.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{junction}")?;
        }
        f.write_str("])")
    }
}

/// The location of the deriving chain relative to the global root.
///
/// `parents` is always 0 and the path always starts with the chain's own
/// `GlobalConsensus`. Fixed per deploying chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ConsensusLocation", into = "ConsensusLocation")]
pub struct UniversalLocation {
    network: NetworkId,
    location: ConsensusLocation,
}

impl TryFrom<ConsensusLocation> for UniversalLocation {
    type Error = LocationError;

    fn try_from(location: ConsensusLocation) -> Result<Self, Self::Error> {
        Self::new(location)
    }
}

impl From<UniversalLocation> for ConsensusLocation {
    fn from(universal: UniversalLocation) -> Self {
        universal.location
    }
}

impl UniversalLocation {
    /// Wrap a location, requiring it to be rooted in a global consensus.
    pub fn new(location: ConsensusLocation) -> Result<Self, LocationError> {
        if location.parents != 0 {
            return Err(LocationError::NotRooted {
                parents: location.parents,
            });
        }
        let network = location
            .global_network()
            .ok_or(LocationError::MissingGlobalConsensus)?;
        Ok(Self { network, location })
    }

    /// Universal location of a parachain: `(0, [GlobalConsensus(n), Parachain(id)])`.
    pub fn of_parachain(network: NetworkId, id: u32) -> Self {
        Self {
            network,
            location: ConsensusLocation::global_parachain(0, network, id),
        }
    }

    /// Universal location of a relay chain: `(0, [GlobalConsensus(n)])`.
    pub fn of_relay(network: NetworkId) -> Self {
        Self {
            network,
            location: ConsensusLocation::global_consensus(0, network),
        }
    }

    /// The local consensus this chain belongs to.
    pub fn network(&self) -> NetworkId {
        self.network
    }

    /// The underlying location.
    pub fn as_location(&self) -> &ConsensusLocation {
        &self.location
    }

    /// Resolve `relative` into a rooted path seen from the global root.
    pub fn resolve(&self, relative: &ConsensusLocation) -> Result<Vec<Junction>, LocationError> {
        Ok(self.location.appended_with(relative)?.path)
    }
}

impl fmt::Display for UniversalLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.location.fmt(f)
    }
}

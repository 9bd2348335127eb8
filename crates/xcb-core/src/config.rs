//! # Bridge Configuration
//!
//! One immutable [`BridgeConfig`] describes both sides of the bridge: where
//! each chain's endpoints are, which consensus it belongs to, which signer
//! and mortality its relayer submissions use, and the lane being served.
//!
//! Loaded once at startup from YAML and passed by reference. Fields omitted
//! from the file take the values of the local Rococo/Wococo test bridge
//! ([`BridgeConfig::rococo_wococo_local`]).
//!
//! ## Validation
//!
//! [`BridgeConfig::validate()`] runs on every load. A config that names the
//! same consensus on both sides, reuses a chain-pair tag, or disables the
//! mortality window is rejected before any derivation or submission.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::identity::{ChainPairTag, LaneId};
use crate::location::{NetworkId, UniversalLocation};

/// Highest prefix representable in the two-byte SS58 form.
pub const MAX_SS58_PREFIX: u16 = 16_383;

/// One of the two bridged sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// The first side (Rococo in the local setup).
    A,
    /// The second side (Wococo in the local setup).
    B,
}

impl Side {
    /// The opposite side.
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// Both sides, A first.
    pub fn both() -> [Side; 2] {
        [Side::A, Side::B]
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}

/// A node's RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEndpoint {
    pub host: String,
    pub port: u16,
}

impl ChainEndpoint {
    /// HTTP URL for JSON-RPC requests.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// A parachain node's RPC endpoint plus its parachain id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParachainEndpoint {
    pub host: String,
    pub port: u16,
    pub para_id: u32,
}

impl ParachainEndpoint {
    /// The endpoint without the parachain id.
    pub fn endpoint(&self) -> ChainEndpoint {
        ChainEndpoint {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

/// How the relayer learns the runtime version of a chain it submits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VersionMode {
    /// Query the node for the current runtime version.
    #[default]
    Auto,
    /// Use the version bundled with the relayer.
    Bundle,
    /// Use the given versions.
    Explicit {
        spec_version: u32,
        transaction_version: u32,
    },
}

/// Bounded exponential backoff for collaborator calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on each subsequent one.
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 200,
        }
    }
}

/// Everything known about one side of the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideConfig {
    /// Short chain name used in relayer subcommands (`rococo`).
    pub name: String,
    /// The side's global consensus.
    pub network: NetworkId,
    /// Relay chain node; the source of finality proofs.
    pub relay_chain: ChainEndpoint,
    /// Bridge hub parachain; hosts the bridge pallets and reward pots.
    pub bridge_hub: ParachainEndpoint,
    /// Asset hub parachain; holds bridged reserves.
    pub asset_hub: ParachainEndpoint,
    /// Tag naming the bridged chain as seen from this side.
    pub chain_pair_tag: ChainPairTag,
    /// Pallet on this side's bridge hub tracking the remote finality.
    pub finality_pallet: String,
    /// Signer of relayer transactions on this side's bridge hub.
    pub signer: String,
    /// Signer for header submissions into this side's bridge hub.
    pub headers_signer: String,
    /// Signer for parachain-head submissions into this side's bridge hub.
    pub parachains_signer: String,
    /// Mortality, in blocks, of transactions submitted to this side.
    pub transactions_mortality: u32,
    #[serde(default)]
    pub version_mode: VersionMode,
    /// Minimum free balance of each reward pot before the relay launches.
    #[serde(default)]
    pub reward_pot_minimum: u128,
}

impl SideConfig {
    /// Universal location of this side's asset hub.
    pub fn asset_hub_universal(&self) -> UniversalLocation {
        UniversalLocation::of_parachain(self.network, self.asset_hub.para_id)
    }

    /// Universal location of this side's bridge hub.
    pub fn bridge_hub_universal(&self) -> UniversalLocation {
        UniversalLocation::of_parachain(self.network, self.bridge_hub.para_id)
    }

    /// Local Rococo side.
    pub fn rococo_local() -> Self {
        Self {
            name: "rococo".to_string(),
            network: NetworkId::Rococo,
            relay_chain: ChainEndpoint {
                host: "localhost".to_string(),
                port: 9942,
            },
            bridge_hub: ParachainEndpoint {
                host: "localhost".to_string(),
                port: 8943,
                para_id: 1013,
            },
            asset_hub: ParachainEndpoint {
                host: "localhost".to_string(),
                port: 9910,
                para_id: 1000,
            },
            chain_pair_tag: ChainPairTag(*b"bhwo"),
            finality_pallet: "BridgeWococoGrandpa".to_string(),
            signer: "//Charlie".to_string(),
            headers_signer: "//Bob".to_string(),
            parachains_signer: "//Bob".to_string(),
            transactions_mortality: 4,
            version_mode: VersionMode::Auto,
            reward_pot_minimum: 1_000_000_000_000,
        }
    }

    /// Local Wococo side.
    pub fn wococo_local() -> Self {
        Self {
            name: "wococo".to_string(),
            network: NetworkId::Wococo,
            relay_chain: ChainEndpoint {
                host: "localhost".to_string(),
                port: 9945,
            },
            bridge_hub: ParachainEndpoint {
                host: "localhost".to_string(),
                port: 8945,
                para_id: 1014,
            },
            asset_hub: ParachainEndpoint {
                host: "localhost".to_string(),
                port: 9010,
                para_id: 1000,
            },
            chain_pair_tag: ChainPairTag(*b"bhro"),
            finality_pallet: "BridgeRococoGrandpa".to_string(),
            signer: "//Charlie".to_string(),
            headers_signer: "//Bob".to_string(),
            parachains_signer: "//Bob".to_string(),
            transactions_mortality: 4,
            version_mode: VersionMode::Auto,
            reward_pot_minimum: 1_000_000_000_000,
        }
    }
}

/// Complete bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Lane served by the relay.
    pub lane: LaneId,
    /// SS58 address prefix for human-readable output.
    pub ss58_prefix: u16,
    /// Relayer executable, resolved through `PATH` when not absolute.
    pub relay_binary: String,
    /// Delay between finality polls while waiting for inclusion.
    pub poll_interval_ms: u64,
    /// Fresh submissions allowed after the first one expires.
    pub max_resubmissions: u32,
    pub retry: RetryConfig,
    pub side_a: SideConfig,
    pub side_b: SideConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::rococo_wococo_local()
    }
}

impl BridgeConfig {
    /// The local Rococo/Wococo bridge.
    pub fn rococo_wococo_local() -> Self {
        Self {
            lane: LaneId([0, 0, 0, 1]),
            ss58_prefix: 42,
            relay_binary: "substrate-relay".to_string(),
            poll_interval_ms: 6_000,
            max_resubmissions: 3,
            retry: RetryConfig::default(),
            side_a: SideConfig::rococo_local(),
            side_b: SideConfig::wococo_local(),
        }
    }

    /// Read, parse and validate a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// The configuration of `side`.
    pub fn side(&self, side: Side) -> &SideConfig {
        match side {
            Side::A => &self.side_a,
            Side::B => &self.side_b,
        }
    }

    /// Reject configurations that cannot describe a working bridge.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.side_a.network == self.side_b.network {
            return Err(ConfigError::invalid(
                "side_b.network",
                format!("both sides use {}", self.side_a.network),
            ));
        }
        if self.side_a.name == self.side_b.name {
            return Err(ConfigError::invalid(
                "side_b.name",
                format!("both sides are named {:?}", self.side_a.name),
            ));
        }
        if self.side_a.chain_pair_tag == self.side_b.chain_pair_tag {
            return Err(ConfigError::invalid(
                "side_b.chain_pair_tag",
                format!("both sides use tag {}", self.side_a.chain_pair_tag),
            ));
        }
        if self.max_resubmissions == 0 {
            return Err(ConfigError::invalid("max_resubmissions", "must be at least 1"));
        }
        if self.ss58_prefix > MAX_SS58_PREFIX {
            return Err(ConfigError::invalid(
                "ss58_prefix",
                format!("{} exceeds {MAX_SS58_PREFIX}", self.ss58_prefix),
            ));
        }
        for (key, side) in [("side_a", &self.side_a), ("side_b", &self.side_b)] {
            if side.transactions_mortality == 0 {
                return Err(ConfigError::invalid(
                    format!("{key}.transactions_mortality"),
                    "must be at least 1 block",
                ));
            }
            if side.bridge_hub.para_id == side.asset_hub.para_id {
                return Err(ConfigError::invalid(
                    format!("{key}.asset_hub.para_id"),
                    "asset hub and bridge hub share a parachain id",
                ));
            }
            if side.finality_pallet.is_empty() {
                return Err(ConfigError::invalid(format!("{key}.finality_pallet"), "must not be empty"));
            }
        }
        Ok(())
    }
}

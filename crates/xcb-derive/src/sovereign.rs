//! # Sovereign Account Derivation
//!
//! Maps a location, seen from a deriving chain, to the 32-byte account that
//! chain uses to represent it. Three kinds share one step: SCALE-encode
//! `(domain_tag, payload)` and reduce the bytes to 32. They differ only in
//! the tag, the shape the location must resolve to, and the reduction.
//!
//! | Kind                       | Resolved shape                      | Bytes                                   | Reduction   |
//! |----------------------------|-------------------------------------|-----------------------------------------|-------------|
//! | `GlobalConsensus`          | `[GlobalConsensus(n)]`, `n` remote  | `"glblcnsnss_" ++ enc(n)`               | blake2-256  |
//! | `GlobalConsensusParachain` | `[GlobalConsensus(n), Parachain(p)]`| `"glblcnsnss/prchn_" ++ enc(n) ++ le(p)`| blake2-256  |
//! | `SiblingParachain`         | input is exactly `(1, [Parachain])` | `"sibl" ++ le(p)`                       | zero-pad    |
//!
//! ## Security Invariant
//!
//! These bytes are consensus-critical: every chain in the topology must
//! compute the same account for the same location, or reserves become
//! unreachable. Any change to a tag, an encoding or a reduction requires
//! bumping [`DERIVATION_SCHEME_VERSION`] and a coordinated migration.

use std::fmt;

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use parity_scale_codec::Encode;
use serde::{Deserialize, Serialize};
use xcb_core::{ConsensusLocation, Junction, LocationError, NetworkId, SovereignAccount, UniversalLocation};

use crate::error::DeriveError;

/// Version of the tag/encoding/reduction scheme implemented here.
pub const DERIVATION_SCHEME_VERSION: u32 = 1;

const GLOBAL_CONSENSUS_TAG: &[u8; 11] = b"glblcnsnss_";
const GLOBAL_CONSENSUS_PARACHAIN_TAG: &[u8; 17] = b"glblcnsnss/prchn_";
const SIBLING_TAG: &[u8; 4] = b"sibl";

/// How the encoded bytes are reduced to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reduction {
    /// blake2b with a 32-byte output.
    Blake2_256,
    /// First 32 bytes, zero-padded if shorter.
    Truncate,
}

impl Reduction {
    pub(crate) fn apply(self, bytes: &[u8]) -> SovereignAccount {
        match self {
            Self::Blake2_256 => SovereignAccount::from_bytes(blake2_256(bytes)),
            Self::Truncate => SovereignAccount::from_bytes(truncate_32(bytes)),
        }
    }
}

/// The derivation algorithm to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DerivationKind {
    /// Account of a whole remote consensus.
    GlobalConsensus,
    /// Account of a parachain inside a remote consensus.
    GlobalConsensusParachain,
    /// Account of a parachain under the same relay chain.
    SiblingParachain,
}

impl DerivationKind {
    /// All kinds.
    pub const ALL: [DerivationKind; 3] = [
        Self::GlobalConsensus,
        Self::GlobalConsensusParachain,
        Self::SiblingParachain,
    ];

    /// Stable name used in errors and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GlobalConsensus => "GlobalConsensus",
            Self::GlobalConsensusParachain => "GlobalConsensusParachain",
            Self::SiblingParachain => "SiblingParachain",
        }
    }

    fn reduction(&self) -> Reduction {
        match self {
            Self::GlobalConsensus | Self::GlobalConsensusParachain => Reduction::Blake2_256,
            Self::SiblingParachain => Reduction::Truncate,
        }
    }

    fn expected_shape(&self) -> &'static str {
        match self {
            Self::GlobalConsensus => "a location resolving to [GlobalConsensus(remote)]",
            Self::GlobalConsensusParachain => {
                "a location resolving to [GlobalConsensus(remote), Parachain(id)]"
            }
            Self::SiblingParachain => "(1, [Parachain(id)])",
        }
    }

    fn shape_error(&self, location: &ConsensusLocation) -> LocationError {
        LocationError::UnsupportedShape {
            kind: self.as_str(),
            expected: self.expected_shape(),
            actual: location.to_string(),
        }
    }
}

impl fmt::Display for DerivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the sovereign account of `location` as seen from `universal`.
///
/// Pure: the same inputs always yield the same account.
pub fn derive(
    kind: DerivationKind,
    location: &ConsensusLocation,
    universal: &UniversalLocation,
) -> Result<SovereignAccount, DeriveError> {
    let account = match kind {
        DerivationKind::SiblingParachain => match (location.parents(), location.path()) {
            (1, [Junction::Parachain(id)]) => encode_and_reduce(kind, SIBLING_TAG, id),
            _ => return Err(kind.shape_error(location).into()),
        },
        DerivationKind::GlobalConsensus => {
            let resolved = universal.resolve(location)?;
            match resolved.as_slice() {
                [Junction::GlobalConsensus(network)] => {
                    ensure_remote(*network, universal)?;
                    encode_and_reduce(kind, GLOBAL_CONSENSUS_TAG, network)
                }
                _ => return Err(kind.shape_error(location).into()),
            }
        }
        DerivationKind::GlobalConsensusParachain => {
            let resolved = universal.resolve(location)?;
            match resolved.as_slice() {
                [Junction::GlobalConsensus(network), Junction::Parachain(id)] => {
                    ensure_remote(*network, universal)?;
                    encode_and_reduce(kind, GLOBAL_CONSENSUS_PARACHAIN_TAG, &(network, id))
                }
                _ => return Err(kind.shape_error(location).into()),
            }
        }
    };
    tracing::trace!(kind = %kind, location = %location, from = %universal, account = %account, "derived sovereign account");
    Ok(account)
}

fn ensure_remote(network: NetworkId, universal: &UniversalLocation) -> Result<(), LocationError> {
    if network == universal.network() {
        return Err(LocationError::NotRemote {
            network: network.to_string(),
        });
    }
    Ok(())
}

fn encode_and_reduce<T: Encode + ?Sized>(kind: DerivationKind, tag: &[u8], payload: &T) -> SovereignAccount {
    let mut bytes = tag.to_vec();
    payload.encode_to(&mut bytes);
    kind.reduction().apply(&bytes)
}

/// blake2b-256 of `data`.
pub(crate) fn blake2_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// First 32 bytes of `data`, zero-padded.
pub(crate) fn truncate_32(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let len = data.len().min(32);
    out[..len].copy_from_slice(&data[..len]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wococo_asset_hub() -> UniversalLocation {
        UniversalLocation::of_parachain(NetworkId::Wococo, 1000)
    }

    #[test]
    fn global_consensus_hashes_tag_and_network() {
        let loc = ConsensusLocation::global_consensus(2, NetworkId::Rococo);
        let account = derive(DerivationKind::GlobalConsensus, &loc, &wococo_asset_hub()).unwrap();
        let mut preimage = b"glblcnsnss_".to_vec();
        preimage.push(5);
        assert_eq!(account.as_bytes(), &blake2_256(&preimage));
    }

    #[test]
    fn global_consensus_rejects_local_network() {
        let loc = ConsensusLocation::global_consensus(2, NetworkId::Wococo);
        let err = derive(DerivationKind::GlobalConsensus, &loc, &wococo_asset_hub()).unwrap_err();
        assert!(matches!(err, DeriveError::InvalidLocation(LocationError::NotRemote { .. })));
    }

    #[test]
    fn global_consensus_rejects_parachain_target() {
        let loc = ConsensusLocation::global_parachain(2, NetworkId::Rococo, 1000);
        let err = derive(DerivationKind::GlobalConsensus, &loc, &wococo_asset_hub()).unwrap_err();
        assert!(matches!(
            err,
            DeriveError::InvalidLocation(LocationError::UnsupportedShape { .. })
        ));
    }

    #[test]
    fn global_consensus_rejects_ascent_past_root() {
        let loc = ConsensusLocation::global_consensus(3, NetworkId::Rococo);
        let err = derive(DerivationKind::GlobalConsensus, &loc, &wococo_asset_hub()).unwrap_err();
        assert!(matches!(
            err,
            DeriveError::InvalidLocation(LocationError::AscendsPastRoot { .. })
        ));
    }

    #[test]
    fn relative_location_resolves_per_deriving_chain() {
        let relay = UniversalLocation::of_relay(NetworkId::Wococo);
        let two_up = ConsensusLocation::global_consensus(2, NetworkId::Rococo);
        let one_up = ConsensusLocation::global_consensus(1, NetworkId::Rococo);

        let from_parachain = derive(DerivationKind::GlobalConsensus, &two_up, &wococo_asset_hub()).unwrap();
        let from_relay = derive(DerivationKind::GlobalConsensus, &one_up, &relay).unwrap();
        assert_eq!(from_parachain, from_relay);

        assert!(derive(DerivationKind::GlobalConsensus, &two_up, &relay).is_err());
        assert!(derive(DerivationKind::GlobalConsensus, &one_up, &wococo_asset_hub()).is_err());
    }

    #[test]
    fn global_parachain_includes_para_id() {
        let a = derive(
            DerivationKind::GlobalConsensusParachain,
            &ConsensusLocation::global_parachain(2, NetworkId::Rococo, 1000),
            &wococo_asset_hub(),
        )
        .unwrap();
        let b = derive(
            DerivationKind::GlobalConsensusParachain,
            &ConsensusLocation::global_parachain(2, NetworkId::Rococo, 1013),
            &wococo_asset_hub(),
        )
        .unwrap();
        assert_ne!(a, b);

        let mut preimage = b"glblcnsnss/prchn_".to_vec();
        preimage.push(5);
        preimage.extend_from_slice(&1000u32.to_le_bytes());
        assert_eq!(a.as_bytes(), &blake2_256(&preimage));
    }

    #[test]
    fn sibling_is_zero_padded() {
        let account = derive(
            DerivationKind::SiblingParachain,
            &ConsensusLocation::parachain(1, 1013),
            &wococo_asset_hub(),
        )
        .unwrap();
        let mut expected = [0u8; 32];
        expected[..4].copy_from_slice(b"sibl");
        expected[4..8].copy_from_slice(&1013u32.to_le_bytes());
        assert_eq!(account.as_bytes(), &expected);
    }

    #[test]
    fn sibling_requires_exact_shape() {
        let u = wococo_asset_hub();
        for loc in [
            ConsensusLocation::parachain(0, 1013),
            ConsensusLocation::parachain(2, 1013),
            ConsensusLocation::global_parachain(1, NetworkId::Wococo, 1013),
            ConsensusLocation::here(),
        ] {
            let err = derive(DerivationKind::SiblingParachain, &loc, &u).unwrap_err();
            assert!(matches!(
                err,
                DeriveError::InvalidLocation(LocationError::UnsupportedShape { kind: "SiblingParachain", .. })
            ));
        }
    }

    #[test]
    fn kinds_are_domain_separated() {
        let u = wococo_asset_hub();
        let gc = derive(
            DerivationKind::GlobalConsensus,
            &ConsensusLocation::global_consensus(2, NetworkId::Rococo),
            &u,
        )
        .unwrap();
        let gcp = derive(
            DerivationKind::GlobalConsensusParachain,
            &ConsensusLocation::global_parachain(2, NetworkId::Rococo, 0),
            &u,
        )
        .unwrap();
        let sib = derive(DerivationKind::SiblingParachain, &ConsensusLocation::parachain(1, 0), &u).unwrap();
        assert_ne!(gc, gcp);
        assert_ne!(gc, sib);
        assert_ne!(gcp, sib);
    }

    #[test]
    fn truncate_pads_and_cuts() {
        assert_eq!(truncate_32(&[1, 2]), {
            let mut a = [0u8; 32];
            a[0] = 1;
            a[1] = 2;
            a
        });
        assert_eq!(truncate_32(&[7u8; 40]), [7u8; 32]);
    }
}

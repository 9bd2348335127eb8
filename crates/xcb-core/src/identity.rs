//! # Identifier Newtypes
//!
//! Lanes, chain-pair tags and derived accounts are all short byte arrays.
//! Wrapping each in its own type prevents a tag from being passed where a
//! lane is expected, which would silently derive the wrong reward pot.
//!
//! All three encode (SCALE) as their raw bytes with no length prefix, and
//! serialize to text: lanes and accounts as hex, tags as ASCII.

use std::fmt;
use std::str::FromStr;

use parity_scale_codec::Encode;
use serde::{Deserialize, Serialize};

use crate::error::IdentifierError;

/// Identifier of a message lane between two chains.
///
/// Four bytes in the order written (`00000001` is `[0, 0, 0, 1]`).
/// Agreed out of band; opaque to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LaneId(pub [u8; 4]);

impl LaneId {
    /// Raw lane bytes.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl FromStr for LaneId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let err = |reason: &str| IdentifierError {
            kind: "lane id",
            input: s.to_string(),
            reason: reason.to_string(),
        };
        if digits.len() != 8 {
            return Err(err("expected 8 hex digits"));
        }
        let mut bytes = [0u8; 4];
        hex::decode_to_slice(digits, &mut bytes).map_err(|e| err(&e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for LaneId {
    type Error = IdentifierError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<LaneId> for String {
    fn from(lane: LaneId) -> Self {
        lane.to_string()
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Four-byte tag naming the bridged chain of a chain pair.
///
/// Lanes are only unique within a chain pair, so reward pots are keyed by
/// `(lane, tag)`. Conventionally four lowercase ASCII letters, e.g. `bhwo`
/// for "bridge hub Wococo" as seen from the Rococo side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainPairTag(pub [u8; 4]);

impl ChainPairTag {
    /// Raw tag bytes.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl FromStr for ChainPairTag {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; 4] = s.as_bytes().try_into().map_err(|_| IdentifierError {
            kind: "chain pair tag",
            input: s.to_string(),
            reason: "expected exactly 4 ASCII bytes".to_string(),
        })?;
        if !bytes.iter().all(u8::is_ascii_graphic) {
            return Err(IdentifierError {
                kind: "chain pair tag",
                input: s.to_string(),
                reason: "tag must be printable ASCII".to_string(),
            });
        }
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for ChainPairTag {
    type Error = IdentifierError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ChainPairTag> for String {
    fn from(tag: ChainPairTag) -> Self {
        tag.to_string()
    }
}

impl fmt::Display for ChainPairTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// A 32-byte account identity produced by derivation.
///
/// Opaque beyond equality and encoding. Always recomputable from its inputs;
/// any stored copy is a cache.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SovereignAccount([u8; 32]);

impl SovereignAccount {
    /// Wrap raw account bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw account bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex with a `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for SovereignAccount {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes).map_err(|e| IdentifierError {
            kind: "account",
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for SovereignAccount {
    type Error = IdentifierError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SovereignAccount> for String {
    fn from(account: SovereignAccount) -> Self {
        account.to_hex()
    }
}

impl fmt::Display for SovereignAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for SovereignAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SovereignAccount({})", self.to_hex())
    }
}

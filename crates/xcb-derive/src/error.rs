//! # Derivation Errors

use thiserror::Error;
use xcb_core::LocationError;

/// Failure to derive, format or verify an account.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeriveError {
    /// The input location is malformed or has the wrong shape for the kind.
    #[error("invalid location: {0}")]
    InvalidLocation(#[from] LocationError),

    /// A pinned account differs from the one computed now.
    #[error("derivation mismatch for {label}: pinned {expected}, computed {actual}")]
    DerivationMismatch {
        /// Label of the published entry.
        label: String,
        /// The pinned address (or `<missing>` when the label is not pinned).
        expected: String,
        /// The computed address (or `<unknown>` when the label is not computed).
        actual: String,
    },

    /// The SS58 network prefix does not fit in 14 bits.
    #[error("SS58 prefix {prefix} exceeds 16383")]
    InvalidPrefix {
        /// The rejected prefix.
        prefix: u16,
    },

    /// A formatted account string could not be decoded.
    #[error("invalid address {address:?}: {reason}")]
    InvalidAddress {
        /// The rejected address.
        address: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl DeriveError {
    pub(crate) fn invalid_address(address: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.to_string(),
            reason: reason.into(),
        }
    }
}

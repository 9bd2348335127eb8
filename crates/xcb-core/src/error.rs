//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types shared across the bridge workspace. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Location errors name the offending junction index, so a configuration
//!   bug can be traced to the exact YAML entry.
//! - Configuration errors carry the field path that failed validation.
//! - Crate-specific errors (derivation, bootstrap, collaborators) live in
//!   their own crates. The CLI wraps them in `anyhow` with context.

use thiserror::Error;

/// A `ConsensusLocation` that breaks the topology invariants.
///
/// Always a configuration bug. Never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// More than one `GlobalConsensus` junction in the path.
    #[error("location has more than one GlobalConsensus junction (second at index {index})")]
    DuplicateGlobalConsensus {
        /// Index of the second `GlobalConsensus` junction.
        index: usize,
    },

    /// A `GlobalConsensus` junction that is not the first element.
    #[error("GlobalConsensus junction must be first, found at index {index}")]
    MisplacedGlobalConsensus {
        /// Index of the misplaced junction.
        index: usize,
    },

    /// A universal location must be rooted (`parents == 0`).
    #[error("universal location must have parents = 0, got {parents}")]
    NotRooted {
        /// The offending parent count.
        parents: u8,
    },

    /// A universal location must start with its own `GlobalConsensus`.
    #[error("universal location must start with a GlobalConsensus junction")]
    MissingGlobalConsensus,

    /// Appending a relative location walked above the universal root.
    #[error("location ascends {parents} levels but only {depth} are available")]
    AscendsPastRoot {
        /// Parents requested by the relative location.
        parents: u8,
        /// Depth of the location it was appended to.
        depth: usize,
    },

    /// The location does not have the shape the derivation kind requires.
    #[error("{kind} derivation requires {expected}, got {actual}")]
    UnsupportedShape {
        /// The derivation kind that rejected the location.
        kind: &'static str,
        /// Description of the required shape.
        expected: &'static str,
        /// Rendering of the location that was supplied.
        actual: String,
    },

    /// The location resolves to the deriving chain's own consensus.
    #[error("location resolves to the local consensus {network}, not a remote one")]
    NotRemote {
        /// The local network name.
        network: String,
    },
}

/// A textual identifier that does not parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind} {input:?}: {reason}")]
pub struct IdentifierError {
    /// Which identifier was being parsed (e.g. "lane id").
    pub kind: &'static str,
    /// The rejected input.
    pub input: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Configuration load or validation failure.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path that was read.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for [`crate::BridgeConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A field failed semantic validation.
    #[error("invalid config field {field}: {reason}")]
    Invalid {
        /// Dotted path of the field (e.g. `side_a.transactions_mortality`).
        field: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::Invalid`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

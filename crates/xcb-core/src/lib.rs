//! # xcb-core: Foundational Types for the Bridge
//!
//! This crate is the leaf of the workspace. It defines the value types every
//! other `xcb-*` crate speaks in: where a chain sits in the multi-consensus
//! topology, how lanes and chain pairs are named, what a derived account is,
//! and how the bridge is configured.
//!
//! ## Key Design Principles
//!
//! 1. **Validated locations.** `ConsensusLocation` can only be built through
//!    [`ConsensusLocation::new()`], which enforces the single-leading
//!    `GlobalConsensus` invariant. Derivation code never sees a malformed path.
//!
//! 2. **Wire-exact encoding.** `NetworkId` derives SCALE
//!    `Encode` with explicit variant indices. The derived account of a
//!    location is a function of these bytes, so the indices are frozen.
//!
//! 3. **Newtypes for identifiers.** `LaneId`, `ChainPairTag` and
//!    `SovereignAccount` are distinct types. A chain-pair tag cannot be
//!    passed where a lane is expected even though both are four bytes.
//!
//! 4. **One immutable configuration.** [`BridgeConfig`] is loaded once at
//!    startup and passed by reference. Nothing reads the environment.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `xcb-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod error;
pub mod identity;
pub mod location;

// Re-export primary types for ergonomic imports.
pub use config::{
    BridgeConfig, ChainEndpoint, ParachainEndpoint, RetryConfig, Side, SideConfig, VersionMode, MAX_SS58_PREFIX,
};
pub use error::{ConfigError, IdentifierError, LocationError};
pub use identity::{ChainPairTag, LaneId, SovereignAccount};
pub use location::{ConsensusLocation, Junction, NetworkId, UniversalLocation};

//! # xcb-state: Bridge Bootstrap State Machine
//!
//! Orders the two one-way bridge initializations and the relay launch:
//!
//! ```text
//! Uninitialized → OneWayInitA → OneWayInitB → Relaying     (Failed: terminal)
//! ```
//!
//! The phase is a runtime enum rather than a typestate: it is rebuilt from
//! on-chain observation at startup ([`BridgeSequencer::recover`]), so the
//! current phase is only known at runtime.
//!
//! ## Modules
//!
//! - [`bootstrap`]: the sequencer and its transition log.
//! - [`mortality`]: validity windows of submitted transactions.
//! - [`collaborator`]: the `ChainRpc` and `RelayProcess` traits, with
//!   in-memory mocks.
//! - [`retry`]: bounded exponential backoff for collaborator calls.

pub mod bootstrap;
pub mod collaborator;
pub mod error;
pub mod mortality;
pub mod retry;

pub use bootstrap::{BridgePhase, BridgeSequencer, FundingRequirement, SequencerConfig, TransitionRecord};
pub use collaborator::{
    ChainRpc, CollaboratorError, Direction, MockChainRpc, MockRelayProcess, RelayProcess, SubmitOutcome,
};
pub use error::BootstrapError;
pub use mortality::{Submission, SubmissionStatus};
pub use retry::{retry_call, RetryPolicy};

//! # xcb-client: Bridge Collaborator Adapters
//!
//! Production implementations of the collaborator traits defined in
//! `xcb-state`:
//!
//! - [`HttpChainRpc`]: blocking JSON-RPC client for a bridge hub node.
//! - [`SubstrateRelay`]: drives the external relayer binary for bridge
//!   initialization and the steady-state relay.
//!
//! Errors are reported as [`ClientError`] internally and converted to
//! `CollaboratorError` at the trait boundary, with transport failures
//! marked retryable.
//!
//! ## Crate Policy
//!
//! - No sequencing decisions. Adapters answer questions and run commands.
//! - No retries. The sequencer's retry policy wraps every call.

pub mod error;
pub mod relay;
pub mod rpc;
pub mod storage_key;

pub use error::ClientError;
pub use relay::{init_bridge_args, relay_args, SubstrateRelay};
pub use rpc::{HttpChainRpc, DEFAULT_TIMEOUT};
pub use storage_key::{blake2_128, storage_value_key, system_account_key, twox_128};

//! # xcb-derive: Account Derivation
//!
//! Pure functions from locations and lane parameters to 32-byte accounts,
//! plus the stages built on them:
//!
//! - [`sovereign`]: the three sovereign-account kinds.
//! - [`reward`]: the per-lane reward pots.
//! - [`ss58`]: textual account formats (SS58, hex).
//! - [`published`]: the table of accounts a configured bridge publishes,
//!   and verification against pinned copies.
//!
//! ## Security Invariant
//!
//! Accounts are recomputed from configuration every time they are needed.
//! Nothing in this crate reads a stored account and treats it as
//! authoritative; pinned values are only compared.
//!
//! ## Crate Policy
//!
//! - Depends only on `xcb-core`.
//! - No IO, no shared state. Every function is safe to call from any thread.

pub mod error;
pub mod published;
pub mod reward;
pub mod sovereign;
pub mod ss58;

pub use error::DeriveError;
pub use published::{published_accounts, verify_pins, HubChain, PublishedAccount, PublishedTable};
pub use reward::{reward_account, reward_accounts, RewardAccountParams, RewardOwner};
pub use sovereign::{derive, DerivationKind, DERIVATION_SCHEME_VERSION};
pub use ss58::{AccountFormat, HexFormat, Ss58Format, DEFAULT_SS58_PREFIX};

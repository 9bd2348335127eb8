//! # Operations
//!
//! The closed set of things the `xcb` binary can do. Command-line parsing
//! produces exactly one [`Operation`]; [`dispatch`] is the only place that
//! maps an operation to its handler.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use xcb_core::{BridgeConfig, ChainPairTag, LaneId};
use xcb_derive::RewardOwner;
use xcb_state::Direction;

use crate::accounts::{run_accounts, run_reward_account, AddressFormat};
use crate::bootstrap::{connect, run_init_both, run_init_bridge, run_relay, run_status};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Print the published-account table, or check it against pins.
    Accounts {
        format: AddressFormat,
        json: bool,
        check: Option<PathBuf>,
    },
    /// Derive one reward pot.
    RewardAccount {
        lane: LaneId,
        tag: ChainPairTag,
        owner: RewardOwner,
        format: AddressFormat,
    },
    /// Initialize one direction.
    InitBridge(Direction),
    /// Initialize both directions concurrently.
    InitBoth,
    /// Bootstrap what is missing, then run and supervise the relay.
    RunRelay,
    /// Report the phase observed on chain.
    Status,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Accounts { .. } => "accounts",
            Self::RewardAccount { .. } => "reward-account",
            Self::InitBridge(_) => "init-bridge",
            Self::InitBoth => "init-both",
            Self::RunRelay => "run-relay",
            Self::Status => "status",
        }
    }

    /// Whether the operation talks to the chains or the relayer.
    pub fn needs_collaborators(&self) -> bool {
        !matches!(self, Self::Accounts { .. } | Self::RewardAccount { .. })
    }
}

/// Run `operation` against `config`, returning the process exit code.
pub fn dispatch(operation: &Operation, config: &BridgeConfig) -> Result<u8> {
    tracing::debug!(operation = operation.name(), "dispatching");
    match operation {
        Operation::Accounts { format, json, check } => run_accounts(config, *format, *json, check.as_deref()),
        Operation::RewardAccount {
            lane,
            tag,
            owner,
            format,
        } => run_reward_account(config, *lane, *tag, *owner, *format),
        Operation::InitBridge(direction) => {
            let (mut sequencer, _relay) = connect(config)?;
            run_init_bridge(&mut sequencer, *direction)
        }
        Operation::InitBoth => {
            let (mut sequencer, _relay) = connect(config)?;
            run_init_both(&mut sequencer)
        }
        Operation::RunRelay => {
            let (mut sequencer, relay) = connect(config)?;
            run_relay(
                &mut sequencer,
                relay.as_ref(),
                Duration::from_millis(config.poll_interval_ms),
            )
        }
        Operation::Status => {
            let (mut sequencer, _relay) = connect(config)?;
            run_status(&mut sequencer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_operations() {
        let offline = Operation::RewardAccount {
            lane: LaneId([0, 0, 0, 1]),
            tag: ChainPairTag(*b"bhwo"),
            owner: RewardOwner::ThisChain,
            format: AddressFormat::Ss58,
        };
        assert!(!offline.needs_collaborators());
        assert!(Operation::Status.needs_collaborators());
        assert!(Operation::InitBridge(Direction::AToB).needs_collaborators());
    }

    #[test]
    fn dispatch_reward_account() {
        let op = Operation::RewardAccount {
            lane: LaneId([0, 0, 0, 1]),
            tag: ChainPairTag(*b"bhro"),
            owner: RewardOwner::BridgedChain,
            format: AddressFormat::Hex,
        };
        assert_eq!(dispatch(&op, &BridgeConfig::default()).unwrap(), 0);
    }

    #[test]
    fn dispatch_accounts_listing() {
        let op = Operation::Accounts {
            format: AddressFormat::Ss58,
            json: false,
            check: None,
        };
        assert_eq!(dispatch(&op, &BridgeConfig::default()).unwrap(), 0);
    }

    #[test]
    fn names_match_subcommands() {
        assert_eq!(Operation::InitBoth.name(), "init-both");
        assert_eq!(Operation::RunRelay.name(), "run-relay");
    }
}

//! # xcb CLI entry point
//!
//! Parses command-line arguments into an [`Operation`] and hands it to the
//! single dispatch function.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use xcb_cli::accounts::AddressFormat;
use xcb_cli::load_config;
use xcb_cli::operation::{dispatch, Operation};
use xcb_core::{ChainPairTag, LaneId};
use xcb_derive::RewardOwner;
use xcb_state::Direction;

/// Cross-consensus bridge operator tool.
///
/// Derives the sovereign and reward accounts a bridge needs, initializes
/// the bridge in both directions and supervises the relayer.
#[derive(Parser, Debug)]
#[command(name = "xcb", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Bridge configuration file (YAML). Defaults to the local Rococo/Wococo bridge.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the published accounts of the bridge, or check them against pins.
    Accounts {
        #[arg(long, value_enum, default_value = "ss58")]
        format: AddressFormat,
        /// Print the table as JSON.
        #[arg(long, conflicts_with = "check")]
        json: bool,
        /// YAML map of `label: address` to verify.
        #[arg(long)]
        check: Option<PathBuf>,
    },

    /// Derive the reward pot of a lane.
    RewardAccount {
        /// Lane id, 8 hex digits.
        #[arg(long)]
        lane: LaneId,
        /// Four-character chain-pair tag (e.g. "bhwo").
        #[arg(long)]
        tag: ChainPairTag,
        /// `this` or `bridged`.
        #[arg(long)]
        owner: RewardOwner,
        #[arg(long, value_enum, default_value = "ss58")]
        format: AddressFormat,
    },

    /// Initialize one bridge direction (`a-to-b` or `b-to-a`).
    InitBridge {
        direction: Direction,
    },

    /// Initialize both bridge directions concurrently.
    InitBoth,

    /// Initialize whatever is missing, then run the relay until it exits.
    RunRelay,

    /// Print the bootstrap phase observed on chain.
    Status,
}

impl Commands {
    fn into_operation(self) -> Operation {
        match self {
            Self::Accounts { format, json, check } => Operation::Accounts { format, json, check },
            Self::RewardAccount {
                lane,
                tag,
                owner,
                format,
            } => Operation::RewardAccount {
                lane,
                tag,
                owner,
                format,
            },
            Self::InitBridge { direction } => Operation::InitBridge(direction),
            Self::InitBoth => Operation::InitBoth,
            Self::RunRelay => Operation::RunRelay,
            Self::Status => Operation::Status,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!("xcb CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(2);
        }
    };

    let operation = cli.command.into_operation();
    if operation.needs_collaborators() {
        tracing::info!(
            bridge_hub_a = %config.side_a.bridge_hub.endpoint().url(),
            bridge_hub_b = %config.side_b.bridge_hub.endpoint().url(),
            relay_binary = %config.relay_binary,
            "using collaborators"
        );
    }

    match dispatch(&operation, &config) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_accounts_defaults() {
        let cli = Cli::try_parse_from(["xcb", "accounts"]).unwrap();
        assert_eq!(
            cli.command.into_operation(),
            Operation::Accounts {
                format: AddressFormat::Ss58,
                json: false,
                check: None,
            }
        );
    }

    #[test]
    fn cli_parse_accounts_check() {
        let cli = Cli::try_parse_from(["xcb", "accounts", "--format", "hex", "--check", "pins.yaml"]).unwrap();
        assert_eq!(
            cli.command.into_operation(),
            Operation::Accounts {
                format: AddressFormat::Hex,
                json: false,
                check: Some(PathBuf::from("pins.yaml")),
            }
        );
    }

    #[test]
    fn cli_parse_json_conflicts_with_check() {
        assert!(Cli::try_parse_from(["xcb", "accounts", "--json", "--check", "pins.yaml"]).is_err());
    }

    #[test]
    fn cli_parse_reward_account() {
        let cli = Cli::try_parse_from([
            "xcb",
            "reward-account",
            "--lane",
            "00000001",
            "--tag",
            "bhwo",
            "--owner",
            "bridged",
        ])
        .unwrap();
        assert_eq!(
            cli.command.into_operation(),
            Operation::RewardAccount {
                lane: LaneId([0, 0, 0, 1]),
                tag: ChainPairTag(*b"bhwo"),
                owner: RewardOwner::BridgedChain,
                format: AddressFormat::Ss58,
            }
        );
    }

    #[test]
    fn cli_parse_reward_account_rejects_bad_lane() {
        let result = Cli::try_parse_from([
            "xcb",
            "reward-account",
            "--lane",
            "0001",
            "--tag",
            "bhwo",
            "--owner",
            "this",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parse_init_bridge_directions() {
        let cli = Cli::try_parse_from(["xcb", "init-bridge", "b-to-a"]).unwrap();
        assert_eq!(cli.command.into_operation(), Operation::InitBridge(Direction::BToA));
        assert!(Cli::try_parse_from(["xcb", "init-bridge", "sideways"]).is_err());
    }

    #[test]
    fn cli_parse_global_flags() {
        let cli = Cli::try_parse_from(["xcb", "-vv", "status", "--config", "bridge.yaml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(!cli.json_logs);
        assert_eq!(cli.config, Some(PathBuf::from("bridge.yaml")));
        assert_eq!(cli.command.into_operation(), Operation::Status);
    }

    #[test]
    fn cli_parse_bootstrap_commands() {
        let cli = Cli::try_parse_from(["xcb", "init-both"]).unwrap();
        assert_eq!(cli.command.into_operation(), Operation::InitBoth);
        let cli = Cli::try_parse_from(["xcb", "run-relay"]).unwrap();
        assert_eq!(cli.command.into_operation(), Operation::RunRelay);
    }

    #[test]
    fn cli_verify() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

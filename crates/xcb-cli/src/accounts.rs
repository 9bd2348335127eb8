//! # Account Commands
//!
//! `xcb accounts` renders the published-account table of the configured
//! bridge and optionally checks it against a pinned YAML map of
//! `label: address`. `xcb reward-account` derives a single reward pot.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use xcb_core::{BridgeConfig, ChainPairTag, LaneId};
use xcb_derive::{
    published_accounts, reward_account, verify_pins, AccountFormat, HexFormat, PublishedTable, RewardAccountParams,
    RewardOwner, Ss58Format,
};

/// Textual rendering of account ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AddressFormat {
    /// SS58 with the configured network prefix.
    #[default]
    Ss58,
    /// `0x`-prefixed hex.
    Hex,
}

impl AddressFormat {
    pub fn formatter(self, config: &BridgeConfig) -> Result<Box<dyn AccountFormat>> {
        let formatter: Box<dyn AccountFormat> = match self {
            Self::Ss58 => Box::new(Ss58Format::new(config.ss58_prefix).context("configuring SS58 format")?),
            Self::Hex => Box::new(HexFormat),
        };
        Ok(formatter)
    }
}

/// One line per entry: `label  address`.
pub fn render_table(table: &PublishedTable) -> String {
    let width = table.entries.iter().map(|e| e.label.len()).max().unwrap_or(0);
    let mut out = String::new();
    for entry in &table.entries {
        let _ = writeln!(out, "{:<width$}  {}", entry.label, entry.address);
    }
    out
}

/// Read a pin file: a flat YAML map of label to address.
pub fn load_pins(path: &Path) -> Result<BTreeMap<String, String>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading pins from {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("parsing pins in {}", path.display()))
}

/// `xcb accounts`.
pub fn run_accounts(config: &BridgeConfig, format: AddressFormat, json: bool, check: Option<&Path>) -> Result<u8> {
    let formatter = format.formatter(config)?;
    let table = published_accounts(config, formatter.as_ref()).context("deriving published accounts")?;

    let Some(pins_path) = check else {
        if json {
            println!("{}", serde_json::to_string_pretty(&table)?);
        } else {
            print!("{}", render_table(&table));
        }
        return Ok(0);
    };

    let pins = load_pins(pins_path)?;
    match verify_pins(&table, &pins) {
        Ok(()) => {
            println!("OK: {} pinned accounts match", pins.len());
            Ok(0)
        }
        Err(e) => {
            eprintln!("MISMATCH: {e}");
            Ok(1)
        }
    }
}

/// The reward pot for `(lane, tag, owner)`, rendered in `format`.
pub fn reward_address(
    config: &BridgeConfig,
    lane: LaneId,
    tag: ChainPairTag,
    owner: RewardOwner,
    format: AddressFormat,
) -> Result<String> {
    let account = reward_account(&RewardAccountParams::new(lane, tag, owner));
    Ok(format.formatter(config)?.encode(&account))
}

/// `xcb reward-account`.
pub fn run_reward_account(
    config: &BridgeConfig,
    lane: LaneId,
    tag: ChainPairTag,
    owner: RewardOwner,
    format: AddressFormat,
) -> Result<u8> {
    println!("{}", reward_address(config, lane, tag, owner, format)?);
    Ok(0)
}

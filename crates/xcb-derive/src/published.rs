//! # Published Accounts
//!
//! The accounts operators must fund, whitelist or watch for a configured
//! bridge. Every entry is recomputed from [`BridgeConfig`] on demand; a
//! pinned copy (YAML map `label -> address`) is only ever compared against
//! the derived table, never trusted on its own.
//!
//! Per side:
//!
//! - asset hub: custodian of the remote native asset (`GlobalConsensus`),
//!   custodian of the remote asset hub (`GlobalConsensusParachain`), and
//!   the local bridge hub (`SiblingParachain`);
//! - bridge hub: the local asset hub (`SiblingParachain`) and the two reward
//!   pots of the configured lane.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use xcb_core::{BridgeConfig, ConsensusLocation, Side, SovereignAccount};

use crate::error::DeriveError;
use crate::reward::{reward_account, RewardAccountParams, RewardOwner};
use crate::sovereign::{derive, DerivationKind};
use crate::ss58::AccountFormat;

/// Which chain of a side an account lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HubChain {
    AssetHub,
    BridgeHub,
}

impl HubChain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AssetHub => "asset_hub",
            Self::BridgeHub => "bridge_hub",
        }
    }
}

impl fmt::Display for HubChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the published table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedAccount {
    pub side: Side,
    pub chain: HubChain,
    /// Unique dotted label, e.g. `wococo.asset_hub.sovereign_of_rococo`.
    pub label: String,
    pub account: SovereignAccount,
    /// `account` rendered with the table's [`AccountFormat`].
    pub address: String,
}

/// The full table for both sides, A first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedTable {
    pub entries: Vec<PublishedAccount>,
}

impl PublishedTable {
    /// Look up an entry by label.
    pub fn get(&self, label: &str) -> Option<&PublishedAccount> {
        self.entries.iter().find(|e| e.label == label)
    }

    /// `label -> address`, suitable for writing out as a pin file.
    pub fn to_pins(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|e| (e.label.clone(), e.address.clone()))
            .collect()
    }
}

/// Derive every published account of `config`.
pub fn published_accounts(
    config: &BridgeConfig,
    format: &dyn AccountFormat,
) -> Result<PublishedTable, DeriveError> {
    let mut entries = Vec::with_capacity(12);
    for side in Side::both() {
        let local = config.side(side);
        let remote = config.side(side.other());
        let asset_hub = local.asset_hub_universal();
        let bridge_hub = local.bridge_hub_universal();

        let mut push = |chain: HubChain, name: String, account: SovereignAccount| {
            entries.push(PublishedAccount {
                side,
                chain,
                label: format!("{}.{}.{}", local.name, chain, name),
                address: format.encode(&account),
                account,
            });
        };

        push(
            HubChain::AssetHub,
            format!("sovereign_of_{}", remote.name),
            derive(
                DerivationKind::GlobalConsensus,
                &ConsensusLocation::global_consensus(2, remote.network),
                &asset_hub,
            )?,
        );
        push(
            HubChain::AssetHub,
            format!("sovereign_of_{}_asset_hub", remote.name),
            derive(
                DerivationKind::GlobalConsensusParachain,
                &ConsensusLocation::global_parachain(2, remote.network, remote.asset_hub.para_id),
                &asset_hub,
            )?,
        );
        push(
            HubChain::AssetHub,
            "sovereign_of_bridge_hub".to_string(),
            derive(
                DerivationKind::SiblingParachain,
                &ConsensusLocation::parachain(1, local.bridge_hub.para_id),
                &asset_hub,
            )?,
        );
        push(
            HubChain::BridgeHub,
            "sovereign_of_asset_hub".to_string(),
            derive(
                DerivationKind::SiblingParachain,
                &ConsensusLocation::parachain(1, local.asset_hub.para_id),
                &bridge_hub,
            )?,
        );
        for owner in [RewardOwner::ThisChain, RewardOwner::BridgedChain] {
            let params = RewardAccountParams::new(config.lane, local.chain_pair_tag, owner);
            push(
                HubChain::BridgeHub,
                format!("reward_pot_{owner}"),
                reward_account(&params),
            );
        }
    }
    tracing::debug!(entries = entries.len(), format = format.name(), "derived published accounts");
    Ok(PublishedTable { entries })
}

/// Compare a pinned `label -> address` map against the derived table.
///
/// Fails on the first pinned label whose address differs or that the table
/// does not contain. Labels present only in the table are not an error.
pub fn verify_pins(table: &PublishedTable, pins: &BTreeMap<String, String>) -> Result<(), DeriveError> {
    for (label, expected) in pins {
        match table.get(label) {
            Some(entry) if &entry.address == expected => {}
            Some(entry) => {
                tracing::error!(label = %label, pinned = %expected, computed = %entry.address, "pinned account differs");
                return Err(DeriveError::DerivationMismatch {
                    label: label.clone(),
                    expected: expected.clone(),
                    actual: entry.address.clone(),
                });
            }
            None => {
                return Err(DeriveError::DerivationMismatch {
                    label: label.clone(),
                    expected: expected.clone(),
                    actual: "<unknown>".to_string(),
                });
            }
        }
    }
    Ok(())
}

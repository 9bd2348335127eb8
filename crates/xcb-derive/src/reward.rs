//! # Lane Reward Ledger
//!
//! Each lane has two reward pots on a bridge hub: one paying relayers that
//! deliver messages into this chain, one paying those who confirm delivery
//! to the bridged chain. Pots are addressed by `(lane, chain_pair_tag,
//! owner)` in a domain of their own, separate from the sovereign kinds:
//!
//! ```text
//! "brap" ++ lane[4] ++ tag[4] ++ owner[1] ++ "rewards-account"   (zero-padded to 32)
//! ```
//!
//! The encoding is 28 bytes, so the account is the preimage itself and the
//! mapping is trivially injective.

use std::fmt;
use std::str::FromStr;

use parity_scale_codec::Encode;
use serde::{Deserialize, Serialize};
use xcb_core::{ChainPairTag, IdentifierError, LaneId, SovereignAccount};

use crate::sovereign::truncate_32;

const REWARD_TYPE_ID: &[u8; 4] = b"brap";
const REWARD_SUB_ACCOUNT: &[u8; 15] = b"rewards-account";

/// Which side of the lane a reward pot pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Serialize, Deserialize)]
pub enum RewardOwner {
    /// Rewards for delivering messages to this chain.
    #[codec(index = 0)]
    ThisChain,
    /// Rewards for confirming delivery to the bridged chain.
    #[codec(index = 1)]
    BridgedChain,
}

impl RewardOwner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThisChain => "this_chain",
            Self::BridgedChain => "bridged_chain",
        }
    }
}

impl fmt::Display for RewardOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RewardOwner {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "this" | "this_chain" | "ThisChain" => Ok(Self::ThisChain),
            "bridged" | "bridged_chain" | "BridgedChain" => Ok(Self::BridgedChain),
            other => Err(IdentifierError {
                kind: "reward owner",
                input: other.to_string(),
                reason: "expected `this` or `bridged`".to_string(),
            }),
        }
    }
}

/// Inputs identifying one reward pot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Serialize, Deserialize)]
pub struct RewardAccountParams {
    pub lane: LaneId,
    pub chain_pair_tag: ChainPairTag,
    pub owner: RewardOwner,
}

impl RewardAccountParams {
    pub fn new(lane: LaneId, chain_pair_tag: ChainPairTag, owner: RewardOwner) -> Self {
        Self {
            lane,
            chain_pair_tag,
            owner,
        }
    }
}

/// The account of one reward pot.
pub fn reward_account(params: &RewardAccountParams) -> SovereignAccount {
    let bytes = (REWARD_TYPE_ID, params, REWARD_SUB_ACCOUNT).encode();
    SovereignAccount::from_bytes(truncate_32(&bytes))
}

/// Both pots of a lane: `(ThisChain, BridgedChain)`.
pub fn reward_accounts(lane: LaneId, chain_pair_tag: ChainPairTag) -> (SovereignAccount, SovereignAccount) {
    (
        reward_account(&RewardAccountParams::new(lane, chain_pair_tag, RewardOwner::ThisChain)),
        reward_account(&RewardAccountParams::new(lane, chain_pair_tag, RewardOwner::BridgedChain)),
    )
}

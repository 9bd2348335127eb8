//! # Pinned Account Vectors
//!
//! Accounts the live Rococo/Wococo bridge was deployed with. If any of these
//! change, reserves and reward pots on chain become unreachable, so a
//! failure here means the derivation scheme broke, not the test.

use std::collections::BTreeMap;

use xcb_core::{BridgeConfig, ChainPairTag, ConsensusLocation, LaneId, NetworkId, UniversalLocation};
use xcb_derive::{
    derive, published_accounts, reward_account, verify_pins, AccountFormat, DerivationKind, RewardAccountParams,
    RewardOwner, Ss58Format,
};

const PINS: &str = include_str!("../../../config/pins.rococo-wococo.yaml");

fn ss58(account: &xcb_core::SovereignAccount) -> String {
    Ss58Format::default().encode(account)
}

#[test]
fn rococo_sovereign_on_wococo_asset_hub() {
    let account = derive(
        DerivationKind::GlobalConsensus,
        &ConsensusLocation::global_consensus(2, NetworkId::Rococo),
        &UniversalLocation::of_parachain(NetworkId::Wococo, 1000),
    )
    .unwrap();
    assert_eq!(ss58(&account), "5GxRGwT8bU1JeBPTUXc7LEjZMxNrK8MyL2NJnkWFQJTQ4sii");
}

#[test]
fn reward_pots_of_lane_one_on_rococo_bridge_hub() {
    let lane = LaneId([0, 0, 0, 1]);
    let tag = ChainPairTag(*b"bhwo");
    let this = reward_account(&RewardAccountParams::new(lane, tag, RewardOwner::ThisChain));
    let bridged = reward_account(&RewardAccountParams::new(lane, tag, RewardOwner::BridgedChain));
    assert_eq!(ss58(&this), "5EHnXaT5BhiS8YRPMeHi97YHofTtNx4pLNb8wR8TwjVq1gzU");
    assert_eq!(ss58(&bridged), "5EHnXaT5BhiS8YRPMeHyt95svA95qWAh53XeVMpJQZNZHAzj");
}

#[test]
fn default_bridge_matches_pin_file() {
    let pins: BTreeMap<String, String> = serde_yaml::from_str(PINS).unwrap();
    let table = published_accounts(&BridgeConfig::default(), &Ss58Format::default()).unwrap();
    assert_eq!(pins.len(), table.entries.len());
    verify_pins(&table, &pins).unwrap();
}

#[test]
fn derivation_is_repeatable() {
    let config = BridgeConfig::default();
    let a = published_accounts(&config, &Ss58Format::default()).unwrap();
    let b = published_accounts(&config, &Ss58Format::default()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn exhaustive_small_topology_has_no_collisions() {
    let networks = [
        NetworkId::Polkadot,
        NetworkId::Kusama,
        NetworkId::Westend,
        NetworkId::Rococo,
        NetworkId::Wococo,
        NetworkId::BitcoinCore,
        NetworkId::BitcoinCash,
        NetworkId::Ethereum { chain_id: 1 },
        NetworkId::Ethereum { chain_id: 11155111 },
    ];
    let paras = [0u32, 1, 1000, 1002, 1013, 1014, 2000, u32::MAX];
    let universal = UniversalLocation::of_parachain(NetworkId::ByGenesis([0xab; 32]), 1000);

    let mut seen = BTreeMap::new();
    for network in networks {
        let gc = derive(
            DerivationKind::GlobalConsensus,
            &ConsensusLocation::global_consensus(2, network),
            &universal,
        )
        .unwrap();
        assert!(seen.insert(gc, format!("gc {network}")).is_none());
        for para in paras {
            let gcp = derive(
                DerivationKind::GlobalConsensusParachain,
                &ConsensusLocation::global_parachain(2, network, para),
                &universal,
            )
            .unwrap();
            assert!(seen.insert(gcp, format!("gcp {network} {para}")).is_none());
        }
    }
    for para in paras {
        let sib = derive(
            DerivationKind::SiblingParachain,
            &ConsensusLocation::parachain(1, para),
            &universal,
        )
        .unwrap();
        assert!(seen.insert(sib, format!("sibling {para}")).is_none());
    }
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn remote_network() -> impl Strategy<Value = NetworkId> {
        prop_oneof![
            Just(NetworkId::Polkadot),
            Just(NetworkId::Kusama),
            Just(NetworkId::Rococo),
            Just(NetworkId::BitcoinCore),
            any::<u64>().prop_map(|chain_id| NetworkId::Ethereum { chain_id }),
            any::<[u8; 32]>().prop_map(NetworkId::ByGenesis),
            (any::<u64>(), any::<[u8; 32]>())
                .prop_map(|(block_number, block_hash)| NetworkId::ByFork { block_number, block_hash }),
        ]
    }

    fn from_wococo() -> UniversalLocation {
        UniversalLocation::of_parachain(NetworkId::Wococo, 1000)
    }

    fn params() -> impl Strategy<Value = RewardAccountParams> {
        (any::<[u8; 4]>(), any::<[u8; 4]>(), any::<bool>()).prop_map(|(lane, tag, bridged)| {
            let owner = if bridged { RewardOwner::BridgedChain } else { RewardOwner::ThisChain };
            RewardAccountParams::new(LaneId(lane), ChainPairTag(tag), owner)
        })
    }

    proptest! {
        #[test]
        fn global_parachain_is_injective(
            n1 in remote_network(), p1 in any::<u32>(),
            n2 in remote_network(), p2 in any::<u32>(),
        ) {
            let a = derive(
                DerivationKind::GlobalConsensusParachain,
                &ConsensusLocation::global_parachain(2, n1, p1),
                &from_wococo(),
            ).unwrap();
            let b = derive(
                DerivationKind::GlobalConsensusParachain,
                &ConsensusLocation::global_parachain(2, n2, p2),
                &from_wococo(),
            ).unwrap();
            prop_assert_eq!(a == b, (n1, p1) == (n2, p2));
        }

        #[test]
        fn global_consensus_is_injective(n1 in remote_network(), n2 in remote_network()) {
            let a = derive(
                DerivationKind::GlobalConsensus,
                &ConsensusLocation::global_consensus(2, n1),
                &from_wococo(),
            ).unwrap();
            let b = derive(
                DerivationKind::GlobalConsensus,
                &ConsensusLocation::global_consensus(2, n2),
                &from_wococo(),
            ).unwrap();
            prop_assert_eq!(a == b, n1 == n2);
        }

        #[test]
        fn sibling_is_injective(p1 in any::<u32>(), p2 in any::<u32>()) {
            let a = derive(DerivationKind::SiblingParachain, &ConsensusLocation::parachain(1, p1), &from_wococo()).unwrap();
            let b = derive(DerivationKind::SiblingParachain, &ConsensusLocation::parachain(1, p2), &from_wococo()).unwrap();
            prop_assert_eq!(a == b, p1 == p2);
        }

        #[test]
        fn reward_account_is_injective(a in params(), b in params()) {
            prop_assert_eq!(reward_account(&a) == reward_account(&b), a == b);
        }

        #[test]
        fn ss58_decodes_what_it_encodes(bytes in any::<[u8; 32]>(), prefix in 0u16..16384) {
            let format = Ss58Format::new(prefix).unwrap();
            let account = xcb_core::SovereignAccount::from_bytes(bytes);
            prop_assert_eq!(format.decode(&format.encode(&account)).unwrap(), account);
        }
    }
}

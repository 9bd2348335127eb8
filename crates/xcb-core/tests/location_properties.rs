//! # Location Invariant Properties
//!
//! Random junction paths are fed to the validating constructor and to
//! relativization. Whatever the input, a `ConsensusLocation` that exists has
//! at most one `GlobalConsensus`, and it is first.

use proptest::prelude::*;
use xcb_core::{ConsensusLocation, Junction, NetworkId, UniversalLocation};

fn network() -> impl Strategy<Value = NetworkId> {
    prop_oneof![
        Just(NetworkId::Polkadot),
        Just(NetworkId::Kusama),
        Just(NetworkId::Westend),
        Just(NetworkId::Rococo),
        Just(NetworkId::Wococo),
        Just(NetworkId::BitcoinCore),
        any::<u64>().prop_map(|chain_id| NetworkId::Ethereum { chain_id }),
        any::<[u8; 32]>().prop_map(NetworkId::ByGenesis),
    ]
}

fn junction() -> impl Strategy<Value = Junction> {
    prop_oneof![
        network().prop_map(Junction::GlobalConsensus),
        any::<u32>().prop_map(Junction::Parachain),
    ]
}

fn well_formed(path: &[Junction]) -> bool {
    path.iter()
        .enumerate()
        .all(|(i, j)| i == 0 || !matches!(j, Junction::GlobalConsensus(_)))
}

proptest! {
    /// The constructor accepts exactly the well-formed paths.
    #[test]
    fn constructor_matches_invariant(
        parents in 0u8..4,
        path in prop::collection::vec(junction(), 0..5),
    ) {
        let expected = well_formed(&path);
        let result = ConsensusLocation::new(parents, path);
        prop_assert_eq!(result.is_ok(), expected);
    }

    /// Relativization never produces a malformed location.
    #[test]
    fn resolve_preserves_invariant(
        local in network(),
        para in any::<u32>(),
        parents in 0u8..4,
        path in prop::collection::vec(junction(), 0..3),
    ) {
        let universal = UniversalLocation::of_parachain(local, para);
        if let Ok(relative) = ConsensusLocation::new(parents, path) {
            if let Ok(resolved) = universal.resolve(&relative) {
                prop_assert!(well_formed(&resolved));
            }
        }
    }

    /// A sibling reference always resolves inside the local consensus.
    #[test]
    fn sibling_stays_local(local in network(), here in any::<u32>(), sibling in any::<u32>()) {
        let universal = UniversalLocation::of_parachain(local, here);
        let resolved = universal.resolve(&ConsensusLocation::parachain(1, sibling)).unwrap();
        prop_assert_eq!(
            resolved,
            vec![Junction::GlobalConsensus(local), Junction::Parachain(sibling)]
        );
    }

    /// Ascending to the global root and naming a network lands on that network.
    #[test]
    fn two_parents_reach_global_root(local in network(), here in any::<u32>(), remote in network()) {
        let universal = UniversalLocation::of_parachain(local, here);
        let resolved = universal
            .resolve(&ConsensusLocation::global_consensus(2, remote))
            .unwrap();
        prop_assert_eq!(resolved, vec![Junction::GlobalConsensus(remote)]);
    }
}

#[test]
fn yaml_location_is_validated() {
    let bad = "parents: 1\npath:\n  - !Parachain 1000\n  - !GlobalConsensus Rococo\n";
    assert!(serde_yaml::from_str::<ConsensusLocation>(bad).is_err());

    let good = "parents: 2\npath:\n  - !GlobalConsensus Rococo\n";
    let loc: ConsensusLocation = serde_yaml::from_str(good).unwrap();
    assert_eq!(loc, ConsensusLocation::global_consensus(2, NetworkId::Rococo));
}

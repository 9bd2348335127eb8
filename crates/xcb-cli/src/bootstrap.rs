//! # Bootstrap Commands
//!
//! Wires the sequencer to its production collaborators and runs the
//! bootstrap commands. Every command first recovers the phase from chain
//! state, so re-running a command after a crash resumes where the bridge
//! actually is.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use xcb_client::{HttpChainRpc, SubstrateRelay, DEFAULT_TIMEOUT};
use xcb_core::BridgeConfig;
use xcb_derive::{published_accounts, HexFormat, HubChain};
use xcb_state::{BridgePhase, BridgeSequencer, Direction, FundingRequirement, RelayProcess, SequencerConfig};

/// Reward pots that must hold at least the side's configured minimum
/// before the relay starts. Sides with a zero minimum are not checked.
pub fn funding_requirements(config: &BridgeConfig) -> Result<Vec<FundingRequirement>> {
    let table = published_accounts(config, &HexFormat).context("deriving reward pots")?;
    Ok(table
        .entries
        .into_iter()
        .filter(|e| e.chain == HubChain::BridgeHub && e.label.contains(".reward_pot_"))
        .filter_map(|e| {
            let minimum = config.side(e.side).reward_pot_minimum;
            (minimum > 0).then(|| FundingRequirement {
                side: e.side,
                label: e.label,
                account: e.account,
                minimum,
            })
        })
        .collect())
}

/// A sequencer over the configured bridge hubs and relayer, plus a handle
/// on the relayer for supervision.
pub fn connect(config: &BridgeConfig) -> Result<(BridgeSequencer, Arc<dyn RelayProcess>)> {
    let rpc_a = HttpChainRpc::from_side(&config.side_a, DEFAULT_TIMEOUT).context("connecting to bridge hub A")?;
    let rpc_b = HttpChainRpc::from_side(&config.side_b, DEFAULT_TIMEOUT).context("connecting to bridge hub B")?;
    let relay: Arc<dyn RelayProcess> = Arc::new(SubstrateRelay::new(config.clone()));
    let sequencer = BridgeSequencer::new(
        Arc::new(rpc_a),
        Arc::new(rpc_b),
        relay.clone(),
        SequencerConfig::from_bridge(config),
    )
    .with_funding(funding_requirements(config)?);
    Ok((sequencer, relay))
}

/// `xcb status`.
pub fn run_status(sequencer: &mut BridgeSequencer) -> Result<u8> {
    let phase = sequencer.recover().context("reading bridge state")?;
    println!("{phase}");
    Ok(0)
}

/// `xcb init-bridge <direction>`.
pub fn run_init_bridge(sequencer: &mut BridgeSequencer, direction: Direction) -> Result<u8> {
    sequencer.recover().context("reading bridge state")?;
    let phase = match direction {
        Direction::AToB => sequencer.init_a(),
        Direction::BToA => sequencer.init_b(),
    }
    .with_context(|| format!("initializing {direction}"))?;
    println!("{phase}");
    Ok(0)
}

/// `xcb init-both`.
pub fn run_init_both(sequencer: &mut BridgeSequencer) -> Result<u8> {
    sequencer.recover().context("reading bridge state")?;
    let phase = sequencer.initialize_both().context("initializing both directions")?;
    println!("{phase}");
    Ok(0)
}

/// `xcb run-relay`: bootstrap whatever is missing, launch the relay and
/// block until the relayer exits. The sequencer then leaves `Relaying` and
/// the command returns 1.
pub fn run_relay(sequencer: &mut BridgeSequencer, relay: &dyn RelayProcess, poll: Duration) -> Result<u8> {
    let phase = sequencer.recover().context("reading bridge state")?;
    if phase != BridgePhase::OneWayInitB {
        sequencer.initialize_both().context("initializing both directions")?;
    }
    sequencer.launch_relay().context("launching relay")?;
    println!("{}", sequencer.phase());

    while relay.is_running().context("checking relay process")? {
        std::thread::sleep(poll);
    }
    tracing::error!("relay process exited");
    sequencer.stop_relay().context("recording relay exit")?;
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use xcb_core::Side;
    use xcb_state::{MockChainRpc, MockRelayProcess, RetryPolicy};

    struct Harness {
        a: Arc<MockChainRpc>,
        b: Arc<MockChainRpc>,
        relay: Arc<MockRelayProcess>,
    }

    fn harness() -> Harness {
        let a = Arc::new(MockChainRpc::new("bridge-hub-rococo"));
        let b = Arc::new(MockChainRpc::new("bridge-hub-wococo"));
        let relay = Arc::new(MockRelayProcess::new(a.clone(), b.clone()));
        Harness { a, b, relay }
    }

    impl Harness {
        fn sequencer(&self, funding: Vec<FundingRequirement>) -> BridgeSequencer {
            let config = SequencerConfig {
                poll_interval: Duration::ZERO,
                retry: RetryPolicy::immediate(2),
                ..SequencerConfig::from_bridge(&BridgeConfig::default())
            };
            BridgeSequencer::new(self.a.clone(), self.b.clone(), self.relay.clone(), config).with_funding(funding)
        }

        fn fund(&self, requirements: &[FundingRequirement]) {
            for r in requirements {
                let chain = match r.side {
                    Side::A => &self.a,
                    Side::B => &self.b,
                };
                chain.set_balance(r.account, r.minimum);
            }
        }
    }

    #[test]
    fn funding_covers_four_reward_pots() {
        let requirements = funding_requirements(&BridgeConfig::default()).unwrap();
        assert_eq!(requirements.len(), 4);
        assert!(requirements.iter().all(|r| r.minimum == 1_000_000_000_000));
        assert_eq!(requirements.iter().filter(|r| r.side == Side::A).count(), 2);
    }

    #[test]
    fn zero_minimum_skips_side() {
        let mut config = BridgeConfig::default();
        config.side_b.reward_pot_minimum = 0;
        let requirements = funding_requirements(&config).unwrap();
        assert_eq!(requirements.len(), 2);
        assert!(requirements.iter().all(|r| r.side == Side::A));
    }

    #[test]
    fn init_b_to_a_first_is_rejected() {
        let h = harness();
        let mut seq = h.sequencer(Vec::new());
        let err = run_init_bridge(&mut seq, Direction::BToA).unwrap_err();
        assert!(format!("{err:#}").contains("initializing b-to-a"));
        assert_eq!(seq.phase(), BridgePhase::Uninitialized);
    }

    #[test]
    fn init_bridge_then_status() {
        let h = harness();
        let mut seq = h.sequencer(Vec::new());
        assert_eq!(run_init_bridge(&mut seq, Direction::AToB).unwrap(), 0);
        assert_eq!(seq.phase(), BridgePhase::OneWayInitA);

        let mut fresh = h.sequencer(Vec::new());
        assert_eq!(run_status(&mut fresh).unwrap(), 0);
        assert_eq!(fresh.phase(), BridgePhase::OneWayInitA);
    }

    #[test]
    fn init_both_from_scratch() {
        let h = harness();
        let mut seq = h.sequencer(Vec::new());
        assert_eq!(run_init_both(&mut seq).unwrap(), 0);
        assert_eq!(seq.phase(), BridgePhase::OneWayInitB);
    }

    #[test]
    fn run_relay_bootstraps_and_returns_when_relay_exits() {
        let h = harness();
        let requirements = funding_requirements(&BridgeConfig::default()).unwrap();
        h.fund(&requirements);
        let mut seq = h.sequencer(requirements);

        let relay = h.relay.clone();
        let stopper = std::thread::spawn(move || {
            while !relay.is_running().unwrap() {
                std::thread::sleep(Duration::from_millis(1));
            }
            std::thread::sleep(Duration::from_millis(20));
            relay.stop_relay().unwrap();
        });

        let code = run_relay(&mut seq, h.relay.as_ref(), Duration::from_millis(1)).unwrap();
        stopper.join().unwrap();
        assert_eq!(code, 1);
        assert_eq!(seq.phase(), BridgePhase::OneWayInitB);
        let last = seq.transitions().last().unwrap();
        assert_eq!((last.from_state, last.to_state), (BridgePhase::Relaying, BridgePhase::OneWayInitB));
    }

    #[test]
    fn run_relay_refuses_unfunded_pots() {
        let h = harness();
        let requirements = funding_requirements(&BridgeConfig::default()).unwrap();
        let mut seq = h.sequencer(requirements);
        let err = run_relay(&mut seq, h.relay.as_ref(), Duration::from_millis(1)).unwrap_err();
        assert!(format!("{err:#}").contains("launching relay"));
        assert_eq!(seq.phase(), BridgePhase::OneWayInitB);
        assert!(!h.relay.is_running().unwrap());
    }
}

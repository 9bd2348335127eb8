//! # Bridge Bootstrap Sequencer
//!
//! Brings a bidirectional bridge into service. Each direction must first be
//! initialized (the source's finality registered at the target's bridge
//! hub) and only when both are in place may the relay start.
//!
//! ```text
//! Uninitialized ──init_a──▶ OneWayInitA ──init_b──▶ OneWayInitB ──launch_relay──▶ Relaying
//!       │                        │                       ▲    │                        │
//!       │                        │                       │    └──────stop_relay◀───────┘
//!       └──────── any collaborator failure or exhausted resubmission ────────▶ Failed
//! ```
//!
//! ## Security Invariant
//!
//! `Relaying` is only entered after both directions are re-verified on
//! chain and every funding requirement holds. Out-of-order calls are
//! rejected with [`BootstrapError::SequenceViolation`] and leave the phase
//! untouched. `Failed` is terminal.
//!
//! ## Idempotency
//!
//! A direction already initialized on chain, or reported as such by the
//! relayer, counts as done. Calling an operation whose step is already
//! behind the current phase is a no-op that returns the phase.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use xcb_core::{BridgeConfig, Side, SovereignAccount};

use crate::collaborator::{ChainRpc, CollaboratorError, Direction, RelayProcess, SubmitOutcome};
use crate::error::BootstrapError;
use crate::mortality::{Submission, SubmissionStatus};
use crate::retry::{retry_call, RetryPolicy};

// ─── Phase ──────────────────────────────────────────────────────────────────

/// Where the bridge stands in its bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BridgePhase {
    /// Neither direction initialized.
    Uninitialized,
    /// A-to-B initialized.
    OneWayInitA,
    /// Both directions initialized; relay not running.
    OneWayInitB,
    /// Relay running in both directions.
    Relaying,
    /// Aborted. Terminal.
    Failed,
}

impl BridgePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// The canonical string name of this phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "UNINITIALIZED",
            Self::OneWayInitA => "ONE_WAY_INIT_A",
            Self::OneWayInitB => "ONE_WAY_INIT_B",
            Self::Relaying => "RELAYING",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for BridgePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One phase change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from_state: BridgePhase,
    pub to_state: BridgePhase,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

/// A minimum balance that must hold before the relay may start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingRequirement {
    /// Side whose bridge hub holds the account.
    pub side: Side,
    pub label: String,
    pub account: SovereignAccount,
    pub minimum: u128,
}

// ─── Configuration ──────────────────────────────────────────────────────────

/// Timing and bounds for the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerConfig {
    /// Mortality of transactions submitted to side A's bridge hub.
    pub mortality_a: u32,
    /// Mortality of transactions submitted to side B's bridge hub.
    pub mortality_b: u32,
    /// Fresh submissions allowed after the first expires.
    pub max_resubmissions: u32,
    /// Wait between inclusion polls.
    pub poll_interval: Duration,
    pub retry: RetryPolicy,
}

impl SequencerConfig {
    pub fn from_bridge(config: &BridgeConfig) -> Self {
        Self {
            mortality_a: config.side_a.transactions_mortality,
            mortality_b: config.side_b.transactions_mortality,
            max_resubmissions: config.max_resubmissions,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            retry: config.retry.into(),
        }
    }

    /// Mortality of transactions targeting `side`.
    pub fn mortality(&self, side: Side) -> u32 {
        match side {
            Side::A => self.mortality_a,
            Side::B => self.mortality_b,
        }
    }
}

// ─── Sequencer ──────────────────────────────────────────────────────────────

/// Drives one bridge from `Uninitialized` to `Relaying`.
pub struct BridgeSequencer {
    phase: BridgePhase,
    transitions: Vec<TransitionRecord>,
    rpc_a: Arc<dyn ChainRpc>,
    rpc_b: Arc<dyn ChainRpc>,
    relay: Arc<dyn RelayProcess>,
    config: SequencerConfig,
    funding: Vec<FundingRequirement>,
}

impl fmt::Debug for BridgeSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeSequencer")
            .field("phase", &self.phase)
            .field("transitions", &self.transitions.len())
            .field("rpc_a", &self.rpc_a.name())
            .field("rpc_b", &self.rpc_b.name())
            .field("config", &self.config)
            .field("funding", &self.funding.len())
            .finish()
    }
}

impl BridgeSequencer {
    /// A sequencer in `Uninitialized`. Call [`recover`](Self::recover) to
    /// pick up a bridge that is already partly set up.
    pub fn new(
        rpc_a: Arc<dyn ChainRpc>,
        rpc_b: Arc<dyn ChainRpc>,
        relay: Arc<dyn RelayProcess>,
        config: SequencerConfig,
    ) -> Self {
        Self {
            phase: BridgePhase::Uninitialized,
            transitions: Vec::new(),
            rpc_a,
            rpc_b,
            relay,
            config,
            funding: Vec::new(),
        }
    }

    /// Balances to check before [`launch_relay`](Self::launch_relay).
    pub fn with_funding(mut self, requirements: Vec<FundingRequirement>) -> Self {
        self.funding = requirements;
        self
    }

    pub fn phase(&self) -> BridgePhase {
        self.phase
    }

    /// Every phase change so far, oldest first.
    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    pub fn funding_requirements(&self) -> &[FundingRequirement] {
        &self.funding
    }

    // ── Operations ──

    /// Rebuild the phase from what the two bridge hubs report.
    ///
    /// Both directions initialized gives `OneWayInitB`, only A-to-B gives
    /// `OneWayInitA`, anything else `Uninitialized`.
    pub fn recover(&mut self) -> Result<BridgePhase, BootstrapError> {
        const OP: &str = "recover";
        self.guard(OP)?;
        if self.phase == BridgePhase::Relaying {
            return Err(self.violation(OP, "stop the relay before recovering"));
        }
        let observed = self.observe();
        let observed = self.fatal(observed)?;
        if observed != self.phase {
            self.transition(observed, "recovered from on-chain state");
        }
        Ok(self.phase)
    }

    /// Initialize A-to-B (`Uninitialized -> OneWayInitA`).
    pub fn init_a(&mut self) -> Result<BridgePhase, BootstrapError> {
        self.guard("initialize a-to-b")?;
        if self.phase != BridgePhase::Uninitialized {
            tracing::debug!(phase = %self.phase, "a-to-b already initialized, nothing to do");
            return Ok(self.phase);
        }
        let result = self.initialize_direction(Direction::AToB);
        self.fatal(result)?;
        self.transition(BridgePhase::OneWayInitA, "a-to-b bridge initialized");
        Ok(self.phase)
    }

    /// Initialize B-to-A (`OneWayInitA -> OneWayInitB`).
    pub fn init_b(&mut self) -> Result<BridgePhase, BootstrapError> {
        const OP: &str = "initialize b-to-a";
        self.guard(OP)?;
        match self.phase {
            BridgePhase::Uninitialized => {
                return Err(self.violation(OP, "a-to-b must be initialized first"));
            }
            BridgePhase::OneWayInitA => {}
            _ => {
                tracing::debug!(phase = %self.phase, "b-to-a already initialized, nothing to do");
                return Ok(self.phase);
            }
        }
        let result = self.initialize_direction(Direction::BToA);
        self.fatal(result)?;
        self.transition(BridgePhase::OneWayInitB, "b-to-a bridge initialized");
        Ok(self.phase)
    }

    /// Initialize both directions concurrently.
    ///
    /// The phase moves through `OneWayInitA` to `OneWayInitB` only after both
    /// initializations are observed on chain. If either fails the sequencer
    /// moves to `Failed`.
    pub fn initialize_both(&mut self) -> Result<BridgePhase, BootstrapError> {
        self.guard("initialize both directions")?;
        match self.phase {
            BridgePhase::Uninitialized => {}
            BridgePhase::OneWayInitA => return self.init_b(),
            _ => return Ok(self.phase),
        }

        let (a_to_b, b_to_a) = std::thread::scope(|scope| {
            let this = &*self;
            let a = scope.spawn(move || this.initialize_direction(Direction::AToB));
            let b = scope.spawn(move || this.initialize_direction(Direction::BToA));
            (
                a.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)),
                b.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)),
            )
        });

        match (a_to_b, b_to_a) {
            (Ok(()), Ok(())) => {
                self.transition(BridgePhase::OneWayInitA, "a-to-b bridge initialized");
                self.transition(BridgePhase::OneWayInitB, "b-to-a bridge initialized");
                Ok(self.phase)
            }
            (Err(e), _) | (Ok(()), Err(e)) => Err(self.fail(e)),
        }
    }

    /// Start the relay (`OneWayInitB -> Relaying`).
    ///
    /// Re-reads both initializations from chain and checks every funding
    /// requirement first. A missing initialization or balance rejects the
    /// launch without changing phase.
    pub fn launch_relay(&mut self) -> Result<BridgePhase, BootstrapError> {
        const OP: &str = "launch relay";
        self.guard(OP)?;
        match self.phase {
            BridgePhase::OneWayInitB => {}
            BridgePhase::Relaying => return Ok(self.phase),
            _ => return Err(self.violation(OP, "both bridge directions must be initialized first")),
        }

        for direction in Direction::both() {
            let target = self.rpc(direction.target());
            let initialized = self.call("verify initialization", || target.is_bridge_initialized());
            if !self.fatal(initialized)? {
                return Err(self.violation(OP, &format!("{direction} bridge is not initialized on chain")));
            }
        }

        let funded = self.check_funding();
        self.fatal(funded)?;

        let started = self.call("start relay", || self.relay.start_relay());
        self.fatal(started)?;
        self.transition(BridgePhase::Relaying, "relay started");
        Ok(self.phase)
    }

    /// Stop the relay (`Relaying -> OneWayInitB`).
    pub fn stop_relay(&mut self) -> Result<BridgePhase, BootstrapError> {
        const OP: &str = "stop relay";
        self.guard(OP)?;
        if self.phase != BridgePhase::Relaying {
            return Err(self.violation(OP, "relay is not running"));
        }
        let stopped = self.call("stop relay", || self.relay.stop_relay());
        self.fatal(stopped)?;
        self.transition(BridgePhase::OneWayInitB, "relay stopped");
        Ok(self.phase)
    }

    // ── Internals ──

    fn rpc(&self, side: Side) -> &dyn ChainRpc {
        match side {
            Side::A => self.rpc_a.as_ref(),
            Side::B => self.rpc_b.as_ref(),
        }
    }

    fn call<T>(
        &self,
        operation: &'static str,
        f: impl FnMut() -> Result<T, CollaboratorError>,
    ) -> Result<T, BootstrapError> {
        let policy = self.config.retry;
        retry_call(&policy, operation, f)
            .map_err(|e| BootstrapError::from_collaborator(e, operation, policy.max_retries + 1))
    }

    fn guard(&self, operation: &'static str) -> Result<(), BootstrapError> {
        if self.phase.is_terminal() {
            return Err(self.violation(operation, "the bridge bootstrap has failed"));
        }
        Ok(())
    }

    fn violation(&self, operation: &'static str, reason: &str) -> BootstrapError {
        tracing::warn!(phase = %self.phase, operation, reason, "operation rejected");
        BootstrapError::SequenceViolation {
            from: self.phase,
            operation,
            reason: reason.to_string(),
        }
    }

    fn transition(&mut self, to: BridgePhase, reason: &str) {
        let record = TransitionRecord {
            from_state: self.phase,
            to_state: to,
            timestamp: Utc::now(),
            reason: reason.to_string(),
        };
        tracing::info!(from = %record.from_state, to = %record.to_state, reason, "bridge phase transition");
        self.phase = to;
        self.transitions.push(record);
    }

    /// Move to `Failed` if `err` is fatal, then hand it back.
    fn fail(&mut self, err: BootstrapError) -> BootstrapError {
        if err.is_fatal() && !self.phase.is_terminal() {
            tracing::error!(phase = %self.phase, error = %err, "bridge bootstrap failed");
            self.transition(BridgePhase::Failed, &err.to_string());
        }
        err
    }

    fn fatal<T>(&mut self, result: Result<T, BootstrapError>) -> Result<T, BootstrapError> {
        result.map_err(|e| self.fail(e))
    }

    fn observe(&self) -> Result<BridgePhase, BootstrapError> {
        let a_to_b = self.rpc(Direction::AToB.target());
        let b_to_a = self.rpc(Direction::BToA.target());
        let a_done = self.call("query initialization", || a_to_b.is_bridge_initialized())?;
        let b_done = self.call("query initialization", || b_to_a.is_bridge_initialized())?;
        tracing::debug!(a_to_b = a_done, b_to_a = b_done, "observed bridge initialization");
        Ok(match (a_done, b_done) {
            (true, true) => BridgePhase::OneWayInitB,
            (true, false) => BridgePhase::OneWayInitA,
            _ => BridgePhase::Uninitialized,
        })
    }

    /// Submit `direction` until it is observed in the target's finalized
    /// state.
    ///
    /// Does not touch the phase, so both directions can run on separate
    /// threads.
    fn initialize_direction(&self, direction: Direction) -> Result<(), BootstrapError> {
        let target = self.rpc(direction.target());
        let mortality = self.config.mortality(direction.target());

        if self.call("query initialization", || target.is_bridge_initialized())? {
            tracing::info!(%direction, chain = target.name(), "bridge already initialized on chain");
            return Ok(());
        }

        let mut attempt = 0;
        loop {
            let outcome = self.call("init bridge", || self.relay.init_bridge(direction))?;
            // The relayer signed against a best block no later than this one.
            let submitted_at = self.call("query best block", || target.best_number())?;
            let submission = Submission::new(direction, submitted_at, mortality, attempt);
            match outcome {
                SubmitOutcome::Submitted => tracing::info!(
                    %direction,
                    chain = target.name(),
                    submitted_at,
                    last_valid_block = submission.last_valid_block(),
                    attempt,
                    "bridge initialization submitted"
                ),
                // The relayer sees the best block. Wait for the finalized state.
                SubmitOutcome::AlreadyInitialized => tracing::info!(
                    %direction,
                    chain = target.name(),
                    submitted_at,
                    "relayer reports bridge already initialized, awaiting finality"
                ),
            }

            if self.await_inclusion(target, &submission)? {
                tracing::info!(%direction, chain = target.name(), attempt, "bridge initialization included");
                return Ok(());
            }

            if attempt >= self.config.max_resubmissions {
                return Err(BootstrapError::OperationExpired {
                    direction,
                    submitted_at,
                    mortality,
                    submissions: attempt + 1,
                });
            }
            attempt += 1;
            tracing::warn!(
                %direction,
                submitted_at,
                mortality,
                resubmission = attempt,
                max_resubmissions = self.config.max_resubmissions,
                "bridge initialization expired, resubmitting"
            );
        }
    }

    /// Poll until `submission` is included (`true`) or expires (`false`).
    fn await_inclusion(&self, target: &dyn ChainRpc, submission: &Submission) -> Result<bool, BootstrapError> {
        loop {
            let included = self.call("query initialization", || target.is_bridge_initialized())?;
            let finalized = if included {
                submission.submitted_at
            } else {
                self.call("query finality", || target.finalized_number())?
            };
            match submission.status(included, finalized) {
                SubmissionStatus::Included => return Ok(true),
                SubmissionStatus::Expired => return Ok(false),
                SubmissionStatus::Pending => {
                    tracing::trace!(direction = %submission.direction, finalized, "awaiting inclusion");
                    std::thread::sleep(self.config.poll_interval);
                }
            }
        }
    }

    fn check_funding(&self) -> Result<(), BootstrapError> {
        for req in &self.funding {
            let chain = self.rpc(req.side);
            let available = self.call("query balance", || chain.free_balance(&req.account))?;
            if available < req.minimum {
                tracing::warn!(label = %req.label, account = %req.account, available, required = req.minimum, "account underfunded");
                return Err(BootstrapError::Unfunded {
                    side: req.side,
                    label: req.label.clone(),
                    account: req.account,
                    required: req.minimum,
                    available,
                });
            }
            tracing::debug!(label = %req.label, available, "funding requirement met");
        }
        Ok(())
    }
}

//! # Collaborator Interfaces
//!
//! The sequencer never talks to a node or spawns a process itself. It sees
//! the outside world through two narrow traits:
//!
//! - [`ChainRpc`]: read-only queries against one bridge hub (best and
//!   finalized block, bridge initialization status, balances). Storage
//!   reads are answered from the finalized state, never the best block.
//! - [`RelayProcess`]: the external relayer, which submits the signed
//!   initialization transactions and runs the steady-state relay.
//!
//! Both are synchronous, object-safe and `Send + Sync` so one instance can
//! be shared behind an `Arc` across the scoped threads of
//! [`crate::BridgeSequencer::initialize_both`]. Production implementations
//! live in `xcb-client`; the in-memory mocks here drive the tests.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use xcb_core::{IdentifierError, Side, SovereignAccount};

/// Failure reported by a collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// Transport or node failure. Retried with backoff.
    #[error("{collaborator} unavailable: {reason}")]
    Unavailable {
        /// Name of the collaborator instance.
        collaborator: String,
        /// What went wrong.
        reason: String,
    },

    /// The request was refused (bad signer, dispatch error). Never retried.
    #[error("{collaborator} rejected the request: {reason}")]
    Rejected {
        /// Name of the collaborator instance.
        collaborator: String,
        /// What went wrong.
        reason: String,
    },
}

impl CollaboratorError {
    pub fn unavailable(collaborator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            collaborator: collaborator.into(),
            reason: reason.into(),
        }
    }

    pub fn rejected(collaborator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            collaborator: collaborator.into(),
            reason: reason.into(),
        }
    }

    /// Whether a retry may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// One direction of the bridge.
///
/// `AToB` registers A's finality at B's bridge hub, so B can verify messages
/// coming from A. Its transactions are submitted to, and observed on, B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    AToB,
    BToA,
}

impl Direction {
    /// Both directions, A-to-B first.
    pub fn both() -> [Direction; 2] {
        [Direction::AToB, Direction::BToA]
    }

    /// Side whose finality is being registered.
    pub fn source(self) -> Side {
        match self {
            Self::AToB => Side::A,
            Self::BToA => Side::B,
        }
    }

    /// Side whose bridge hub receives the initialization.
    pub fn target(self) -> Side {
        self.source().other()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AToB => "a-to-b",
            Self::BToA => "b-to-a",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a-to-b" => Ok(Self::AToB),
            "b-to-a" => Ok(Self::BToA),
            other => Err(IdentifierError {
                kind: "direction",
                input: other.to_string(),
                reason: "expected `a-to-b` or `b-to-a`".to_string(),
            }),
        }
    }
}

/// Result of asking the relayer to initialize a bridge direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitOutcome {
    /// A transaction was submitted; inclusion is not yet known.
    Submitted,
    /// The target reported the bridge already initialized.
    AlreadyInitialized,
}

/// Read-only view of one bridge hub.
pub trait ChainRpc: Send + Sync {
    /// Instance name for logs and errors.
    fn name(&self) -> &str;

    /// Number of the latest finalized block.
    fn finalized_number(&self) -> Result<u32, CollaboratorError>;

    /// Number of the best block. Transactions are signed against it, so
    /// their mortality era starts here.
    fn best_number(&self) -> Result<u32, CollaboratorError>;

    /// Whether the finality pallet tracking the remote chain is initialized
    /// in the finalized state.
    fn is_bridge_initialized(&self) -> Result<bool, CollaboratorError>;

    /// Free balance of `account` in the finalized state, zero if the
    /// account does not exist.
    fn free_balance(&self, account: &SovereignAccount) -> Result<u128, CollaboratorError>;
}

/// The external relayer.
pub trait RelayProcess: Send + Sync {
    /// Submit the initialization of `direction` to its target.
    fn init_bridge(&self, direction: Direction) -> Result<SubmitOutcome, CollaboratorError>;

    /// Start the long-running bidirectional relay.
    fn start_relay(&self) -> Result<(), CollaboratorError>;

    /// Stop the relay if it is running.
    fn stop_relay(&self) -> Result<(), CollaboratorError>;

    fn is_running(&self) -> Result<bool, CollaboratorError>;
}

// ─── Mocks ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct MockChainState {
    finalized: u32,
    /// Best block runs this many blocks ahead of finality.
    finality_lag: u32,
    blocks_per_query: u32,
    /// Initialization visible in the finalized state.
    initialized: bool,
    /// Initialization visible in the best block.
    best_initialized: bool,
    /// Whether a landed submission also becomes final. When `false` it stays
    /// in the best block only, as if its fork were about to be abandoned.
    finalize_inclusions: bool,
    /// Initialization-status queries left before a pending submission lands.
    /// `None` when nothing is pending.
    pending_inclusion: Option<u32>,
    balances: HashMap<SovereignAccount, u128>,
    failures: VecDeque<CollaboratorError>,
}

/// In-memory bridge hub.
///
/// Every `finalized_number` call advances finality by `blocks_per_query`
/// (default 1), so waiting on a mortality window terminates without a real
/// clock. The best block sits `finality_lag` blocks (default 0) ahead.
#[derive(Debug)]
pub struct MockChainRpc {
    name: String,
    state: Mutex<MockChainState>,
}

impl MockChainRpc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(MockChainState {
                finalized: 0,
                finality_lag: 0,
                blocks_per_query: 1,
                initialized: false,
                best_initialized: false,
                finalize_inclusions: true,
                pending_inclusion: None,
                balances: HashMap::new(),
                failures: VecDeque::new(),
            }),
        }
    }

    /// Mark the bridge pallet initialized (or not) immediately, in both the
    /// best and the finalized state.
    pub fn set_initialized(&self, initialized: bool) {
        let mut state = self.state.lock();
        state.initialized = initialized;
        state.best_initialized = initialized;
        state.pending_inclusion = None;
    }

    /// Keep landed submissions out of the finalized state (`false`).
    pub fn set_finalize_inclusions(&self, finalize: bool) {
        self.state.lock().finalize_inclusions = finalize;
    }

    pub fn set_finality_lag(&self, blocks: u32) {
        self.state.lock().finality_lag = blocks;
    }

    pub fn set_balance(&self, account: SovereignAccount, amount: u128) {
        self.state.lock().balances.insert(account, amount);
    }

    pub fn set_blocks_per_query(&self, blocks: u32) {
        self.state.lock().blocks_per_query = blocks;
    }

    /// Make the next call (of any method) fail with `error`. Calls queue up.
    pub fn fail_next(&self, error: CollaboratorError) {
        self.state.lock().failures.push_back(error);
    }

    /// Schedule a submitted initialization to become visible after
    /// `after_queries` status queries, or never when `None`.
    pub fn schedule_inclusion(&self, after_queries: Option<u32>) {
        self.state.lock().pending_inclusion = after_queries;
    }

    /// Current finalized number without advancing it.
    pub fn peek_finalized(&self) -> u32 {
        self.state.lock().finalized
    }

    /// Finalized view of the initialization.
    pub fn peek_initialized(&self) -> bool {
        self.state.lock().initialized
    }

    /// Best-block view of the initialization.
    pub fn peek_best_initialized(&self) -> bool {
        self.state.lock().best_initialized
    }
}

impl ChainRpc for MockChainRpc {
    fn name(&self) -> &str {
        &self.name
    }

    fn finalized_number(&self) -> Result<u32, CollaboratorError> {
        let mut state = self.state.lock();
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }
        state.finalized = state.finalized.saturating_add(state.blocks_per_query);
        Ok(state.finalized)
    }

    fn best_number(&self) -> Result<u32, CollaboratorError> {
        let mut state = self.state.lock();
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }
        Ok(state.finalized.saturating_add(state.finality_lag))
    }

    fn is_bridge_initialized(&self) -> Result<bool, CollaboratorError> {
        let mut state = self.state.lock();
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }
        match state.pending_inclusion {
            Some(0) => {
                state.best_initialized = true;
                state.initialized |= state.finalize_inclusions;
                state.pending_inclusion = None;
            }
            Some(n) => state.pending_inclusion = Some(n - 1),
            None => {}
        }
        Ok(state.initialized)
    }

    fn free_balance(&self, account: &SovereignAccount) -> Result<u128, CollaboratorError> {
        let mut state = self.state.lock();
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }
        Ok(state.balances.get(account).copied().unwrap_or(0))
    }
}

#[derive(Debug)]
struct MockRelayState {
    running: bool,
    default_inclusion: Option<u32>,
    inclusion_script: VecDeque<Option<u32>>,
    outcomes: VecDeque<Result<SubmitOutcome, CollaboratorError>>,
    submissions: Vec<Direction>,
    submitted_finality: Vec<u32>,
}

/// In-memory relayer wired to two [`MockChainRpc`]s.
///
/// A submission schedules inclusion on the target chain. By default it lands
/// on the second status query after submission; [`script_inclusion`]
/// overrides that per submission, and [`push_outcome`] replaces the whole
/// response of the next call.
///
/// [`script_inclusion`]: MockRelayProcess::script_inclusion
/// [`push_outcome`]: MockRelayProcess::push_outcome
#[derive(Debug)]
pub struct MockRelayProcess {
    chain_a: Arc<MockChainRpc>,
    chain_b: Arc<MockChainRpc>,
    state: Mutex<MockRelayState>,
}

impl MockRelayProcess {
    pub fn new(chain_a: Arc<MockChainRpc>, chain_b: Arc<MockChainRpc>) -> Self {
        Self {
            chain_a,
            chain_b,
            state: Mutex::new(MockRelayState {
                running: false,
                default_inclusion: Some(1),
                inclusion_script: VecDeque::new(),
                outcomes: VecDeque::new(),
                submissions: Vec::new(),
                submitted_finality: Vec::new(),
            }),
        }
    }

    /// Inclusion delay for the next unscripted submission (`None`: dropped).
    pub fn script_inclusion(&self, after_queries: Option<u32>) {
        self.state.lock().inclusion_script.push_back(after_queries);
    }

    /// Inclusion delay used once the script is exhausted.
    pub fn set_default_inclusion(&self, after_queries: Option<u32>) {
        self.state.lock().default_inclusion = after_queries;
    }

    /// Replace the response of the next `init_bridge` call.
    pub fn push_outcome(&self, outcome: Result<SubmitOutcome, CollaboratorError>) {
        self.state.lock().outcomes.push_back(outcome);
    }

    /// Every direction passed to `init_bridge`, in call order.
    pub fn submissions(&self) -> Vec<Direction> {
        self.state.lock().submissions.clone()
    }

    /// Target finalized number at each `init_bridge` call.
    pub fn submitted_finality(&self) -> Vec<u32> {
        self.state.lock().submitted_finality.clone()
    }
}

impl RelayProcess for MockRelayProcess {
    fn init_bridge(&self, direction: Direction) -> Result<SubmitOutcome, CollaboratorError> {
        let target = match direction.target() {
            Side::A => &self.chain_a,
            Side::B => &self.chain_b,
        };
        let delay = {
            let mut state = self.state.lock();
            state.submissions.push(direction);
            state.submitted_finality.push(target.peek_finalized());
            match state.outcomes.pop_front() {
                Some(Ok(SubmitOutcome::Submitted)) | None => {}
                Some(other) => return other,
            }
            let default = state.default_inclusion;
            state.inclusion_script.pop_front().unwrap_or(default)
        };
        if target.peek_best_initialized() {
            return Ok(SubmitOutcome::AlreadyInitialized);
        }
        target.schedule_inclusion(delay);
        Ok(SubmitOutcome::Submitted)
    }

    fn start_relay(&self) -> Result<(), CollaboratorError> {
        self.state.lock().running = true;
        Ok(())
    }

    fn stop_relay(&self) -> Result<(), CollaboratorError> {
        self.state.lock().running = false;
        Ok(())
    }

    fn is_running(&self) -> Result<bool, CollaboratorError> {
        Ok(self.state.lock().running)
    }
}

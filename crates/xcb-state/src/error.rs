//! # Bootstrap Errors

use thiserror::Error;
use xcb_core::{Side, SovereignAccount};

use crate::bootstrap::BridgePhase;
use crate::collaborator::{CollaboratorError, Direction};

/// Errors from the bridge bootstrap sequencer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    /// The operation is not allowed from the current phase. No state change.
    #[error("cannot {operation} from {from}: {reason}")]
    SequenceViolation {
        /// Phase at the time of the call.
        from: BridgePhase,
        /// The rejected operation.
        operation: &'static str,
        reason: String,
    },

    /// A collaborator stayed unreachable through every retry.
    #[error("{collaborator} unavailable during {operation} after {attempts} attempts: {reason}")]
    CollaboratorUnavailable {
        collaborator: String,
        operation: &'static str,
        attempts: u32,
        reason: String,
    },

    /// A collaborator refused the request.
    #[error("{collaborator} rejected {operation}: {reason}")]
    CollaboratorRejected {
        collaborator: String,
        operation: &'static str,
        reason: String,
    },

    /// Every submission of an initialization expired before inclusion.
    #[error(
        "{direction} initialization expired: last submitted at #{submitted_at} with mortality {mortality}, {submissions} submissions"
    )]
    OperationExpired {
        direction: Direction,
        /// Best number the last submission's window is anchored at.
        submitted_at: u32,
        mortality: u32,
        /// Total submissions made, including the first.
        submissions: u32,
    },

    /// A funding requirement is not met. No state change.
    #[error("{label} on side {side} ({account}) holds {available}, needs at least {required}")]
    Unfunded {
        side: Side,
        label: String,
        account: SovereignAccount,
        required: u128,
        available: u128,
    },
}

impl BootstrapError {
    /// Wrap a collaborator failure with the operation it interrupted.
    pub(crate) fn from_collaborator(err: CollaboratorError, operation: &'static str, attempts: u32) -> Self {
        match err {
            CollaboratorError::Unavailable { collaborator, reason } => Self::CollaboratorUnavailable {
                collaborator,
                operation,
                attempts,
                reason,
            },
            CollaboratorError::Rejected { collaborator, reason } => Self::CollaboratorRejected {
                collaborator,
                operation,
                reason,
            },
        }
    }

    /// Whether this error moves the sequencer to `Failed`.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::CollaboratorUnavailable { .. } | Self::CollaboratorRejected { .. } | Self::OperationExpired { .. }
        )
    }
}

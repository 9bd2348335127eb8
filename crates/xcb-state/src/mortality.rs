//! # Transaction Mortality
//!
//! A relayer transaction is valid for `mortality` blocks after the block it
//! was signed against. That block is the target's best block, which runs
//! ahead of finality, so the sequencer anchors the window at the best
//! number read once the relayer has returned. Once finality passes
//! `submitted_at + mortality` without the effect being observed, no fork
//! can include the transaction any more and a fresh one may replace it.

use serde::{Deserialize, Serialize};

use crate::collaborator::Direction;

/// One submitted initialization and its validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub direction: Direction,
    /// Target best number observed right after submitting. Never below
    /// the block the transaction was signed against.
    pub submitted_at: u32,
    /// Validity window in blocks.
    pub mortality: u32,
    /// 0 for the first submission, incremented per resubmission.
    pub attempt: u32,
}

/// Where a submission stands against the target's finality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Included,
    Pending,
    Expired,
}

impl Submission {
    pub fn new(direction: Direction, submitted_at: u32, mortality: u32, attempt: u32) -> Self {
        Self {
            direction,
            submitted_at,
            mortality,
            attempt,
        }
    }

    /// Last finalized number at which the transaction may still be included.
    pub fn last_valid_block(&self) -> u32 {
        self.submitted_at.saturating_add(self.mortality)
    }

    pub fn is_expired(&self, finalized: u32) -> bool {
        finalized > self.last_valid_block()
    }

    /// Classify the submission given the latest observations.
    ///
    /// Inclusion wins over expiry: if the effect is visible the transaction
    /// landed, however late it is noticed.
    pub fn status(&self, included: bool, finalized: u32) -> SubmissionStatus {
        if included {
            SubmissionStatus::Included
        } else if self.is_expired(finalized) {
            SubmissionStatus::Expired
        } else {
            SubmissionStatus::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn window_is_inclusive() {
        let s = Submission::new(Direction::AToB, 10, 4, 0);
        assert_eq!(s.last_valid_block(), 14);
        assert!(!s.is_expired(14));
        assert!(s.is_expired(15));
    }

    #[test]
    fn window_follows_best_block_not_finality() {
        // Signed at best 100 while finality stood at 90.
        let s = Submission::new(Direction::AToB, 100, 4, 0);
        assert!(!s.is_expired(95));
        assert!(!s.is_expired(104));
        assert!(s.is_expired(105));
    }

    #[test]
    fn inclusion_beats_expiry() {
        let s = Submission::new(Direction::BToA, 10, 4, 0);
        assert_eq!(s.status(true, 100), SubmissionStatus::Included);
        assert_eq!(s.status(false, 100), SubmissionStatus::Expired);
        assert_eq!(s.status(false, 12), SubmissionStatus::Pending);
    }

    #[test]
    fn window_saturates_at_chain_end() {
        let s = Submission::new(Direction::AToB, u32::MAX - 1, 4, 0);
        assert!(!s.is_expired(u32::MAX));
    }

    proptest! {
        /// Once expired, a submission stays expired as finality advances.
        #[test]
        fn expiry_is_monotonic(at in 0u32..1_000_000, mortality in 1u32..64, f in 0u32..2_000_000, step in 0u32..1000) {
            let s = Submission::new(Direction::AToB, at, mortality, 0);
            if s.is_expired(f) {
                prop_assert!(s.is_expired(f.saturating_add(step)));
            }
        }
    }
}

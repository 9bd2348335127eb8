//! Retry with exponential backoff for collaborator calls.
//!
//! Retries only [`CollaboratorError::Unavailable`]. Rejections are returned
//! immediately: resubmitting a badly signed transaction cannot succeed.

use std::time::Duration;

use xcb_core::RetryConfig;

use crate::collaborator::CollaboratorError;

/// Retry bound and base delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles each attempt.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// No waiting between attempts. For tests.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::ZERO,
        }
    }

    fn delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryConfig::default().into()
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }
}

/// Call `f` until it succeeds, fails non-retryably, or the bound is spent.
///
/// `f` runs at most `max_retries + 1` times. Delays: base, 2×base, 4×base...
pub fn retry_call<T, F>(policy: &RetryPolicy, operation: &str, mut f: F) -> Result<T, CollaboratorError>
where
    F: FnMut() -> Result<T, CollaboratorError>,
{
    for attempt in 0..policy.max_retries {
        match f() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() => {
                let delay = policy.delay(attempt);
                tracing::warn!(
                    operation,
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    "collaborator call failed, retrying in {delay:?}: {e}"
                );
                std::thread::sleep(delay);
            }
            Err(e) => return Err(e),
        }
    }
    // Final attempt, no more retries.
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_until_success() {
        let mut calls = 0;
        let result = retry_call(&RetryPolicy::immediate(3), "query", || {
            calls += 1;
            if calls < 3 {
                Err(CollaboratorError::unavailable("rpc", "refused"))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn exhausts_bound_on_persistent_failure() {
        let mut calls = 0u32;
        let result: Result<(), _> = retry_call(&RetryPolicy::immediate(3), "query", || {
            calls += 1;
            Err(CollaboratorError::unavailable("rpc", "refused"))
        });
        assert!(result.is_err());
        assert_eq!(calls, 4);
    }

    #[test]
    fn rejection_is_not_retried() {
        let mut calls = 0u32;
        let result: Result<(), _> = retry_call(&RetryPolicy::immediate(3), "query", || {
            calls += 1;
            Err(CollaboratorError::rejected("relay", "bad origin"))
        });
        assert!(matches!(result, Err(CollaboratorError::Rejected { .. })));
        assert_eq!(calls, 1);
    }

    #[test]
    fn delay_doubles() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
        };
        assert_eq!(policy.delay(0), Duration::from_millis(200));
        assert_eq!(policy.delay(2), Duration::from_millis(800));
    }
}

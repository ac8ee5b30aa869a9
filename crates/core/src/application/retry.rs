// Retry logic for the background-edit loop

use tracing::{info, warn};

/// Retry decision result
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the given backoff delay in ms
    Retry(i64),
    /// Attempt budget spent; fall back instead of retrying
    Exhausted,
}

/// Retry policy for the flaky generative collaborator.
///
/// The delay grows with the attempt number: `base_delay_ms x attempt`.
/// No delay is scheduled after the final attempt - the caller goes straight
/// to its fallback. No jitter: attempts pace a single request, there is no
/// herd to spread out.
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: i64,
}

impl RetryPolicy {
    /// # Arguments
    /// * `max_attempts` - Total attempts allowed (including the first)
    /// * `base_delay_ms` - Backoff base (default: 2000)
    pub fn new(max_attempts: u32, base_delay_ms: i64) -> Self {
        Self {
            max_attempts,
            base_delay_ms,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decide what to do after attempt number `attempt` (1-based) failed.
    ///
    /// Returns:
    /// - `RetryDecision::Retry(delay_ms)` with `delay = base x attempt`
    /// - `RetryDecision::Exhausted` when the budget is spent
    pub fn should_retry(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            warn!(
                attempt = %attempt,
                max_attempts = %self.max_attempts,
                "Max edit attempts reached"
            );
            return RetryDecision::Exhausted;
        }

        let delay_ms = self.base_delay_ms * attempt as i64;

        info!(
            attempt = %attempt,
            max_attempts = %self.max_attempts,
            delay_ms = %delay_ms,
            "Scheduling edit retry"
        );

        RetryDecision::Retry(delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_grow_with_attempt_number() {
        let policy = RetryPolicy::new(3, 2_000);

        assert_eq!(policy.should_retry(1), RetryDecision::Retry(2_000));
        assert_eq!(policy.should_retry(2), RetryDecision::Retry(4_000));
    }

    #[test]
    fn exhausted_at_max_attempts() {
        let policy = RetryPolicy::new(3, 2_000);

        assert_eq!(policy.should_retry(3), RetryDecision::Exhausted);
        assert_eq!(policy.should_retry(4), RetryDecision::Exhausted);
    }

    #[test]
    fn zero_budget_never_retries() {
        let policy = RetryPolicy::new(0, 2_000);
        assert_eq!(policy.should_retry(1), RetryDecision::Exhausted);
    }
}

// ── Retry policy ──
//
// Linear backoff: the pause before attempt k+1 is `delay * k`.

use std::time::Duration;

/// Default number of attempts per call (the first try included).
pub const RETRY_ATTEMPTS: u32 = 3;

/// Default backoff unit.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Default per-attempt time budget.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Bounded retry configuration for a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 behave as 1.
    pub attempts: u32,
    /// Backoff unit multiplied by the number of failures so far.
    pub delay: Duration,
    /// Budget for one attempt (send + body read).
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: RETRY_ATTEMPTS,
            delay: RETRY_DELAY,
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// Policy that performs exactly one attempt.
    pub fn no_retry(timeout: Duration) -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
            timeout,
        }
    }

    pub(crate) fn max_attempts(&self) -> u32 {
        self.attempts.max(1)
    }

    /// Pause inserted after `failures` failed attempts.
    pub fn delay_after(&self, failures: u32) -> Duration {
        self.delay.saturating_mul(failures)
    }

    /// Upper bound on the wall-clock time of one call under this policy.
    pub fn worst_case(&self) -> Duration {
        let attempts = self.max_attempts();
        let waits: Duration = (1..attempts).map(|k| self.delay_after(k)).sum();
        self.timeout.saturating_mul(attempts).saturating_add(waits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_is_linear() {
        let policy = RetryPolicy {
            attempts: 3,
            delay: Duration::from_millis(200),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(policy.delay_after(1), Duration::from_millis(200));
        assert_eq!(policy.delay_after(2), Duration::from_millis(400));
    }

    #[test]
    fn worst_case_sums_timeouts_and_waits() {
        let policy = RetryPolicy {
            attempts: 3,
            delay: Duration::from_secs(1),
            timeout: Duration::from_secs(10),
        };
        // 3 * 10s + (1s + 2s)
        assert_eq!(policy.worst_case(), Duration::from_secs(33));
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let policy = RetryPolicy {
            attempts: 0,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.worst_case(), REQUEST_TIMEOUT);
    }
}

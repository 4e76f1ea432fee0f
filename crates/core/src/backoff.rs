use std::time::Duration;

/// What to do after a status read, healthy or not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Schedule the next read after this delay.
    RetryAfter(Duration),
    /// Retry budget exhausted; stop polling and fail the session.
    GiveUp,
}

/// Pure retry/backoff policy for status reads.
///
/// Healthy cadence is the fixed `base_interval`. Each consecutive transport
/// failure grows the next delay by `multiplier`, capped at `max_delay`. A
/// hard ceiling of `max_attempts` consecutive failed reads bounds the
/// session even under sustained unreachability. The first successful read
/// resets both the delay and the budget.
#[derive(Clone, Debug)]
pub struct BackoffPolicy {
    /// Delay between reads while the endpoint is healthy.
    pub base_interval: Duration,
    /// Growth factor applied per consecutive failure.
    pub multiplier: f64,
    /// Upper bound on any single retry delay.
    pub max_delay: Duration,
    /// Consecutive failed reads tolerated before giving up.
    pub max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_secs(2),
            multiplier: 1.5,
            max_delay: Duration::from_secs(30),
            max_attempts: 60,
        }
    }
}

impl BackoffPolicy {
    /// Decision after a read, given how many transport failures have been
    /// seen in a row. `0` means the last read succeeded.
    pub fn next(&self, consecutive_failures: u32) -> RetryDecision {
        if consecutive_failures == 0 {
            return RetryDecision::RetryAfter(self.base_interval);
        }
        if consecutive_failures >= self.max_attempts {
            return RetryDecision::GiveUp;
        }
        let grown = self.base_interval.as_secs_f64()
            * self.multiplier.powi((consecutive_failures - 1) as i32);
        let delay = Duration::from_secs_f64(grown.min(self.max_delay.as_secs_f64()));
        RetryDecision::RetryAfter(delay)
    }
}

use std::time::Duration;

/// Retry policy for page fetches: bounded attempts with uniformly
/// randomized delays. The courtesy delay runs before every attempt to
/// throttle request rate; the backoff delay runs between failed attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub courtesy_delay_secs: (f64, f64),
    pub backoff_delay_secs: (f64, f64),
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            courtesy_delay_secs: (0.5, 2.0),
            backoff_delay_secs: (1.0, 3.0),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self { max_retries, ..Default::default() }
    }

    /// Randomized pre-request delay.
    pub fn courtesy_delay(&self) -> Duration {
        sample_uniform(self.courtesy_delay_secs)
    }

    /// Randomized delay before the next attempt after a failure.
    pub fn backoff_delay(&self) -> Duration {
        sample_uniform(self.backoff_delay_secs)
    }

    /// Whether another attempt is allowed after `attempts` failures.
    pub fn should_retry(&self, attempts: u32) -> bool {
        attempts < self.max_retries
    }
}

fn sample_uniform((lo, hi): (f64, f64)) -> Duration {
    if hi <= lo {
        return Duration::from_secs_f64(lo.max(0.0));
    }
    Duration::from_secs_f64(rand::random_range(lo..hi))
}

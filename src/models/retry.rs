use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: u64,
}

/// Errors that can tell a passing upstream hiccup from a permanent failure.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

impl RetryConfig {
    /// Un-jittered wait before retry number `retry` (1-based), capped at `max_delay_ms`.
    pub fn base_backoff(&self, retry: u32) -> Duration {
        let factor = self
            .backoff_multiplier
            .saturating_pow(retry.saturating_sub(1));
        let delay_ms = self
            .initial_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);

        Duration::from_millis(delay_ms)
    }

    /// [`base_backoff`](Self::base_backoff) with ±10% jitter so pollers don't line up.
    pub fn backoff(&self, retry: u32) -> Duration {
        let jitter: f64 = rand::random_range(-0.1..=0.1);
        self.base_backoff(retry).mul_f64(1.0 + jitter)
    }
}

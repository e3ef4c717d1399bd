use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

/// Unit the destination uses for the `retry-after` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryAfterUnit {
    #[default]
    Milliseconds,
    Seconds,
}

impl RetryAfterUnit {
    /// Converts a raw header value, tolerating fractional values such as `"1.25"`.
    pub fn to_duration(self, value: f64) -> Option<Duration> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }

        let seconds = match self {
            RetryAfterUnit::Milliseconds => value / 1000.0,
            RetryAfterUnit::Seconds => value,
        };

        Duration::try_from_secs_f64(seconds).ok()
    }
}

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub retry_after_unit: RetryAfterUnit,
    /// `None` keeps retrying for as long as the endpoint answers 429.
    pub max_rate_limit_retries: Option<u32>,
    pub max_total_wait: Option<Duration>,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            retry_after_unit: RetryAfterUnit::Milliseconds,
            max_rate_limit_retries: Some(10),
            max_total_wait: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("failed to encode payload: {0}")]
    Encode(String),

    #[error("webhook request failed: {0}")]
    Transport(String),

    #[error("webhook rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("rate limited without a usable retry-after header")]
    MissingRetryAfter,

    #[error("still rate limited after {retries} retries")]
    RetryLimitExceeded { retries: u32 },

    #[error("rate limit wait of {requested:?} would exceed the {ceiling:?} ceiling")]
    WaitCeilingExceeded { requested: Duration, ceiling: Duration },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    RateLimitedThenDelivered { retries: u32 },
    Failed(DispatchError),
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        !matches!(self, DispatchOutcome::Failed(_))
    }
}

impl Display for DispatchOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DispatchOutcome::Delivered => write!(f, "delivered"),
            DispatchOutcome::RateLimitedThenDelivered { retries } => {
                write!(f, "delivered after {} rate-limited attempt(s)", retries)
            }
            DispatchOutcome::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

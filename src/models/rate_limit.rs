use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use tracing::warn;

use crate::models::dispatch::RetryAfterUnit;

pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RESET_HEADER: &str = "x-ratelimit-reset";
pub const RESET_AFTER_HEADER: &str = "x-ratelimit-reset-after";
pub const RETRY_AFTER_HEADER: &str = "retry-after";

/// Rate-limit bookkeeping read from a single webhook response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateLimitState {
    pub remaining: Option<u32>,
    pub reset_at: Option<DateTime<Utc>>,
    pub reset_after: Option<Duration>,
    pub retry_after: Option<Duration>,
}

impl RateLimitState {
    pub fn from_headers(headers: &HeaderMap, unit: RetryAfterUnit) -> Self {
        let remaining = header_number(headers, REMAINING_HEADER).and_then(|v| {
            if v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 {
                Some(v as u32)
            } else {
                warn!(value = v, "Ignoring out-of-range {} header", REMAINING_HEADER);
                None
            }
        });

        let reset_at = header_number(headers, RESET_HEADER)
            .and_then(|v| DateTime::<Utc>::from_timestamp_millis((v * 1000.0) as i64));

        let reset_after = header_number(headers, RESET_AFTER_HEADER)
            .and_then(|v| RetryAfterUnit::Seconds.to_duration(v));

        let retry_after =
            header_number(headers, RETRY_AFTER_HEADER).and_then(|v| unit.to_duration(v));

        Self {
            remaining,
            reset_at,
            reset_after,
            retry_after,
        }
    }

    pub fn quota_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Pause to take after a delivered message, if the quota is used up.
    ///
    /// Prefers `retry-after`, then Discord's `x-ratelimit-reset-after`, then
    /// the distance to `x-ratelimit-reset`.
    pub fn cooldown(&self, now: DateTime<Utc>) -> Option<Duration> {
        if !self.quota_exhausted() {
            return None;
        }

        self.retry_after.or(self.reset_after).or_else(|| {
            self.reset_at
                .and_then(|reset_at| (reset_at - now).to_std().ok())
        })
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<f64> {
    let raw = headers.get(name)?;

    match raw.to_str().ok().and_then(|s| s.trim().parse::<f64>().ok()) {
        Some(value) => Some(value),
        None => {
            warn!(header = name, value = ?raw, "Ignoring unparseable rate limit header");
            None
        }
    }
}

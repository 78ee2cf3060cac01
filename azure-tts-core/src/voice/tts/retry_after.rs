//! Interpretation of the `Retry-After` header on 429 responses.
//!
//! The header is either a delay in seconds (`Retry-After: 30`) or an
//! HTTP-date (`Retry-After: Wed, 21 Oct 2015 07:28:00 GMT`). Only the wait
//! is computed; nothing here sleeps or retries.

use chrono::{DateTime, Utc};

/// Time to wait before the service accepts another request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryAfter {
    seconds: u64,
}

impl RetryAfter {
    pub fn from_seconds(seconds: u64) -> Self {
        Self { seconds }
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    /// Parse a header value relative to `now`. Returns `None` when the value
    /// is neither an integer nor an HTTP-date.
    pub fn parse(value: &str, now: DateTime<Utc>) -> Option<Self> {
        let value = value.trim();

        if let Ok(seconds) = value.parse::<i64>() {
            return Some(Self::from_seconds(seconds.max(0) as u64));
        }

        let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
        let millis = (at - now).num_milliseconds().max(0);
        // Round to the nearest whole second for display.
        Some(Self::from_seconds(((millis + 500) / 1000) as u64))
    }
}

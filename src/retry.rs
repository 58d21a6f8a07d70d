//! Retry policy for rate-limited and failing requests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;

/// Default number of retries for 429/500 responses.
pub const DEFAULT_MAX_RETRIES: u32 = 6;

/// Extra units added to a server-provided `Retry-After`.
///
/// The group members endpoint allows one request per minute and keeps
/// extending the window while requests keep arriving.
const RETRY_AFTER_PADDING: u64 = 5;

/// Units to wait before the single retry of a 502 response.
const BAD_GATEWAY_WAIT: u64 = 30;

/// Retry configuration shared by every handle of a client.
///
/// Delays are expressed in whole units of `backoff_unit`, which is one
/// second unless configured otherwise.
#[derive(Debug)]
pub struct RetryPolicy {
    max_retries: AtomicU32,
    backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, backoff_unit: Duration) -> Self {
        Self {
            max_retries: AtomicU32::new(max_retries),
            backoff_unit,
        }
    }

    /// Maximum number of additional attempts after a retryable response.
    pub fn max_retries(&self) -> u32 {
        self.max_retries.load(Ordering::Relaxed)
    }

    pub fn set_max_retries(&self, retries: u32) {
        self.max_retries.store(retries, Ordering::Relaxed);
    }

    pub fn backoff_unit(&self) -> Duration {
        self.backoff_unit
    }

    /// Whether a status is retried against the budget.
    pub fn is_retryable(status: StatusCode) -> bool {
        matches!(
            status,
            StatusCode::TOO_MANY_REQUESTS | StatusCode::INTERNAL_SERVER_ERROR
        )
    }

    /// Wait before retry number `attempt` (0-based).
    ///
    /// A numeric `Retry-After` wins over exponential backoff.
    pub fn delay(&self, attempt: u32, retry_after: Option<u64>) -> Duration {
        let units = match retry_after {
            Some(secs) => secs.saturating_add(RETRY_AFTER_PADDING),
            None => 1u64.checked_shl(attempt).unwrap_or(u64::MAX),
        };
        self.scaled(units)
    }

    /// Wait before the one-shot retry of a 502.
    pub fn bad_gateway_delay(&self) -> Duration {
        self.scaled(BAD_GATEWAY_WAIT)
    }

    fn scaled(&self, units: u64) -> Duration {
        let units = u32::try_from(units).unwrap_or(u32::MAX);
        self.backoff_unit.saturating_mul(units)
    }
}

/// Parse a numeric `Retry-After` header.
pub(crate) fn retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_exponential_backoff_starts_at_one_unit() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0, None), Duration::from_secs(1));
        assert_eq!(policy.delay(1, None), Duration::from_secs(2));
        assert_eq!(policy.delay(6, None), Duration::from_secs(64));
    }

    #[test]
    fn test_retry_after_is_padded() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0, Some(10)), Duration::from_secs(15));
        assert_eq!(policy.delay(4, Some(0)), Duration::from_secs(5));
    }

    #[test]
    fn test_bad_gateway_delay_uses_unit() {
        let policy = RetryPolicy::new(0, Duration::from_millis(2));
        assert_eq!(policy.bad_gateway_delay(), Duration::from_millis(60));
    }

    #[test]
    fn test_max_retries_is_mutable_through_shared_reference() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries(), DEFAULT_MAX_RETRIES);
        policy.set_max_retries(2);
        assert_eq!(policy.max_retries(), 2);
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(RetryPolicy::is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(RetryPolicy::is_retryable(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!RetryPolicy::is_retryable(StatusCode::BAD_GATEWAY));
        assert!(!RetryPolicy::is_retryable(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_retry_after_header_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("10"));
        assert_eq!(retry_after(&headers), Some(10));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(retry_after(&headers), None);
    }
}

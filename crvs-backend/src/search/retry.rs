//! Retry policy for search engine requests
//!
//! Bulk requests are retried with a fixed wait: whole requests when the
//! failure is transient (timeouts, connection errors, gateway errors), and
//! single items when the engine rejects them with 429.

use std::time::Duration;

/// Default number of retries after the first attempt
pub const DEFAULT_RETRIES: u32 = 3;
/// Default wait between attempts in milliseconds
pub const DEFAULT_WAIT_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            wait: Duration::from_millis(DEFAULT_WAIT_MS),
        }
    }
}

impl RetryPolicy {
    /// Whether another attempt is allowed after `attempt` retries
    pub fn allows(&self, attempt: u32) -> bool {
        attempt < self.retries
    }

    /// Check if an HTTP status code indicates a retryable request failure
    pub fn is_retryable_status(status: u16) -> bool {
        matches!(
            status,
            408 | // Request Timeout
            429 | // Too Many Requests
            502 | // Bad Gateway
            503 | // Service Unavailable
            504   // Gateway Timeout
        )
    }

    /// Bulk items are only retried when the engine pushes back
    pub fn is_retryable_item_status(status: u16) -> bool {
        status == 429
    }
}

/// Helper function to check if a reqwest error is retryable
pub fn is_reqwest_error_retryable(err: &reqwest::Error) -> bool {
    err.is_timeout()
        || err.is_connect()
        || err
            .status()
            .map(|s| RetryPolicy::is_retryable_status(s.as_u16()))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.retries, 3);
        assert_eq!(policy.wait, Duration::from_millis(3000));
        assert!(policy.allows(0));
        assert!(policy.allows(2));
        assert!(!policy.allows(3));
    }

    #[test]
    fn test_is_retryable_status() {
        assert!(RetryPolicy::is_retryable_status(502));
        assert!(RetryPolicy::is_retryable_status(503));
        assert!(RetryPolicy::is_retryable_status(504));
        assert!(RetryPolicy::is_retryable_status(429));
        assert!(!RetryPolicy::is_retryable_status(400));
        assert!(!RetryPolicy::is_retryable_status(404));
        assert!(!RetryPolicy::is_retryable_status(200));
    }

    #[test]
    fn test_only_429_items_are_retried() {
        assert!(RetryPolicy::is_retryable_item_status(429));
        assert!(!RetryPolicy::is_retryable_item_status(400));
        assert!(!RetryPolicy::is_retryable_item_status(503));
    }
}

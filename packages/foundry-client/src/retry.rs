//! Transport retry policy: bounded attempts with exponential backoff.

use std::time::Duration;

use reqwest::StatusCode;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Sleep before retry `n` is `backoff_factor * 2^(n-1)`.
    pub backoff_factor: Duration,
    /// Response statuses that are retried.
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: Duration::from_millis(500),
            retry_statuses: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// Never retry.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn should_retry_status(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status.as_u16())
    }

    /// Connection-level failures are retried; anything that produced a response is not.
    pub fn should_retry_error(&self, err: &reqwest::Error) -> bool {
        err.is_connect() || err.is_timeout()
    }

    /// Backoff before the given retry (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(16);
        self.backoff_factor.saturating_mul(1u32 << exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_retry() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(2), Duration::from_millis(1000));
        assert_eq!(policy.backoff(3), Duration::from_millis(2000));
    }

    #[test]
    fn retries_rate_limits_and_server_errors_only() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(policy.should_retry_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!policy.should_retry_status(StatusCode::BAD_REQUEST));
        assert!(!policy.should_retry_status(StatusCode::NOT_IMPLEMENTED));
    }
}

//! Per-read options: staleness window and retry policy.

use crate::Error;
use std::time::Duration;

pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Bounded exponential backoff for failed reads.
///
/// Authentication failures (401/403) and client-side validation failures are
/// never retried. Other 4xx responses are retried only when
/// `retry_client_errors` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub retry_client_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_RETRY_DELAY,
            max_delay: MAX_RETRY_DELAY,
            retry_client_errors: false,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on the first error.
    pub fn never() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Policy of the current-user read: two retries, any failure except 401/403.
    pub fn current_user() -> Self {
        Self {
            max_retries: 2,
            retry_client_errors: true,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_retry_client_errors(mut self, enabled: bool) -> Self {
        self.retry_client_errors = enabled;
        self
    }

    /// Whether to try again after `failures` consecutive failures ending in `err`.
    pub fn should_retry(&self, failures: u32, err: &Error) -> bool {
        failures <= self.max_retries && self.is_retryable(err)
    }

    pub fn is_retryable(&self, err: &Error) -> bool {
        match err {
            Error::Api(api) => {
                if api.is_auth_failure() {
                    false
                } else if api.is_client_error() {
                    self.retry_client_errors
                } else {
                    true
                }
            }
            Error::Runtime { .. } => true,
            Error::Validation(_) | Error::Configuration { .. } | Error::Serialization(_) => false,
        }
    }

    /// Backoff before retry number `attempt + 1`: `base * 2^attempt`, capped.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// How one read is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Age after which the cached value is refreshed on next access.
    pub stale_time: Duration,
    pub retry: RetryPolicy,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
            retry: RetryPolicy::default(),
        }
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ValidationErrors;
    use crate::transport::ApiError;

    fn api(status: u16) -> Error {
        Error::Api(ApiError::new("boom").with_status(status))
    }

    #[test]
    fn auth_failures_are_never_retried() {
        let policy = RetryPolicy::current_user();
        assert!(!policy.should_retry(1, &api(401)));
        assert!(!policy.should_retry(1, &api(403)));
        assert!(policy.should_retry(1, &api(404)));
        assert!(policy.should_retry(2, &api(500)));
        assert!(!policy.should_retry(3, &api(500)));
    }

    #[test]
    fn default_policy_skips_client_errors() {
        let policy = RetryPolicy::default();
        assert!(!policy.should_retry(1, &api(404)));
        assert!(policy.should_retry(3, &api(503)));
        assert!(!policy.should_retry(4, &api(503)));
        assert!(policy.should_retry(1, &Error::Api(ApiError::new("Network Error"))));
        assert!(!policy.should_retry(1, &Error::Validation(ValidationErrors::new())));
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_secs(1));
        assert_eq!(policy.delay(1), Duration::from_secs(2));
        assert_eq!(policy.delay(3), Duration::from_secs(8));
        assert_eq!(policy.delay(5), MAX_RETRY_DELAY);
        assert_eq!(policy.delay(40), MAX_RETRY_DELAY);
    }
}

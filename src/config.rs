//! Client configuration.
//!
//! Defaults match a local development backend. Every knob can be overridden
//! from the environment via [`ClientConfig::from_env`]:
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `PRONOUNCE_API_BASE_URL` | Backend origin | `http://localhost:3000` |
//! | `PRONOUNCE_DEV_MODE` | Log every request (`1`/`true`) | off |
//! | `PRONOUNCE_HTTP_TIMEOUT_SECS` | Per-request timeout, `0` disables | disabled |
//! | `PRONOUNCE_LOGIN_PATH` | Location the 401 guard navigates to | `/login` |
//! | `PRONOUNCE_QUERY_MAX_RETRIES` | Read retries for transient failures | `3` |
//! | `PRONOUNCE_QUERY_RETRY_DELAY_MS` | Base backoff delay for read retries | `1000` |

use crate::cache::{QueryOptions, RetryPolicy};
use crate::{Error, ErrorContext, Result};
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, without trailing slash.
    pub base_url: String,
    /// Development mode: successful requests are logged with their latency.
    pub dev_mode: bool,
    /// Where the 401 guard sends the user.
    pub login_path: String,
    /// Upper bound on a single request. `None` means no timeout.
    pub request_timeout: Option<Duration>,
    /// Defaults for reads that don't override them.
    pub query_defaults: QueryOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            dev_mode: false,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            request_timeout: None,
            query_defaults: QueryOptions::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Load configuration from environment variables on top of the defaults.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        if let Ok(base_url) = env::var("PRONOUNCE_API_BASE_URL") {
            cfg.base_url = base_url;
        }

        cfg.dev_mode = env::var("PRONOUNCE_DEV_MODE")
            .ok()
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        cfg.request_timeout = env::var("PRONOUNCE_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        if let Ok(path) = env::var("PRONOUNCE_LOGIN_PATH") {
            cfg.login_path = path;
        }

        let mut retry = RetryPolicy::default();
        if let Some(n) = env::var("PRONOUNCE_QUERY_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
        {
            retry.max_retries = n;
        }
        if let Some(ms) = env::var("PRONOUNCE_QUERY_RETRY_DELAY_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            retry.base_delay = Duration::from_millis(ms);
        }
        cfg.query_defaults.retry = retry;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_dev_mode(mut self, enabled: bool) -> Self {
        self.dev_mode = enabled;
        self
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_query_defaults(mut self, options: QueryOptions) -> Self {
        self.query_defaults = options;
        self
    }

    /// Check the base URL and login path, normalizing the base URL in place.
    pub fn validate(&mut self) -> Result<()> {
        let parsed = Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base URL '{}'", self.base_url),
                ErrorContext::new()
                    .with_field_path("config.base_url")
                    .with_details(e.to_string())
                    .with_source("config"),
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                format!("unsupported scheme '{}'", parsed.scheme()),
                ErrorContext::new()
                    .with_field_path("config.base_url")
                    .with_details("expected http or https")
                    .with_source("config"),
            ));
        }
        if !self.login_path.starts_with('/') {
            return Err(Error::configuration_with_context(
                "login path must be absolute",
                ErrorContext::new()
                    .with_field_path("config.login_path")
                    .with_details(self.login_path.clone())
                    .with_source("config"),
            ));
        }
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        Ok(())
    }
}

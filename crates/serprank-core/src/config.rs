//! Client configuration with defaults and eager validation

use std::time::Duration;
use url::Url;
use crate::error::{Error, Result};

/// Root of the provider's v3 API.
pub const DEFAULT_BASE_URL: &str = "https://api.dataforseo.com/v3";

/// Configuration for a [`DataForSeoClient`](crate::client::DataForSeoClient).
///
/// Immutable per client instance; construct with [`ClientConfig::default`]
/// and override individual fields with the `with_*` methods.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request target root; endpoint paths are joined onto this
    pub base_url: String,
    /// Per-attempt abort deadline
    pub timeout: Duration,
    /// Total attempts including the first
    pub max_retries: u32,
    /// Backoff unit; the sleep before attempt n+1 is `retry_delay * n`
    pub retry_delay: Duration,
    /// Sliding-window admission cap over the trailing 60 seconds
    pub rate_limit_per_minute: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(30_000),
            max_retries: 3,
            retry_delay: Duration::from_millis(1_000),
            rate_limit_per_minute: 2_000,
        }
    }
}

impl ClientConfig {
    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-attempt timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the total attempt budget (including the first attempt)
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the linear backoff unit
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Set the sliding-window admission cap
    pub fn with_rate_limit_per_minute(mut self, rate_limit_per_minute: u32) -> Self {
        self.rate_limit_per_minute = rate_limit_per_minute;
        self
    }

    /// Validate the configuration.
    ///
    /// A zero rate limit would make every `wait_for_slot` call wait
    /// forever, so it is rejected here rather than at call time.
    pub fn validate(&self) -> Result<()> {
        if self.rate_limit_per_minute == 0 {
            return Err(Error::Configuration {
                message: "rate_limit_per_minute cannot be zero".to_string(),
            });
        }

        if self.timeout.is_zero() {
            return Err(Error::Configuration {
                message: "timeout cannot be zero".to_string(),
            });
        }

        if self.max_retries == 0 {
            return Err(Error::Configuration {
                message: "max_retries cannot be zero".to_string(),
            });
        }

        Url::parse(&self.base_url).map_err(|e| Error::Configuration {
            message: format!("invalid base_url {}: {}", self.base_url, e),
        })?;

        Ok(())
    }
}

//! Retrying provider client
//!
//! [`DataForSeoClient`] is the component applications call: it wraps one
//! provider call with rate-limit admission, classified retries with
//! linear backoff, correlation-tagged diagnostics, and in-flight
//! coalescing. One correlation id covers the whole attempt sequence of a
//! call, not one id per attempt.

use std::time::Instant;
use serde_json::Value;
use std::sync::Arc;
use crate::config::ClientConfig;
use crate::credentials::Credentials;
use crate::diagnostics::{CorrelationId, DiagnosticsLog, LogEntry};
use crate::error::{Error, Result};
use crate::http::request::execute_request;
use crate::http::{ApiResponse, CoalesceKey, RetryPolicy, SingleFlight, SlidingWindowLimiter};

/// Explicit per-action context threaded through the call chain instead of
/// process-wide mutable state. Create one per logical user action so all
/// log entries it produces share a correlation id.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub correlation_id: CorrelationId,
    pub client_code: Option<String>,
    pub domain: Option<String>,
    pub location_code: Option<u32>,
}

impl RequestContext {
    /// Fresh context with a new correlation id.
    pub fn new() -> Self {
        Self {
            correlation_id: CorrelationId::new(),
            client_code: None,
            domain: None,
            location_code: None,
        }
    }

    pub fn with_client_code(mut self, client_code: impl Into<String>) -> Self {
        self.client_code = Some(client_code.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_location(mut self, location_code: u32) -> Self {
        self.location_code = Some(location_code);
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Provider client with retry, rate limiting, and diagnostics.
#[derive(Debug)]
pub struct DataForSeoClient {
    http: reqwest::Client,
    config: ClientConfig,
    credentials: Credentials,
    limiter: SlidingWindowLimiter,
    diagnostics: Arc<DiagnosticsLog>,
    inflight: SingleFlight<ApiResponse>,
}

impl DataForSeoClient {
    /// Create a client. The configuration is validated eagerly; a zero
    /// rate limit or timeout is rejected here rather than surfacing as a
    /// hang at call time.
    pub fn new(
        credentials: Credentials,
        config: ClientConfig,
        diagnostics: Arc<DiagnosticsLog>,
    ) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Configuration {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        let limiter = SlidingWindowLimiter::per_minute(config.rate_limit_per_minute)?;

        Ok(Self {
            http,
            config,
            credentials,
            limiter,
            diagnostics,
            inflight: SingleFlight::new(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &Arc<DiagnosticsLog> {
        &self.diagnostics
    }

    /// Remaining rate-limit capacity in the current window.
    pub fn available_slots(&self) -> u32 {
        self.limiter.available_slots()
    }

    /// POST a payload to an endpoint with the full retry contract.
    ///
    /// Per attempt: wait for a rate-limit slot, execute, classify on
    /// failure. Retryable failures with budget remaining log RETRYING and
    /// sleep `retry_delay * attempt`; everything else logs FAILED and
    /// returns the classified error. Success logs duration, statuses, and
    /// cost.
    pub async fn post(
        &self,
        endpoint: &str,
        payload: Value,
        ctx: &RequestContext,
    ) -> Result<ApiResponse> {
        let entry = LogEntry::pending("POST", endpoint, ctx);
        self.diagnostics.append(entry.clone());

        let started = Instant::now();
        let mut retries: u32 = 0;
        let policy = RetryPolicy {
            max_attempts: self.config.max_retries,
            delay: self.config.retry_delay,
        };

        let payload = &payload;
        let result = crate::http::execute_with_retry(
            &policy,
            |_attempt| async move {
                self.limiter.wait_for_slot().await;
                execute_request(&self.http, &self.config, &self.credentials, endpoint, payload)
                    .await
            },
            |attempt, error, delay| {
                retries = attempt;
                self.diagnostics
                    .append(entry.retrying(attempt, error, started.elapsed()));
                log::warn!(
                    "attempt {} on {} failed, retrying in {:?}: {}",
                    attempt,
                    endpoint,
                    delay,
                    error
                );
            },
        )
        .await;

        match result {
            Ok(response) => {
                self.diagnostics.append(entry.success(
                    started.elapsed(),
                    200,
                    response.status_code,
                    response.cost,
                    retries,
                ));
                Ok(response)
            }
            Err(error) => {
                self.diagnostics
                    .append(entry.failed(started.elapsed(), &error, retries));
                Err(error)
            }
        }
    }

    /// [`post`](Self::post) with in-flight coalescing: a second concurrent
    /// call with the same key awaits the first call's result instead of
    /// issuing a duplicate billed request.
    pub async fn post_coalesced(
        &self,
        key: CoalesceKey,
        endpoint: &str,
        payload: Value,
        ctx: &RequestContext,
    ) -> Result<ApiResponse> {
        self.inflight
            .run(key, || self.post(endpoint, payload, ctx))
            .await
    }
}

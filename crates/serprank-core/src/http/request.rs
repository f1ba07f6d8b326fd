//! Single provider call execution
//!
//! Builds one authenticated POST, applies the hard per-attempt timeout,
//! parses the provider's response envelope, and splits HTTP-level failures
//! from provider-level task failures (the transport can succeed while the
//! logical operation fails).

use serde::Deserialize;
use serde_json::Value;
use crate::config::ClientConfig;
use crate::credentials::Credentials;
use crate::error::{Error, ErrorKind, Result};
use crate::http::classify::classify;

/// Provider status code signalling success.
pub const PROVIDER_OK: u32 = 20000;
/// Provider status codes at or above this signal a logical failure despite
/// HTTP 200.
pub const PROVIDER_ERROR_THRESHOLD: u32 = 40000;

/// Maximum number of body characters carried into error messages.
const ERROR_SNIPPET_LEN: usize = 200;

/// Top-level provider response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub status_code: u32,
    #[serde(default)]
    pub status_message: String,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub tasks: Vec<TaskEnvelope>,
}

/// One task inside the response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskEnvelope {
    pub status_code: u32,
    #[serde(default)]
    pub status_message: String,
    #[serde(default)]
    pub cost: f64,
    pub result: Option<Vec<Value>>,
}

impl ApiResponse {
    /// First result item of the first task, if the provider returned any.
    pub fn first_result(&self) -> Option<&Value> {
        self.tasks
            .first()
            .and_then(|task| task.result.as_ref())
            .and_then(|result| result.first())
    }
}

/// Execute one provider call. No retries, no rate limiting; the retrying
/// client layers those on top.
pub(crate) async fn execute_request(
    http: &reqwest::Client,
    config: &ClientConfig,
    credentials: &Credentials,
    endpoint: &str,
    payload: &Value,
) -> Result<ApiResponse> {
    let url = join_url(&config.base_url, endpoint);

    // Provider convention: POST bodies are arrays of tasks even for a
    // single task.
    let body = if payload.is_array() {
        payload.clone()
    } else {
        Value::Array(vec![payload.clone()])
    };

    let attempt = async {
        let response = http
            .post(&url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| from_transport_error(e, endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let snippet = snippet(&response.text().await.unwrap_or_default());
            let classification = classify(Some(status.as_u16()), None, &snippet);
            return Err(Error::Api {
                kind: classification.kind,
                message: format!("HTTP {}: {}", status.as_u16(), snippet),
                endpoint: endpoint.to_string(),
                http_status: Some(status.as_u16()),
                provider_code: None,
                retryable: classification.retryable,
            });
        }

        let parsed: ApiResponse = response.json().await.map_err(|e| Error::Api {
            kind: ErrorKind::ParseError,
            message: format!("failed to parse response envelope: {}", e),
            endpoint: endpoint.to_string(),
            http_status: Some(status.as_u16()),
            provider_code: None,
            retryable: false,
        })?;

        if parsed.status_code >= PROVIDER_ERROR_THRESHOLD {
            let classification = classify(None, Some(parsed.status_code), &parsed.status_message);
            return Err(Error::Api {
                kind: classification.kind,
                message: format!(
                    "provider status {}: {}",
                    parsed.status_code, parsed.status_message
                ),
                endpoint: endpoint.to_string(),
                http_status: Some(status.as_u16()),
                provider_code: Some(parsed.status_code),
                retryable: classification.retryable,
            });
        }

        Ok(parsed)
    };

    match tokio::time::timeout(config.timeout, attempt).await {
        Ok(result) => result,
        Err(_) => Err(Error::Api {
            kind: ErrorKind::Timeout,
            message: format!("request aborted after {:?}", config.timeout),
            endpoint: endpoint.to_string(),
            http_status: Some(408),
            provider_code: None,
            retryable: true,
        }),
    }
}

/// Map a reqwest transport error into a classified API error.
fn from_transport_error(error: reqwest::Error, endpoint: &str) -> Error {
    let (kind, retryable) = if error.is_timeout() {
        (ErrorKind::Timeout, true)
    } else if error.is_connect() {
        (ErrorKind::NetworkError, true)
    } else {
        let classification = classify(None, None, &error.to_string());
        (classification.kind, classification.retryable)
    };

    Error::Api {
        kind,
        message: error.to_string(),
        endpoint: endpoint.to_string(),
        http_status: None,
        provider_code: None,
        retryable,
    }
}

fn join_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

fn snippet(body: &str) -> String {
    body.chars().take(ERROR_SNIPPET_LEN).collect()
}

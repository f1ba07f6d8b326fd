//! Error classification for retry decisions
//!
//! Maps HTTP status, provider status code, and exception message into an
//! [`ErrorKind`] plus a retryable flag. Precedence is fixed: HTTP status
//! beats provider code beats message heuristics beats the default, and the
//! default is non-retryable so unclassified failures can never loop.

use crate::error::ErrorKind;

/// Provider task/status codes in this range indicate authentication failures.
const PROVIDER_AUTH_CODES: std::ops::RangeInclusive<u32> = 40100..=40199;
/// Provider codes in this range indicate throttling.
const PROVIDER_THROTTLE_CODES: std::ops::RangeInclusive<u32> = 40200..=40299;
/// Provider codes at or above this threshold indicate provider-side faults.
const PROVIDER_SERVER_ERROR_THRESHOLD: u32 = 50000;

/// Result of classifying one failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: ErrorKind,
    pub retryable: bool,
}

impl Classification {
    const fn new(kind: ErrorKind, retryable: bool) -> Self {
        Self { kind, retryable }
    }
}

/// Classify a failure observed while calling the provider.
///
/// Pure function: the same `(http_status, provider_code, message)` always
/// yields the same classification.
pub fn classify(
    http_status: Option<u16>,
    provider_code: Option<u32>,
    message: &str,
) -> Classification {
    // HTTP status takes precedence over everything else.
    if let Some(status) = http_status {
        match status {
            401 | 403 => return Classification::new(ErrorKind::Unauthorized, false),
            429 => return Classification::new(ErrorKind::RateLimited, true),
            404 => return Classification::new(ErrorKind::NotFound, false),
            s if s >= 500 => return Classification::new(ErrorKind::ServerError, true),
            _ => {}
        }
    }

    // Provider-level status code next; the transport succeeded but the
    // logical operation failed.
    if let Some(code) = provider_code {
        if PROVIDER_AUTH_CODES.contains(&code) {
            return Classification::new(ErrorKind::Unauthorized, false);
        }
        if PROVIDER_THROTTLE_CODES.contains(&code) {
            return Classification::new(ErrorKind::RateLimited, true);
        }
        if (40000..=40099).contains(&code) || (40400..=40599).contains(&code) {
            return Classification::new(ErrorKind::InvalidRequest, false);
        }
        if code >= PROVIDER_SERVER_ERROR_THRESHOLD {
            return Classification::new(ErrorKind::ServerError, true);
        }
    }

    // Message heuristics for failures with no usable status code.
    let message = message.to_lowercase();
    if message.contains("timeout") || message.contains("aborted") {
        return Classification::new(ErrorKind::Timeout, true);
    }
    if message.contains("network") || message.contains("fetch failed") {
        return Classification::new(ErrorKind::NetworkError, true);
    }

    // Fail safe: unknown errors are not retried.
    Classification::new(ErrorKind::ServerError, false)
}

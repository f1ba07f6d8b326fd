//! Error types for the serprank core library
//!
//! Defines the crate-wide error enum together with the `ErrorKind` taxonomy
//! used by the classifier and the retry loop. Only the retrying client
//! surfaces these errors; endpoint adapters convert them into
//! `{success: false, error}` result shapes.

use std::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Taxonomy of failure kinds surfaced by the client layer.
///
/// The classifier assigns one of these to every failure together with a
/// definitive `retryable` flag; the flag is not derivable from the kind
/// alone (an unclassified failure maps to `ServerError` but is *not*
/// retried).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NetworkError,
    Timeout,
    Unauthorized,
    InvalidCredentials,
    RateLimited,
    InvalidRequest,
    NotFound,
    ServerError,
    NoCredentials,
    NoData,
    ParseError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NetworkError => "NETWORK_ERROR",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorKind::RateLimited => "RATE_LIMITED",
            ErrorKind::InvalidRequest => "INVALID_REQUEST",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::ServerError => "SERVER_ERROR",
            ErrorKind::NoCredentials => "NO_CREDENTIALS",
            ErrorKind::NoData => "NO_DATA",
            ErrorKind::ParseError => "PARSE_ERROR",
        };
        write!(f, "{}", name)
    }
}

/// Main error type for serprank operations
#[derive(Error, Debug)]
pub enum Error {
    /// A provider call failed, either at the HTTP layer or at the
    /// provider's logical task layer.
    #[error("{kind} on {endpoint}: {message}")]
    Api {
        kind: ErrorKind,
        message: String,
        endpoint: String,
        http_status: Option<u16>,
        provider_code: Option<u32>,
        retryable: bool,
    },

    /// Credential resolution failed
    #[error("credential error ({kind}): {message}")]
    Credentials { kind: ErrorKind, message: String },

    /// Invalid client configuration, raised eagerly at construction
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal error with context
    #[error("internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The classified kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Api { kind, .. } => *kind,
            Error::Credentials { kind, .. } => *kind,
            Error::Configuration { .. } => ErrorKind::InvalidRequest,
            Error::Json { .. } => ErrorKind::ParseError,
            Error::Io { .. } => ErrorKind::ServerError,
            Error::Internal { .. } => ErrorKind::ServerError,
        }
    }

    /// Whether the retry loop may attempt this request again.
    ///
    /// Only `Api` errors carry a definitive flag from the classifier;
    /// everything else is non-retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Api { retryable, .. } => *retryable,
            _ => false,
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Api {
            kind: ErrorKind::RateLimited,
            message: "too many requests".to_string(),
            endpoint: "/backlinks/summary/live".to_string(),
            http_status: Some(429),
            provider_code: None,
            retryable: true,
        };
        assert_eq!(
            err.to_string(),
            "RATE_LIMITED on /backlinks/summary/live: too many requests"
        );
    }

    #[test]
    fn test_kind_display_names() {
        assert_eq!(ErrorKind::NetworkError.to_string(), "NETWORK_ERROR");
        assert_eq!(ErrorKind::NoCredentials.to_string(), "NO_CREDENTIALS");
        assert_eq!(ErrorKind::ParseError.to_string(), "PARSE_ERROR");
    }

    #[test]
    fn test_only_api_errors_are_retryable() {
        let api = Error::Api {
            kind: ErrorKind::ServerError,
            message: "boom".to_string(),
            endpoint: "/x".to_string(),
            http_status: Some(500),
            provider_code: None,
            retryable: true,
        };
        assert!(api.is_retryable());

        let creds = Error::Credentials {
            kind: ErrorKind::NoCredentials,
            message: "none".to_string(),
        };
        assert!(!creds.is_retryable());
        assert_eq!(creds.kind(), ErrorKind::NoCredentials);
    }
}

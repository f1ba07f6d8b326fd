//! Per-capability endpoint adapters
//!
//! Each adapter shapes a request payload, calls the retrying client
//! through the coalescing layer, and maps the first result item of the
//! first task into a typed record. Adapters never return `Err`: every
//! failure is converted into `{success: false, error}`, and a missing
//! result item is a *successful empty* response (the call worked; the
//! provider has no data).

pub mod backlinks;
pub mod labs;
pub mod whois;

pub use backlinks::fetch_backlinks;
pub use labs::{fetch_labs, visibility_score, DEFAULT_LOCATION_CODE};
pub use whois::fetch_whois;

use serde::Serialize;

/// Result shape shared by all endpoint adapters.
///
/// `success` with `data: None` means the provider answered but has no
/// data for the domain; `success: false` means the call itself failed.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointOutcome<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> EndpointOutcome<T> {
    pub fn ok(data: Option<T>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Normalize a user-supplied domain: trim, lowercase, strip scheme and
/// leading `www.`, drop any path, query, or fragment. Idempotent.
pub fn normalize_domain(input: &str) -> String {
    let mut domain = input.to_lowercase();

    // Trim and strip to a fixpoint; stripping one prefix can expose
    // another ("www.www.", whitespace after a scheme).
    loop {
        let before = domain.clone();
        domain = domain.trim().to_string();
        for prefix in ["https://", "http://", "www."] {
            if let Some(rest) = domain.strip_prefix(prefix) {
                domain = rest.to_string();
            }
        }
        if domain == before {
            break;
        }
    }

    if let Some(cut) = domain.find(['/', '?', '#']) {
        domain.truncate(cut);
    }

    domain.trim().to_string()
}

//! Provider credential resolution
//!
//! Credentials come from an external credential store (consumed through
//! the [`CredentialStore`] trait) with an environment-variable fallback.
//! Resolution order, first match wins:
//!
//! 1. active record scoped to the requested client code
//! 2. active record with no scope (global default)
//! 3. first active record of any scope
//! 4. `DATAFORSEO_USERNAME`/`DATAFORSEO_PASSWORD` (or the
//!    `DATAFORSEO_LOGIN`/`DATAFORSEO_API_PASSWORD` aliases)

use std::sync::{Arc, Once};
use serde::{Deserialize, Serialize};
use crate::error::{Error, ErrorKind, Result};

static LOAD_DOTENV: Once = Once::new();

/// Basic-auth credential pair. Loaded per request, never persisted by
/// this layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// One stored credential, optionally scoped to a client code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub client_code: Option<String>,
    pub username: String,
    pub password: String,
    pub active: bool,
}

/// External credential store. Implementations own persistence; this layer
/// only reads.
pub trait CredentialStore: Send + Sync {
    /// All records for the provider service, in storage order.
    fn records(&self) -> Vec<CredentialRecord>;
}

/// In-memory store for embedding and tests.
#[derive(Debug, Default)]
pub struct StaticCredentialStore {
    records: Vec<CredentialRecord>,
}

impl StaticCredentialStore {
    pub fn new(records: Vec<CredentialRecord>) -> Self {
        Self { records }
    }
}

impl CredentialStore for StaticCredentialStore {
    fn records(&self) -> Vec<CredentialRecord> {
        self.records.clone()
    }
}

/// Resolves credentials from a store with an environment fallback.
#[derive(Clone, Default)]
pub struct CredentialResolver {
    store: Option<Arc<dyn CredentialStore>>,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Resolver with no store; only the environment fallback applies.
    pub fn env_only() -> Self {
        Self { store: None }
    }

    /// Resolve credentials for an optional client code.
    ///
    /// A matched record missing a required field is an
    /// `INVALID_CREDENTIALS` error, not a fallthrough to the next
    /// priority level.
    pub fn resolve(&self, client_code: Option<&str>) -> Result<Credentials> {
        if let Some(store) = &self.store {
            let records = store.records();
            let active: Vec<&CredentialRecord> = records.iter().filter(|r| r.active).collect();

            let matched = client_code
                .and_then(|code| {
                    active
                        .iter()
                        .find(|r| r.client_code.as_deref() == Some(code))
                })
                .or_else(|| active.iter().find(|r| r.client_code.is_none()))
                .or_else(|| active.first());

            if let Some(record) = matched {
                return validate_record(record);
            }
        }

        if let Some(credentials) = from_env() {
            return Ok(credentials);
        }

        Err(Error::Credentials {
            kind: ErrorKind::NoCredentials,
            message: "no active provider credentials found in store or environment".to_string(),
        })
    }
}

fn validate_record(record: &CredentialRecord) -> Result<Credentials> {
    if record.username.is_empty() || record.password.is_empty() {
        return Err(Error::Credentials {
            kind: ErrorKind::InvalidCredentials,
            message: format!(
                "credential record for scope {:?} is missing a username or password",
                record.client_code
            ),
        });
    }
    Ok(Credentials {
        username: record.username.clone(),
        password: record.password.clone(),
    })
}

fn from_env() -> Option<Credentials> {
    LOAD_DOTENV.call_once(|| {
        dotenv::dotenv().ok();
    });

    let username = std::env::var("DATAFORSEO_USERNAME")
        .or_else(|_| std::env::var("DATAFORSEO_LOGIN"))
        .ok()?;
    let password = std::env::var("DATAFORSEO_PASSWORD")
        .or_else(|_| std::env::var("DATAFORSEO_API_PASSWORD"))
        .ok()?;

    if username.is_empty() || password.is_empty() {
        return None;
    }

    Some(Credentials { username, password })
}

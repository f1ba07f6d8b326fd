//! Serprank Core - resilient client layer for SEO metrics providers
//!
//! This crate implements the provider-facing half of an SEO analytics
//! stack: authenticated calls to a DataForSEO-style API with a sliding
//! window rate limiter, classified retries with linear backoff,
//! correlation-tagged diagnostics, and cost-aware fetch planning that
//! never re-purchases data already on hand.
//!
//! # Main Components
//!
//! - **Retrying client**: [`DataForSeoClient`] wraps one provider call
//!   with rate limiting, retry, coalescing, and diagnostics
//! - **Endpoint adapters**: typed whois / backlinks / labs fetchers that
//!   never panic or return `Err`
//! - **Credibility orchestration**: [`fetch_domain_credibility`] combines
//!   the three subsystems with a partial-failure model
//! - **Smart fetch**: [`smart_fetch_domain`] performs only the calls a
//!   stored record is missing
//!
//! # Example
//!
//! ```no_run
//! use serprank_core::{
//!     ClientConfig, CredentialResolver, DiagnosticsLog, DataForSeoClient,
//!     fetch_domain_credibility,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> serprank_core::Result<()> {
//! let credentials = CredentialResolver::env_only().resolve(None)?;
//! let diagnostics = Arc::new(DiagnosticsLog::in_memory());
//! let client = DataForSeoClient::new(credentials, ClientConfig::default(), diagnostics)?;
//!
//! let record = fetch_domain_credibility(&client, "example.com", 2840).await;
//! println!("rank: {:?}", record.backlinks.and_then(|b| b.domain_rank));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod credentials;
pub mod credibility;
pub mod diagnostics;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod planner;
pub mod pricing;
pub mod registry;
pub mod types;

// Re-export main types for convenience
pub use client::{DataForSeoClient, RequestContext};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use credentials::{
    CredentialRecord, CredentialResolver, CredentialStore, Credentials, StaticCredentialStore,
};
pub use credibility::fetch_domain_credibility;
pub use diagnostics::{
    CorrelationId, DiagnosticsLog, DiagnosticsSummary, LogEntry, LogFilter, LogStatus,
};
pub use endpoints::{
    fetch_backlinks, fetch_labs, fetch_whois, visibility_score, EndpointOutcome,
    normalize_domain, DEFAULT_LOCATION_CODE,
};
pub use error::{Error, ErrorKind, Result};
pub use http::{ApiResponse, Classification, CoalesceKey, TaskEnvelope};
pub use planner::{
    analyze_existing, create_fetch_plan, smart_fetch_domain, FetchPlan, FetchPlanSummary,
    SmartFetchOutcome, SubsystemPresence,
};
pub use registry::ClientRegistry;
pub use types::{BacklinksData, DomainCredibilityData, LabsData, PositionBuckets, WhoisData};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Credibility orchestration
//!
//! Sequences the three endpoint adapters for one domain into a single
//! combined record. A failure in one subsystem leaves its fields empty
//! and is recorded in `errors`; the remaining subsystems still run, and
//! the call always returns a (possibly partial) record.

use std::time::Duration;
use tokio::time::sleep;
use crate::client::{DataForSeoClient, RequestContext};
use crate::endpoints::{fetch_backlinks, fetch_labs, fetch_whois};
use crate::endpoints::normalize_domain;
use crate::types::DomainCredibilityData;

/// Pause between subsystem calls to spread provider load.
pub const SUBSYSTEM_PACING: Duration = Duration::from_millis(100);

/// Fetch whois, backlinks, and labs metrics for one domain.
///
/// One fresh correlation id covers the whole action. Never returns an
/// error: subsystem failures are accumulated in the record's `errors`.
pub async fn fetch_domain_credibility(
    client: &DataForSeoClient,
    domain: &str,
    location_code: u32,
) -> DomainCredibilityData {
    let domain = normalize_domain(domain);
    let ctx = RequestContext::new()
        .with_domain(domain.clone())
        .with_location(location_code);

    let mut record = DomainCredibilityData::new(domain.clone());

    let whois = fetch_whois(client, &domain, &ctx).await;
    if whois.success {
        record.whois = whois.data;
    } else {
        record.errors.push(format!(
            "whois: {}",
            whois.error.unwrap_or_else(|| "unknown error".to_string())
        ));
    }

    sleep(SUBSYSTEM_PACING).await;

    let backlinks = fetch_backlinks(client, &domain, &ctx).await;
    if backlinks.success {
        record.backlinks = backlinks.data;
    } else {
        record.errors.push(format!(
            "backlinks: {}",
            backlinks.error.unwrap_or_else(|| "unknown error".to_string())
        ));
    }

    sleep(SUBSYSTEM_PACING).await;

    let labs = fetch_labs(client, &domain, location_code, &ctx).await;
    if labs.success {
        record.labs = labs.data;
    } else {
        record.errors.push(format!(
            "labs: {}",
            labs.error.unwrap_or_else(|| "unknown error".to_string())
        ));
    }

    record
}

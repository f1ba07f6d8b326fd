//! Smart-fetch planning
//!
//! Paid API data already on hand must never be purchased again. The
//! planner inspects stored records to decide which subsystems are still
//! missing per domain, prices the remaining calls for a pre-flight
//! estimate, and performs only the missing calls.

use tokio::time::sleep;
use crate::client::{DataForSeoClient, RequestContext};
use crate::credibility::SUBSYSTEM_PACING;
use crate::endpoints::{fetch_backlinks, fetch_labs, fetch_whois, normalize_domain};
use crate::pricing;
use crate::types::DomainCredibilityData;

/// Which subsystems a stored record already covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubsystemPresence {
    pub has_whois: bool,
    pub has_backlinks: bool,
    pub has_labs: bool,
}

impl SubsystemPresence {
    pub fn is_complete(&self) -> bool {
        self.has_whois && self.has_backlinks && self.has_labs
    }

    pub fn missing_count(&self) -> usize {
        [self.has_whois, self.has_backlinks, self.has_labs]
            .iter()
            .filter(|present| !**present)
            .count()
    }
}

/// Determine subsystem coverage by null-checking one representative field
/// per subsystem.
pub fn analyze_existing(existing: Option<&DomainCredibilityData>) -> SubsystemPresence {
    let Some(record) = existing else {
        return SubsystemPresence::default();
    };
    SubsystemPresence {
        has_whois: record
            .whois
            .as_ref()
            .is_some_and(|w| w.domain_age_years.is_some()),
        has_backlinks: record
            .backlinks
            .as_ref()
            .is_some_and(|b| b.backlinks_total.is_some()),
        has_labs: record
            .labs
            .as_ref()
            .is_some_and(|l| l.organic_keywords_total.is_some()),
    }
}

/// Planned work for one domain.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FetchPlan {
    pub domain: String,
    pub fetch_whois: bool,
    pub fetch_backlinks: bool,
    pub fetch_labs: bool,
    pub call_count: usize,
    pub estimated_cost: f64,
}

/// Aggregated pre-flight estimate over a batch of domains.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FetchPlanSummary {
    pub plans: Vec<FetchPlan>,
    pub total_calls: usize,
    pub total_cost: f64,
    pub complete_domains: usize,
}

/// Compute which calls a batch of domains still needs and what they would
/// cost. Read-only; nothing is fetched.
pub fn create_fetch_plan<'a, I>(domains: I) -> FetchPlanSummary
where
    I: IntoIterator<Item = (&'a str, Option<&'a DomainCredibilityData>)>,
{
    let mut plans = Vec::new();
    let mut total_calls = 0usize;
    let mut total_cost = 0.0;
    let mut complete_domains = 0usize;

    for (domain, existing) in domains {
        let presence = analyze_existing(existing);
        if presence.is_complete() {
            complete_domains += 1;
        }
        let call_count = presence.missing_count();
        let estimated_cost = pricing::missing_cost(&presence);
        total_calls += call_count;
        total_cost += estimated_cost;
        plans.push(FetchPlan {
            domain: normalize_domain(domain),
            fetch_whois: !presence.has_whois,
            fetch_backlinks: !presence.has_backlinks,
            fetch_labs: !presence.has_labs,
            call_count,
            estimated_cost,
        });
    }

    FetchPlanSummary {
        plans,
        total_calls,
        total_cost,
        complete_domains,
    }
}

/// Result of one smart fetch.
#[derive(Debug, Clone)]
pub struct SmartFetchOutcome {
    pub data: DomainCredibilityData,
    /// Subsystems actually called, in call order
    pub apis_called: Vec<String>,
    /// Estimated cost of the calls made, USD
    pub cost: f64,
    /// Errors from this run only
    pub errors: Vec<String>,
}

/// Fetch only the subsystems missing from `existing` and merge the
/// results into it.
///
/// Feeding the returned record back as `existing` makes a re-run issue
/// zero further calls, so re-runs never re-purchase present data.
pub async fn smart_fetch_domain(
    client: &DataForSeoClient,
    domain: &str,
    existing: Option<DomainCredibilityData>,
    location_code: u32,
) -> SmartFetchOutcome {
    let domain = normalize_domain(domain);
    let presence = analyze_existing(existing.as_ref());

    let mut record = existing.unwrap_or_else(|| DomainCredibilityData::new(domain.clone()));
    let mut apis_called = Vec::new();
    let mut cost = 0.0;
    let mut errors = Vec::new();

    let ctx = RequestContext::new()
        .with_domain(domain.clone())
        .with_location(location_code);

    let mut calls_made = 0usize;
    let planned = presence.missing_count();

    if !presence.has_whois {
        let outcome = fetch_whois(client, &domain, &ctx).await;
        apis_called.push("whois".to_string());
        cost += pricing::WHOIS_COST_USD;
        if outcome.success {
            record.whois = outcome.data;
        } else {
            errors.push(format!(
                "whois: {}",
                outcome.error.unwrap_or_else(|| "unknown error".to_string())
            ));
        }
        calls_made += 1;
        if calls_made < planned {
            sleep(SUBSYSTEM_PACING).await;
        }
    }

    if !presence.has_backlinks {
        let outcome = fetch_backlinks(client, &domain, &ctx).await;
        apis_called.push("backlinks".to_string());
        cost += pricing::BACKLINKS_COST_USD;
        if outcome.success {
            record.backlinks = outcome.data;
        } else {
            errors.push(format!(
                "backlinks: {}",
                outcome.error.unwrap_or_else(|| "unknown error".to_string())
            ));
        }
        calls_made += 1;
        if calls_made < planned {
            sleep(SUBSYSTEM_PACING).await;
        }
    }

    if !presence.has_labs {
        let outcome = fetch_labs(client, &domain, location_code, &ctx).await;
        apis_called.push("labs".to_string());
        cost += pricing::LABS_COST_USD;
        if outcome.success {
            record.labs = outcome.data;
        } else {
            errors.push(format!(
                "labs: {}",
                outcome.error.unwrap_or_else(|| "unknown error".to_string())
            ));
        }
    }

    record.fetched_at = chrono::Utc::now();
    record.errors.extend(errors.iter().cloned());

    SmartFetchOutcome {
        data: record,
        apis_called,
        cost,
        errors,
    }
}

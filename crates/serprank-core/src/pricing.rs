//! Per-call pricing constants for pre-flight cost estimates
//!
//! Estimation only; the provider's invoice is authoritative.

use crate::planner::SubsystemPresence;

/// Cost of one whois overview call, USD.
pub const WHOIS_COST_USD: f64 = 0.05;
/// Cost of one backlinks summary call, USD.
pub const BACKLINKS_COST_USD: f64 = 0.03;
/// Cost of one labs domain rank overview call, USD.
pub const LABS_COST_USD: f64 = 0.11;

/// Cost of fetching all three subsystems for one domain.
pub fn full_domain_cost() -> f64 {
    WHOIS_COST_USD + BACKLINKS_COST_USD + LABS_COST_USD
}

/// Cost of fetching only the subsystems missing from `presence`.
pub fn missing_cost(presence: &SubsystemPresence) -> f64 {
    let mut cost = 0.0;
    if !presence.has_whois {
        cost += WHOIS_COST_USD;
    }
    if !presence.has_backlinks {
        cost += BACKLINKS_COST_USD;
    }
    if !presence.has_labs {
        cost += LABS_COST_USD;
    }
    cost
}

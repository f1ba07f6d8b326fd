//! Backlinks summary adapter

use serde_json::{json, Value};
use crate::client::{DataForSeoClient, RequestContext};
use crate::endpoints::{normalize_domain, EndpointOutcome};
use crate::http::CoalesceKey;
use crate::types::BacklinksData;

pub const BACKLINKS_ENDPOINT: &str = "/backlinks/summary/live";

/// Fetch the backlink profile summary for a domain.
pub async fn fetch_backlinks(
    client: &DataForSeoClient,
    domain: &str,
    ctx: &RequestContext,
) -> EndpointOutcome<BacklinksData> {
    let domain = normalize_domain(domain);
    let key = CoalesceKey::new(BACKLINKS_ENDPOINT, domain.clone());
    let payload = json!({
        "target": domain,
        "include_subdomains": true,
    });

    match client
        .post_coalesced(key, BACKLINKS_ENDPOINT, payload, ctx)
        .await
    {
        Ok(response) => match response.first_result() {
            Some(item) => EndpointOutcome::ok(Some(parse_item(item))),
            None => EndpointOutcome::ok(None),
        },
        Err(e) => EndpointOutcome::failed(e.to_string()),
    }
}

fn parse_item(item: &Value) -> BacklinksData {
    BacklinksData {
        backlinks_total: item.get("backlinks").and_then(Value::as_u64),
        referring_domains: item.get("referring_domains").and_then(Value::as_u64),
        referring_ips: item.get("referring_ips").and_then(Value::as_u64),
        domain_rank: item
            .get("rank")
            .and_then(Value::as_u64)
            .map(|r| r as u32),
        broken_backlinks: item.get("broken_backlinks").and_then(Value::as_u64),
        spam_score: item
            .get("backlinks_spam_score")
            .and_then(Value::as_u64)
            .map(|s| s as u32),
    }
}

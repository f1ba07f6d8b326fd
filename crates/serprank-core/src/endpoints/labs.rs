//! Labs domain rank overview adapter
//!
//! Beyond the raw keyword metrics this adapter derives the 0-100
//! "keyword visibility score": a weighted sum over ranking-position
//! buckets, weight 100 at position 1 decaying to 0.1 at positions
//! 91-100, normalized by total keyword count.

use serde_json::{json, Value};
use crate::client::{DataForSeoClient, RequestContext};
use crate::endpoints::{normalize_domain, EndpointOutcome};
use crate::http::CoalesceKey;
use crate::types::{LabsData, PositionBuckets};

pub const LABS_ENDPOINT: &str = "/dataforseo_labs/google/domain_rank_overview/live";

/// United States, the provider's default market.
pub const DEFAULT_LOCATION_CODE: u32 = 2840;

/// Weight applied to each position bucket, best to worst.
const BUCKET_WEIGHTS: [f64; 12] = [
    100.0, 85.0, 70.0, 50.0, 35.0, 25.0, 18.0, 12.0, 8.0, 5.0, 2.0, 0.1,
];

/// Fetch organic keyword/rank metrics for a domain in one market.
pub async fn fetch_labs(
    client: &DataForSeoClient,
    domain: &str,
    location_code: u32,
    ctx: &RequestContext,
) -> EndpointOutcome<LabsData> {
    let domain = normalize_domain(domain);
    let key = CoalesceKey::new(LABS_ENDPOINT, domain.clone()).with_location(location_code);
    let payload = json!({
        "target": domain,
        "location_code": location_code,
        "language_code": "en",
    });

    match client.post_coalesced(key, LABS_ENDPOINT, payload, ctx).await {
        Ok(response) => {
            let item = response
                .first_result()
                .and_then(|r| r.get("items"))
                .and_then(Value::as_array)
                .and_then(|items| items.first());
            match item {
                Some(item) => EndpointOutcome::ok(Some(parse_item(item))),
                None => EndpointOutcome::ok(None),
            }
        }
        Err(e) => EndpointOutcome::failed(e.to_string()),
    }
}

fn parse_item(item: &Value) -> LabsData {
    let organic = item
        .get("metrics")
        .and_then(|m| m.get("organic"))
        .cloned()
        .unwrap_or(Value::Null);

    let position_buckets: PositionBuckets =
        serde_json::from_value(organic.clone()).unwrap_or_default();

    LabsData {
        organic_keywords_total: organic.get("count").and_then(Value::as_u64),
        estimated_traffic: organic.get("etv").and_then(Value::as_f64),
        visibility_score: visibility_score(&position_buckets),
        position_buckets,
    }
}

/// Derived 0-100 score; `None` when there are zero ranking keywords.
pub fn visibility_score(buckets: &PositionBuckets) -> Option<f64> {
    let total = buckets.total();
    if total == 0 {
        return None;
    }

    let counts = [
        buckets.pos_1,
        buckets.pos_2_3,
        buckets.pos_4_10,
        buckets.pos_11_20,
        buckets.pos_21_30,
        buckets.pos_31_40,
        buckets.pos_41_50,
        buckets.pos_51_60,
        buckets.pos_61_70,
        buckets.pos_71_80,
        buckets.pos_81_90,
        buckets.pos_91_100,
    ];

    let weighted: f64 = counts
        .iter()
        .zip(BUCKET_WEIGHTS.iter())
        .map(|(count, weight)| *count as f64 * weight)
        .sum();

    Some((weighted / total as f64 * 10.0).round() / 10.0)
}

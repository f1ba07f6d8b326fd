//! Whois overview adapter

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use crate::client::{DataForSeoClient, RequestContext};
use crate::endpoints::{normalize_domain, EndpointOutcome};
use crate::http::CoalesceKey;
use crate::types::WhoisData;

pub const WHOIS_ENDPOINT: &str = "/domain_analytics/whois/overview/live";

const DAYS_PER_YEAR: f64 = 365.25;

/// Fetch whois registration metrics for a domain.
pub async fn fetch_whois(
    client: &DataForSeoClient,
    domain: &str,
    ctx: &RequestContext,
) -> EndpointOutcome<WhoisData> {
    let domain = normalize_domain(domain);
    let key = CoalesceKey::new(WHOIS_ENDPOINT, domain.clone());
    let payload = json!({
        "limit": 1,
        "filters": [["domain", "=", domain]],
    });

    match client.post_coalesced(key, WHOIS_ENDPOINT, payload, ctx).await {
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

fn parse_item(item: &Value) -> WhoisData {
    let created = datetime_field(item, "created_datetime");
    WhoisData {
        created,
        updated: datetime_field(item, "changed_datetime"),
        expires: datetime_field(item, "expiration_datetime"),
        registrar: item
            .get("registrar")
            .and_then(Value::as_str)
            .map(str::to_string),
        domain_age_years: created.map(|c| age_years(c, Utc::now())),
    }
}

fn datetime_field(item: &Value, field: &str) -> Option<DateTime<Utc>> {
    item.get(field)
        .and_then(Value::as_str)
        .and_then(parse_datetime)
}

/// The provider emits both RFC 3339 and `YYYY-MM-DD HH:MM:SS +00:00`
/// timestamps depending on the registry.
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S %z"))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn age_years(created: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let days = (now - created).num_days().max(0) as f64;
    (days / DAYS_PER_YEAR * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_datetime_formats() {
        assert!(parse_datetime("2009-11-12T05:41:43+00:00").is_some());
        assert!(parse_datetime("2009-11-12 05:41:43 +00:00").is_some());
        assert!(parse_datetime("not a date").is_none());
    }

    #[test]
    fn test_age_years_rounds_to_one_decimal() {
        let created = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2022, 7, 1, 0, 0, 0).unwrap();
        let age = age_years(created, now);
        assert!((age - 2.5).abs() < 0.05, "age was {}", age);
    }

    #[test]
    fn test_age_never_negative() {
        let created = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(age_years(created, now), 0.0);
    }

    #[test]
    fn test_parse_item() {
        let item = serde_json::json!({
            "domain": "example.com",
            "created_datetime": "1995-08-14 04:00:00 +00:00",
            "changed_datetime": "2023-08-14 07:01:31 +00:00",
            "expiration_datetime": "2024-08-13 04:00:00 +00:00",
            "registrar": "RESERVED-Internet Assigned Numbers Authority",
        });
        let data = parse_item(&item);
        assert!(data.created.is_some());
        assert!(data.updated.is_some());
        assert!(data.expires.is_some());
        assert_eq!(
            data.registrar.as_deref(),
            Some("RESERVED-Internet Assigned Numbers Authority")
        );
        assert!(data.domain_age_years.unwrap() > 25.0);
    }

    #[test]
    fn test_parse_item_with_missing_fields() {
        let data = parse_item(&serde_json::json!({"domain": "example.com"}));
        assert!(data.created.is_none());
        assert!(data.domain_age_years.is_none());
        assert!(data.registrar.is_none());
    }
}

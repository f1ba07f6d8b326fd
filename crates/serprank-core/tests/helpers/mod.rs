//! Shared fixtures for the integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use serde_json::{json, Value};
use serprank_core::{ClientConfig, Credentials, DataForSeoClient, DiagnosticsLog};

pub const TEST_LOCATION: u32 = 2840;

pub fn test_credentials() -> Credentials {
    Credentials {
        username: "user".to_string(),
        password: "pass".to_string(),
    }
}

/// Client pointed at a mock server, with fast retries.
pub fn test_client(base_url: &str) -> DataForSeoClient {
    test_client_with(base_url, 3, Duration::from_millis(50))
}

pub fn test_client_with(
    base_url: &str,
    max_retries: u32,
    retry_delay: Duration,
) -> DataForSeoClient {
    let config = ClientConfig::default()
        .with_base_url(base_url)
        .with_timeout(Duration::from_secs(5))
        .with_max_retries(max_retries)
        .with_retry_delay(retry_delay)
        .with_rate_limit_per_minute(1_000);
    DataForSeoClient::new(
        test_credentials(),
        config,
        Arc::new(DiagnosticsLog::in_memory()),
    )
    .expect("test client config is valid")
}

/// Provider envelope with one successful task.
pub fn ok_envelope(result: Value) -> Value {
    json!({
        "status_code": 20000,
        "status_message": "Ok.",
        "cost": 0.05,
        "tasks": [{
            "status_code": 20000,
            "status_message": "Ok.",
            "cost": 0.05,
            "result": result,
        }],
    })
}

/// Envelope whose response-level status code signals a logical failure
/// despite HTTP 200.
pub fn provider_error_envelope(status_code: u32, message: &str) -> Value {
    json!({
        "status_code": status_code,
        "status_message": message,
        "cost": 0.0,
        "tasks": [],
    })
}

pub fn whois_envelope() -> Value {
    ok_envelope(json!([{
        "total_count": 1,
        "items_count": 1,
        "items": [{
            "domain": "example.com",
            "created_datetime": "1995-08-14 04:00:00 +00:00",
            "changed_datetime": "2023-08-14 07:01:31 +00:00",
            "expiration_datetime": "2026-08-13 04:00:00 +00:00",
            "registrar": "Example Registrar, Inc.",
        }],
    }]))
}

pub fn backlinks_envelope() -> Value {
    ok_envelope(json!([{
        "target": "example.com",
        "rank": 412,
        "backlinks": 158204,
        "referring_domains": 1932,
        "referring_ips": 1504,
        "broken_backlinks": 87,
        "backlinks_spam_score": 12,
    }]))
}

pub fn labs_envelope() -> Value {
    ok_envelope(json!([{
        "se_type": "google",
        "items": [{
            "metrics": {
                "organic": {
                    "count": 1250,
                    "etv": 15420.5,
                    "pos_1": 12,
                    "pos_2_3": 40,
                    "pos_4_10": 198,
                    "pos_11_20": 300,
                    "pos_21_30": 250,
                    "pos_31_40": 150,
                    "pos_41_50": 100,
                    "pos_51_60": 50,
                    "pos_61_70": 40,
                    "pos_71_80": 35,
                    "pos_81_90": 25,
                    "pos_91_100": 50,
                }
            }
        }],
    }]))
}

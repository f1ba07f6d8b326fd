//! Core data structures for fetched domain metrics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whois registration metrics for one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhoisData {
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
    pub registrar: Option<String>,
    /// Years since registration, one decimal. Presence of this field is
    /// what marks the whois subsystem as fetched.
    pub domain_age_years: Option<f64>,
}

/// Backlink profile metrics for one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacklinksData {
    pub backlinks_total: Option<u64>,
    pub referring_domains: Option<u64>,
    pub referring_ips: Option<u64>,
    /// Provider's 0-1000 domain authority rank
    pub domain_rank: Option<u32>,
    pub broken_backlinks: Option<u64>,
    pub spam_score: Option<u32>,
}

/// Keyword counts per SERP position bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionBuckets {
    #[serde(default)]
    pub pos_1: u64,
    #[serde(default)]
    pub pos_2_3: u64,
    #[serde(default)]
    pub pos_4_10: u64,
    #[serde(default)]
    pub pos_11_20: u64,
    #[serde(default)]
    pub pos_21_30: u64,
    #[serde(default)]
    pub pos_31_40: u64,
    #[serde(default)]
    pub pos_41_50: u64,
    #[serde(default)]
    pub pos_51_60: u64,
    #[serde(default)]
    pub pos_61_70: u64,
    #[serde(default)]
    pub pos_71_80: u64,
    #[serde(default)]
    pub pos_81_90: u64,
    #[serde(default)]
    pub pos_91_100: u64,
}

impl PositionBuckets {
    /// Total ranking keywords across all buckets.
    pub fn total(&self) -> u64 {
        self.pos_1
            + self.pos_2_3
            + self.pos_4_10
            + self.pos_11_20
            + self.pos_21_30
            + self.pos_31_40
            + self.pos_41_50
            + self.pos_51_60
            + self.pos_61_70
            + self.pos_71_80
            + self.pos_81_90
            + self.pos_91_100
    }
}

/// Keyword/rank metrics from the labs endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabsData {
    /// Presence of this field is what marks the labs subsystem as fetched.
    pub organic_keywords_total: Option<u64>,
    /// Provider's estimated monthly organic traffic value
    pub estimated_traffic: Option<f64>,
    pub position_buckets: PositionBuckets,
    /// Derived 0-100 score; `None` when there are zero ranking keywords
    pub visibility_score: Option<f64>,
}

/// Per-domain aggregation of the three metric subsystems. Each subsystem
/// field stays `None` until fetched; `errors` accumulates per-subsystem
/// failure messages without aborting the whole fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainCredibilityData {
    pub domain: String,
    pub whois: Option<WhoisData>,
    pub backlinks: Option<BacklinksData>,
    pub labs: Option<LabsData>,
    pub errors: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}

impl DomainCredibilityData {
    /// Empty record for a domain with nothing fetched yet.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            whois: None,
            backlinks: None,
            labs: None,
            errors: Vec::new(),
            fetched_at: Utc::now(),
        }
    }
}

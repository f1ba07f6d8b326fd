//! Correlation-tagged diagnostic logging
//!
//! Every logical user action gets a fresh [`CorrelationId`]; every request
//! attempt produces a [`LogEntry`] carrying it. Entries are immutable
//! values: state transitions (`PENDING -> RETRYING* -> SUCCESS | FAILED`)
//! build new entries rather than mutating saved ones. The log itself is a
//! bounded append-only list mirrored to a JSON file, oldest entries
//! evicted first.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::error::{Error, ErrorKind};

/// Default maximum number of retained log entries.
pub const DEFAULT_MAX_ENTRIES: usize = 500;

/// Opaque token grouping all log entries produced by one logical user
/// action. Passed explicitly through the call chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generate a fresh id.
    pub fn new() -> Self {
        Self(format!("req_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a logged request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogStatus {
    Pending,
    Success,
    Failed,
    Retrying,
}

impl std::fmt::Display for LogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogStatus::Pending => "PENDING",
            LogStatus::Success => "SUCCESS",
            LogStatus::Failed => "FAILED",
            LogStatus::Retrying => "RETRYING",
        };
        write!(f, "{}", name)
    }
}

/// One diagnostic record. The `id` identifies the logical request, so a
/// retried request appends several entries sharing one id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub status: LogStatus,
    pub endpoint: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_code: Option<u32>,
    pub duration_ms: u64,
    pub retry_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_status_code: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_code: Option<String>,
}

impl LogEntry {
    /// Create a PENDING entry at request start.
    pub fn pending(method: &str, endpoint: &str, ctx: &crate::client::RequestContext) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            timestamp: Utc::now(),
            status: LogStatus::Pending,
            endpoint: endpoint.to_string(),
            method: method.to_string(),
            domain: ctx.domain.clone(),
            location_code: ctx.location_code,
            duration_ms: 0,
            retry_count: 0,
            http_status: None,
            api_status_code: None,
            cost: None,
            error_kind: None,
            error_message: None,
            correlation_id: ctx.correlation_id.to_string(),
            client_code: ctx.client_code.clone(),
        }
    }

    /// Derive a RETRYING entry for a failed attempt that will be retried.
    pub fn retrying(&self, retry_count: u32, error: &Error, elapsed: std::time::Duration) -> Self {
        let mut entry = self.clone();
        entry.timestamp = Utc::now();
        entry.status = LogStatus::Retrying;
        entry.retry_count = retry_count;
        entry.duration_ms = elapsed.as_millis() as u64;
        entry.error_kind = Some(error.kind());
        entry.error_message = Some(error.to_string());
        if let Error::Api {
            http_status,
            provider_code,
            ..
        } = error
        {
            entry.http_status = *http_status;
            entry.api_status_code = *provider_code;
        }
        entry
    }

    /// Derive the terminal SUCCESS entry.
    pub fn success(
        &self,
        elapsed: std::time::Duration,
        http_status: u16,
        api_status_code: u32,
        cost: f64,
        retry_count: u32,
    ) -> Self {
        let mut entry = self.clone();
        entry.timestamp = Utc::now();
        entry.status = LogStatus::Success;
        entry.duration_ms = elapsed.as_millis() as u64;
        entry.retry_count = retry_count;
        entry.http_status = Some(http_status);
        entry.api_status_code = Some(api_status_code);
        entry.cost = Some(cost);
        entry.error_kind = None;
        entry.error_message = None;
        entry
    }

    /// Derive the terminal FAILED entry.
    pub fn failed(&self, elapsed: std::time::Duration, error: &Error, retry_count: u32) -> Self {
        let mut entry = self.retrying(retry_count, error, elapsed);
        entry.status = LogStatus::Failed;
        entry
    }
}

/// Filters for [`DiagnosticsLog::entries`].
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub status: Option<LogStatus>,
    pub endpoint: Option<String>,
    pub correlation_id: Option<String>,
    pub since: Option<DateTime<Utc>>,
}

/// Aggregate view over the retained log.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsSummary {
    pub total_entries: usize,
    pub by_status: HashMap<String, usize>,
    /// Terminal entries per endpoint
    pub by_endpoint: HashMap<String, usize>,
    /// Terminal failures per error kind
    pub by_error_kind: HashMap<String, usize>,
    /// Sum of provider-reported cost over successful requests
    pub total_cost: f64,
    /// Mean duration over terminal entries, in milliseconds
    pub avg_duration_ms: f64,
}

/// Bounded durable diagnostic log.
///
/// Appends go to an in-memory deque mirrored to an optional JSON file;
/// persistence failures are logged and never fail the request being
/// recorded.
#[derive(Debug)]
pub struct DiagnosticsLog {
    max_entries: usize,
    path: Option<PathBuf>,
    entries: Mutex<VecDeque<LogEntry>>,
}

impl DiagnosticsLog {
    /// In-memory log with the default retention cap.
    pub fn in_memory() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            path: None,
            entries: Mutex::new(VecDeque::new()),
        }
    }

    /// Durable log backed by a JSON file. Existing entries are loaded so
    /// diagnostics survive restarts.
    pub fn with_file(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Vec<LogEntry>>(&raw) {
                Ok(loaded) => loaded.into(),
                Err(e) => {
                    log::warn!("ignoring unreadable diagnostics log {}: {}", path.display(), e);
                    VecDeque::new()
                }
            },
            Err(_) => VecDeque::new(),
        };

        Self {
            max_entries,
            path: Some(path),
            entries: Mutex::new(entries),
        }
    }

    /// Append one entry, trim to the retention cap, emit a console line,
    /// and mirror to the backing file if any.
    pub fn append(&self, entry: LogEntry) {
        emit_console_line(&entry);

        let snapshot = {
            let mut entries = self.entries.lock().expect("diagnostics mutex poisoned");
            entries.push_back(entry);
            while entries.len() > self.max_entries {
                entries.pop_front();
            }
            if self.path.is_some() {
                Some(entries.iter().cloned().collect::<Vec<_>>())
            } else {
                None
            }
        };

        if let (Some(path), Some(snapshot)) = (&self.path, snapshot) {
            if let Err(e) = persist(path, &snapshot) {
                log::warn!("failed to persist diagnostics log {}: {}", path.display(), e);
            }
        }
    }

    /// Entries matching the filter, oldest first.
    pub fn entries(&self, filter: &LogFilter) -> Vec<LogEntry> {
        let entries = self.entries.lock().expect("diagnostics mutex poisoned");
        entries
            .iter()
            .filter(|e| filter.status.map_or(true, |s| e.status == s))
            .filter(|e| {
                filter
                    .endpoint
                    .as_deref()
                    .map_or(true, |ep| e.endpoint == ep)
            })
            .filter(|e| {
                filter
                    .correlation_id
                    .as_deref()
                    .map_or(true, |c| e.correlation_id == c)
            })
            .filter(|e| filter.since.map_or(true, |t| e.timestamp >= t))
            .cloned()
            .collect()
    }

    /// Aggregate the retained entries, optionally restricted to a time
    /// window.
    pub fn summary(&self, since: Option<DateTime<Utc>>) -> DiagnosticsSummary {
        let entries = self.entries.lock().expect("diagnostics mutex poisoned");
        let mut by_status: HashMap<String, usize> = HashMap::new();
        let mut by_endpoint: HashMap<String, usize> = HashMap::new();
        let mut by_error_kind: HashMap<String, usize> = HashMap::new();
        let mut total_cost = 0.0;
        let mut terminal_count = 0usize;
        let mut duration_sum = 0u64;
        let mut total = 0usize;

        for entry in entries.iter() {
            if let Some(since) = since {
                if entry.timestamp < since {
                    continue;
                }
            }
            total += 1;
            *by_status.entry(entry.status.to_string()).or_insert(0) += 1;

            match entry.status {
                LogStatus::Success => {
                    *by_endpoint.entry(entry.endpoint.clone()).or_insert(0) += 1;
                    total_cost += entry.cost.unwrap_or(0.0);
                    terminal_count += 1;
                    duration_sum += entry.duration_ms;
                }
                LogStatus::Failed => {
                    *by_endpoint.entry(entry.endpoint.clone()).or_insert(0) += 1;
                    if let Some(kind) = entry.error_kind {
                        *by_error_kind.entry(kind.to_string()).or_insert(0) += 1;
                    }
                    terminal_count += 1;
                    duration_sum += entry.duration_ms;
                }
                LogStatus::Pending | LogStatus::Retrying => {}
            }
        }

        DiagnosticsSummary {
            total_entries: total,
            by_status,
            by_endpoint,
            by_error_kind,
            total_cost,
            avg_duration_ms: if terminal_count == 0 {
                0.0
            } else {
                duration_sum as f64 / terminal_count as f64
            },
        }
    }
}

fn emit_console_line(entry: &LogEntry) {
    match entry.status {
        LogStatus::Pending => log::debug!(
            "[{}] {} {} {} pending",
            entry.correlation_id,
            entry.method,
            entry.endpoint,
            entry.domain.as_deref().unwrap_or("-"),
        ),
        LogStatus::Retrying => log::warn!(
            "[{}] {} {} retrying (retry {}): {}",
            entry.correlation_id,
            entry.method,
            entry.endpoint,
            entry.retry_count,
            entry.error_message.as_deref().unwrap_or("unknown error"),
        ),
        LogStatus::Success => log::info!(
            "[{}] {} {} ok in {}ms (retries={}, cost={})",
            entry.correlation_id,
            entry.method,
            entry.endpoint,
            entry.duration_ms,
            entry.retry_count,
            entry.cost.unwrap_or(0.0),
        ),
        LogStatus::Failed => log::error!(
            "[{}] {} {} failed after {}ms (retries={}): {}",
            entry.correlation_id,
            entry.method,
            entry.endpoint,
            entry.duration_ms,
            entry.retry_count,
            entry.error_message.as_deref().unwrap_or("unknown error"),
        ),
    }
}

fn persist(path: &std::path::Path, entries: &[LogEntry]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let raw = serde_json::to_string_pretty(entries)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RequestContext;
    use std::time::Duration;

    fn pending_entry(endpoint: &str) -> LogEntry {
        let ctx = RequestContext::new().with_domain("example.com");
        LogEntry::pending("POST", endpoint, &ctx)
    }

    fn server_error() -> Error {
        Error::Api {
            kind: ErrorKind::ServerError,
            message: "boom".to_string(),
            endpoint: "/e".to_string(),
            http_status: Some(500),
            provider_code: None,
            retryable: true,
        }
    }

    #[test]
    fn test_correlation_ids_are_unique() {
        let a = CorrelationId::new();
        let b = CorrelationId::new();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("req_"));
    }

    #[test]
    fn test_transitions_build_new_entries() {
        let pending = pending_entry("/e");
        assert_eq!(pending.status, LogStatus::Pending);

        let retrying = pending.retrying(1, &server_error(), Duration::from_millis(120));
        assert_eq!(retrying.status, LogStatus::Retrying);
        assert_eq!(retrying.retry_count, 1);
        assert_eq!(retrying.http_status, Some(500));
        assert_eq!(retrying.id, pending.id);
        // The base entry is untouched.
        assert_eq!(pending.status, LogStatus::Pending);

        let success = pending.success(Duration::from_millis(340), 200, 20000, 0.05, 1);
        assert_eq!(success.status, LogStatus::Success);
        assert_eq!(success.cost, Some(0.05));
        assert!(success.error_kind.is_none());

        let failed = pending.failed(Duration::from_millis(900), &server_error(), 2);
        assert_eq!(failed.status, LogStatus::Failed);
        assert_eq!(failed.error_kind, Some(ErrorKind::ServerError));
    }

    #[test]
    fn test_append_trims_oldest() {
        let log = DiagnosticsLog {
            max_entries: 3,
            path: None,
            entries: Mutex::new(VecDeque::new()),
        };
        for i in 0..5 {
            log.append(pending_entry(&format!("/e{}", i)));
        }
        let entries = log.entries(&LogFilter::default());
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].endpoint, "/e2");
        assert_eq!(entries[2].endpoint, "/e4");
    }

    #[test]
    fn test_filters() {
        let log = DiagnosticsLog::in_memory();
        let pending = pending_entry("/whois");
        log.append(pending.clone());
        log.append(pending.success(Duration::from_millis(10), 200, 20000, 0.05, 0));
        log.append(pending_entry("/backlinks"));

        let succeeded = log.entries(&LogFilter {
            status: Some(LogStatus::Success),
            ..Default::default()
        });
        assert_eq!(succeeded.len(), 1);
        assert_eq!(succeeded[0].endpoint, "/whois");

        let by_correlation = log.entries(&LogFilter {
            correlation_id: Some(pending.correlation_id.clone()),
            ..Default::default()
        });
        assert_eq!(by_correlation.len(), 2);
    }

    #[test]
    fn test_summary_aggregates() {
        let log = DiagnosticsLog::in_memory();
        let a = pending_entry("/whois");
        log.append(a.clone());
        log.append(a.success(Duration::from_millis(100), 200, 20000, 0.05, 0));
        let b = pending_entry("/labs");
        log.append(b.clone());
        log.append(b.failed(Duration::from_millis(300), &server_error(), 2));

        let summary = log.summary(None);
        assert_eq!(summary.total_entries, 4);
        assert_eq!(summary.by_status.get("SUCCESS"), Some(&1));
        assert_eq!(summary.by_status.get("FAILED"), Some(&1));
        assert_eq!(summary.by_status.get("PENDING"), Some(&2));
        assert_eq!(summary.by_endpoint.get("/whois"), Some(&1));
        assert_eq!(summary.by_error_kind.get("SERVER_ERROR"), Some(&1));
        assert!((summary.total_cost - 0.05).abs() < f64::EPSILON);
        assert!((summary.avg_duration_ms - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_durable_log_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagnostics.json");

        {
            let log = DiagnosticsLog::with_file(&path, 10);
            log.append(pending_entry("/whois"));
            log.append(pending_entry("/backlinks"));
        }

        let reloaded = DiagnosticsLog::with_file(&path, 10);
        let entries = reloaded.entries(&LogFilter::default());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].endpoint, "/whois");
    }
}

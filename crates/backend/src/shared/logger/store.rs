use async_trait::async_trait;
use contracts::shared::logger::{LogBucket, LogEntry};
use thiserror::Error;

/// Closed set of failure kinds the log store reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Unavailable,
    Timeout,
    AuthFailure,
    Other,
}

impl StoreErrorKind {
    /// Kinds that mean "telemetry is down" rather than "the query is wrong".
    pub fn is_unavailability(&self) -> bool {
        !matches!(self, StoreErrorKind::Other)
    }
}

#[derive(Debug, Clone, Error)]
#[error("log store error ({kind:?}): {message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Фильтр по уровню для постраничного списка
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelFilter {
    Bucket(LogBucket),
    /// Only critical/fatal rows (a subset of the error bucket).
    Critical,
    /// Exact raw level match for values that are not a known bucket.
    Raw(String),
}

impl LevelFilter {
    /// Blank input means "no filter".
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.eq_ignore_ascii_case("critical") {
            return Some(LevelFilter::Critical);
        }
        Some(match LogBucket::parse(trimmed) {
            Some(bucket) => LevelFilter::Bucket(bucket),
            None => LevelFilter::Raw(trimmed.to_ascii_lowercase()),
        })
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        match self {
            LevelFilter::Bucket(bucket) => entry.bucket() == *bucket,
            LevelFilter::Critical => entry.parsed_level().is_critical(),
            LevelFilter::Raw(level) => entry.level.trim().eq_ignore_ascii_case(level),
        }
    }
}

/// Read-only access to the bridge service's log rows.
///
/// Every method returns rows newest-first: by timestamp, ties broken by id.
#[async_trait]
pub trait LogStore: Send + Sync {
    async fn query_recent_logs(&self, limit: u64) -> Result<Vec<LogEntry>, StoreError>;

    /// `page` is 1-indexed. The count covers every row matching `level`.
    async fn query_log_page(
        &self,
        page: u64,
        limit: u64,
        level: Option<&LevelFilter>,
    ) -> Result<(Vec<LogEntry>, u64), StoreError>;

    async fn query_statistics_window(&self, window: u64) -> Result<Vec<LogEntry>, StoreError>;

    /// Reachability check used by the status composer.
    async fn ping(&self) -> Result<(), StoreError>;
}

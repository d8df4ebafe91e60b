use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Запись лога, которую пишет сам bridge-сервис
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<i32>,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub processed: bool,
    #[serde(default)]
    pub notification_sent: bool,
    /// Время вставки строки (может отличаться от `timestamp` события)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl LogEntry {
    pub fn parsed_level(&self) -> LogLevel {
        LogLevel::parse(&self.level)
    }

    pub fn bucket(&self) -> LogBucket {
        self.parsed_level().bucket()
    }
}

/// Severity as written by the bridge service. Unknown strings are kept in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Success,
    Warning,
    Error,
    Critical,
    Other(String),
}

impl LogLevel {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "success" => LogLevel::Success,
            "warning" | "warn" => LogLevel::Warning,
            "error" => LogLevel::Error,
            "critical" | "fatal" => LogLevel::Critical,
            other => LogLevel::Other(other.to_string()),
        }
    }

    pub fn bucket(&self) -> LogBucket {
        match self {
            LogLevel::Success => LogBucket::Success,
            LogLevel::Warning => LogBucket::Warning,
            LogLevel::Error | LogLevel::Critical => LogBucket::Error,
            LogLevel::Trace | LogLevel::Debug | LogLevel::Info | LogLevel::Other(_) => {
                LogBucket::Info
            }
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, LogLevel::Critical)
    }
}

/// Primary classification bucket. Every level maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogBucket {
    Info,
    Warning,
    Error,
    Success,
}

impl LogBucket {
    pub const ALL: [LogBucket; 4] = [
        LogBucket::Info,
        LogBucket::Warning,
        LogBucket::Error,
        LogBucket::Success,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "info" => Some(LogBucket::Info),
            "warning" | "warn" => Some(LogBucket::Warning),
            "error" => Some(LogBucket::Error),
            "success" => Some(LogBucket::Success),
            _ => None,
        }
    }

    /// Raw level strings (lowercase) that fall into this bucket.
    /// `Info` is the catch-all, so its list only names the known members.
    pub fn raw_levels(&self) -> &'static [&'static str] {
        match self {
            LogBucket::Info => &["info", "debug", "trace"],
            LogBucket::Warning => &["warning", "warn"],
            LogBucket::Error => &["error", "critical", "fatal"],
            LogBucket::Success => &["success"],
        }
    }
}

/// Классификация последней записи о состоянии токена
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenState {
    Healthy,
    Refreshed,
    Expired,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenStatus {
    pub status: TokenState,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub message: String,
}

/// Статистика по окну последних записей лога (пересчитывается на каждый запрос)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStatistics {
    pub total_logs: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub warning_count: u64,
    pub info_count: u64,
    pub failed_episodes: u64,
    pub successful_grabs: u64,
    pub critical_errors: u64,
    pub token_status: Option<TokenStatus>,
    pub recent_successes: Vec<LogEntry>,
    pub recent_failures: Vec<LogEntry>,
}

/// Ответ GET /api/logs-statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsOverview {
    pub statistics: LogStatistics,
    pub recent_logs: Vec<LogEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing_is_total_and_case_insensitive() {
        assert_eq!(LogLevel::parse("SUCCESS"), LogLevel::Success);
        assert_eq!(LogLevel::parse(" Warn "), LogLevel::Warning);
        assert_eq!(LogLevel::parse("FATAL"), LogLevel::Critical);
        assert_eq!(LogLevel::parse("verbose"), LogLevel::Other("verbose".into()));
        assert_eq!(LogLevel::parse("verbose").bucket(), LogBucket::Info);
        assert_eq!(LogLevel::parse("debug").bucket(), LogBucket::Info);
    }

    #[test]
    fn test_critical_is_error_bucket() {
        let level = LogLevel::parse("critical");
        assert_eq!(level.bucket(), LogBucket::Error);
        assert!(level.is_critical());
        assert!(!LogLevel::Error.is_critical());
    }

    #[test]
    fn test_statistics_serialize_camel_case() {
        let json = serde_json::to_value(LogStatistics::default()).unwrap();
        assert_eq!(json["totalLogs"], 0);
        assert_eq!(json["tokenStatus"], serde_json::Value::Null);
        assert!(json["recentSuccesses"].as_array().unwrap().is_empty());
    }
}

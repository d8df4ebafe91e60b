use serde::{Deserialize, Serialize};

pub const STATUS_UNREACHABLE: &str = "unreachable";
pub const STATUS_OFFLINE: &str = "offline";

/// Флаги доступности внешних сервисов
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFlags {
    #[serde(default)]
    pub database: bool,
    #[serde(default)]
    pub overseerr: bool,
    #[serde(default)]
    pub realdebrid: bool,
    #[serde(default)]
    pub trakt: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueStatus {
    #[serde(default)]
    pub movie_queue_size: u64,
    #[serde(default)]
    pub tv_queue_size: u64,
    #[serde(default)]
    pub is_processing: bool,
    #[serde(default)]
    pub total_queued: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryStats {
    #[serde(default)]
    pub torrents_count: u64,
    #[serde(default)]
    pub total_size_tb: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// Каноническое представление статуса bridge-сервиса
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeStatus {
    pub status: String,
    /// Uptime in seconds.
    pub uptime: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime_display: Option<String>,
    pub version: String,
    pub last_check: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_status: Option<QueueStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_stats: Option<LibraryStats>,
    pub services: ServiceFlags,
    /// Fields reported by the bridge that have no place in the canonical shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Map<String, serde_json::Value>>,
}

impl BridgeStatus {
    pub fn unreachable(last_check: String, message: impl Into<String>) -> Self {
        Self {
            status: STATUS_UNREACHABLE.to_string(),
            uptime: 0.0,
            uptime_display: None,
            version: "unknown".to_string(),
            last_check,
            message: Some(message.into()),
            queue_status: None,
            browser_status: None,
            library_stats: None,
            services: ServiceFlags::default(),
            data: None,
        }
    }
}

/// Единый конверт ответа для управляющих операций
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeOperationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Upstream HTTP status when the bridge answered with a failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl BridgeOperationResult {
    pub fn ok(message: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
            ..Default::default()
        }
    }

    pub fn failed(
        error: impl Into<String>,
        details: Option<String>,
        status_code: Option<u16>,
    ) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            details,
            status_code,
            ..Default::default()
        }
    }
}

/// Тело POST /api/retrigger-media-bulk. Ids are numbers or strings and are
/// forwarded to the bridge as sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetriggerBulkRequest {
    #[serde(default)]
    pub media_ids: Vec<serde_json::Value>,
}

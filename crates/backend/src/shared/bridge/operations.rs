use reqwest::Method;
use serde_json::{json, Value};

use super::error::BridgeError;

pub const DEFAULT_LIST_HISTORY_LIMIT: u32 = 50;
pub const DEFAULT_GLOBAL_HISTORY_LIMIT: u32 = 100;

/// Control and list operations the dashboard forwards to the bridge service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeOperation {
    ReloadEnv,
    Restart,
    RequeueStuckMovies,
    RefreshTasks,
    RetriggerMedia { media_id: String },
    RetriggerMediaBulk { media_ids: Vec<Value> },
    ListTraktLists { active_only: bool },
    DeleteTraktList { list_id: String },
    TraktListHistory { list_id: String, limit: u32 },
    TraktListItems { list_id: String },
    TraktHistory { limit: u32 },
    TraktHistoryItems { session_id: String },
}

/// How a successful response reaches the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Wrapped in `BridgeOperationResult` with the payload in `data`.
    Acknowledge,
    /// The bridge payload as-is.
    Passthrough,
}

impl BridgeOperation {
    /// Short identifier used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            BridgeOperation::ReloadEnv => "reload-env",
            BridgeOperation::Restart => "restart",
            BridgeOperation::RequeueStuckMovies => "re-queue-stuck-movies",
            BridgeOperation::RefreshTasks => "refresh-tasks",
            BridgeOperation::RetriggerMedia { .. } => "retrigger-media",
            BridgeOperation::RetriggerMediaBulk { .. } => "retrigger-media-bulk",
            BridgeOperation::ListTraktLists { .. } => "list-trakt-lists",
            BridgeOperation::DeleteTraktList { .. } => "delete-trakt-list",
            BridgeOperation::TraktListHistory { .. } => "trakt-list-history",
            BridgeOperation::TraktListItems { .. } => "trakt-list-items",
            BridgeOperation::TraktHistory { .. } => "trakt-history",
            BridgeOperation::TraktHistoryItems { .. } => "trakt-history-items",
        }
    }

    /// Phrase completing "Failed to ..." in error envelopes.
    pub fn action(&self) -> &'static str {
        match self {
            BridgeOperation::ReloadEnv => "reload environment",
            BridgeOperation::Restart => "restart service",
            BridgeOperation::RequeueStuckMovies => "re-queue stuck movies",
            BridgeOperation::RefreshTasks => "refresh background tasks",
            BridgeOperation::RetriggerMedia { .. } => "retrigger media processing",
            BridgeOperation::RetriggerMediaBulk { .. } => "bulk retrigger media processing",
            BridgeOperation::ListTraktLists { .. } => "get Trakt lists",
            BridgeOperation::DeleteTraktList { .. } => "delete Trakt list",
            BridgeOperation::TraktListHistory { .. } | BridgeOperation::TraktHistory { .. } => {
                "get sync history"
            }
            BridgeOperation::TraktListItems { .. } => "get list items",
            BridgeOperation::TraktHistoryItems { .. } => "get sync items",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            BridgeOperation::ReloadEnv => "Environment variables reloaded successfully",
            BridgeOperation::Restart => "Service restart initiated",
            BridgeOperation::RequeueStuckMovies => "Stuck movies re-queued successfully",
            BridgeOperation::RefreshTasks => "Background tasks refreshed successfully",
            BridgeOperation::DeleteTraktList { .. } => "Trakt list deleted",
            _ => "OK",
        }
    }

    pub fn shape(&self) -> ResponseShape {
        match self {
            BridgeOperation::RetriggerMedia { .. }
            | BridgeOperation::RetriggerMediaBulk { .. }
            | BridgeOperation::ListTraktLists { .. }
            | BridgeOperation::TraktListHistory { .. }
            | BridgeOperation::TraktListItems { .. }
            | BridgeOperation::TraktHistory { .. }
            | BridgeOperation::TraktHistoryItems { .. } => ResponseShape::Passthrough,
            _ => ResponseShape::Acknowledge,
        }
    }

    pub fn method(&self) -> Method {
        match self {
            BridgeOperation::ReloadEnv
            | BridgeOperation::Restart
            | BridgeOperation::RequeueStuckMovies
            | BridgeOperation::RefreshTasks
            | BridgeOperation::RetriggerMedia { .. }
            | BridgeOperation::RetriggerMediaBulk { .. } => Method::POST,
            BridgeOperation::DeleteTraktList { .. } => Method::DELETE,
            _ => Method::GET,
        }
    }

    /// Path relative to the bridge base URL. Ids are percent-encoded.
    pub fn path(&self) -> String {
        match self {
            BridgeOperation::ReloadEnv => "/reload-env".to_string(),
            BridgeOperation::Restart => "/api/restart".to_string(),
            BridgeOperation::RequeueStuckMovies => "/api/re-queue-stuck-movies".to_string(),
            BridgeOperation::RefreshTasks => "/api/refresh-tasks".to_string(),
            BridgeOperation::RetriggerMedia { media_id } => {
                format!("/retrigger-media/{}", segment(media_id))
            }
            BridgeOperation::RetriggerMediaBulk { .. } => "/retrigger-media-bulk".to_string(),
            BridgeOperation::ListTraktLists { .. } => "/api/trakt-lists".to_string(),
            BridgeOperation::DeleteTraktList { list_id } => {
                format!("/api/trakt-lists/{}", segment(list_id))
            }
            BridgeOperation::TraktListHistory { list_id, .. } => {
                format!("/api/trakt-lists/{}/history", segment(list_id))
            }
            BridgeOperation::TraktListItems { list_id } => {
                format!("/api/trakt-lists/{}/items", segment(list_id))
            }
            BridgeOperation::TraktHistory { .. } => "/api/trakt-lists/history".to_string(),
            BridgeOperation::TraktHistoryItems { session_id } => {
                format!("/api/trakt-lists/history/{}/items", segment(session_id))
            }
        }
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            BridgeOperation::ListTraktLists { active_only } => {
                vec![("active_only", active_only.to_string())]
            }
            BridgeOperation::TraktListHistory { limit, .. } | BridgeOperation::TraktHistory { limit } => {
                vec![("limit", limit.to_string())]
            }
            _ => Vec::new(),
        }
    }

    pub fn body(&self) -> Option<Value> {
        match self {
            BridgeOperation::RetriggerMediaBulk { media_ids } => Some(json!({ "media_ids": media_ids })),
            _ => None,
        }
    }

    /// Checks that must pass before the bridge is contacted.
    pub fn validate(&self) -> Result<(), BridgeError> {
        match self {
            BridgeOperation::RetriggerMedia { media_id } => require("Media ID", media_id),
            BridgeOperation::DeleteTraktList { list_id }
            | BridgeOperation::TraktListHistory { list_id, .. }
            | BridgeOperation::TraktListItems { list_id } => require("List ID", list_id),
            BridgeOperation::TraktHistoryItems { session_id } => require("Session ID", session_id),
            BridgeOperation::RetriggerMediaBulk { media_ids } => {
                if media_ids.is_empty() {
                    return Err(BridgeError::InvalidRequest(
                        "media_ids array is required and must not be empty".to_string(),
                    ));
                }
                if !media_ids.iter().all(is_media_id) {
                    return Err(BridgeError::InvalidRequest(
                        "media_ids must contain only numeric or non-empty string ids".to_string(),
                    ));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn require(name: &str, value: &str) -> Result<(), BridgeError> {
    if value.trim().is_empty() {
        return Err(BridgeError::InvalidRequest(format!("{name} is required")));
    }
    Ok(())
}

fn is_media_id(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => !s.trim().is_empty(),
        _ => false,
    }
}

fn segment(value: &str) -> String {
    urlencoding::encode(value.trim()).into_owned()
}

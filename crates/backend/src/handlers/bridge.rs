use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::system::bridge::{BridgeOperationResult, RetriggerBulkRequest};
use serde::Deserialize;
use serde_json::Value;

use crate::shared::bridge::operations::{DEFAULT_GLOBAL_HISTORY_LIMIT, DEFAULT_LIST_HISTORY_LIMIT};
use crate::shared::bridge::{BridgeError, BridgeOperation};
use crate::state::AppState;

type BridgeResponse = Result<Json<Value>, (StatusCode, Json<BridgeOperationResult>)>;

async fn forward(state: &AppState, op: BridgeOperation) -> BridgeResponse {
    state.bridge.run(&op).await.map(Json).map_err(|e| reject(&op, e))
}

fn reject(op: &BridgeOperation, err: BridgeError) -> (StatusCode, Json<BridgeOperationResult>) {
    (err.status_code(), Json(err.into_result(op.action())))
}

/// POST /api/bridge-reload
pub async fn reload_env(State(state): State<AppState>) -> BridgeResponse {
    forward(&state, BridgeOperation::ReloadEnv).await
}

/// POST /api/restart
pub async fn restart(State(state): State<AppState>) -> BridgeResponse {
    forward(&state, BridgeOperation::Restart).await
}

/// POST /api/re-queue-stuck-movies
pub async fn requeue_stuck_movies(State(state): State<AppState>) -> BridgeResponse {
    forward(&state, BridgeOperation::RequeueStuckMovies).await
}

/// POST /api/bridge-refresh-tasks
pub async fn refresh_tasks(State(state): State<AppState>) -> BridgeResponse {
    forward(&state, BridgeOperation::RefreshTasks).await
}

/// POST /api/retrigger-media/:id
pub async fn retrigger_media(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
) -> BridgeResponse {
    forward(&state, BridgeOperation::RetriggerMedia { media_id }).await
}

/// POST /api/retrigger-media-bulk
///
/// A request without a JSON body has no ids; a body that does not parse is rejected as such.
pub async fn retrigger_media_bulk(
    State(state): State<AppState>,
    body: Result<Json<RetriggerBulkRequest>, JsonRejection>,
) -> BridgeResponse {
    let media_ids = match body {
        Ok(Json(req)) => req.media_ids,
        Err(JsonRejection::MissingJsonContentType(_)) => Vec::new(),
        Err(rejection) => {
            tracing::warn!("Rejected bulk retrigger body: {}", rejection.body_text());
            return Err((
                StatusCode::BAD_REQUEST,
                Json(BridgeOperationResult::failed(
                    "Invalid request body",
                    Some(rejection.body_text()),
                    None,
                )),
            ));
        }
    };
    forward(&state, BridgeOperation::RetriggerMediaBulk { media_ids }).await
}

#[derive(Debug, Deserialize)]
pub struct ListsQuery {
    #[serde(default, alias = "activeOnly")]
    pub active_only: Option<String>,
}

/// GET /api/trakt-lists?active_only=
pub async fn list_trakt_lists(
    State(state): State<AppState>,
    Query(query): Query<ListsQuery>,
) -> BridgeResponse {
    // Только явное "false" отключает фильтр
    let active_only = query
        .active_only
        .map_or(true, |v| !v.trim().eq_ignore_ascii_case("false"));
    forward(&state, BridgeOperation::ListTraktLists { active_only }).await
}

/// DELETE /api/trakt-lists/:id
pub async fn delete_trakt_list(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
) -> BridgeResponse {
    forward(&state, BridgeOperation::DeleteTraktList { list_id }).await
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<String>,
}

impl HistoryQuery {
    fn limit_or(&self, default: u32) -> u32 {
        self.limit
            .as_deref()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(default)
    }
}

/// GET /api/trakt-lists/:id/history?limit=
pub async fn trakt_list_history(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> BridgeResponse {
    let limit = query.limit_or(DEFAULT_LIST_HISTORY_LIMIT);
    forward(&state, BridgeOperation::TraktListHistory { list_id, limit }).await
}

/// GET /api/trakt-lists/:id/items
pub async fn trakt_list_items(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
) -> BridgeResponse {
    match state.bridge.list_items(&list_id).await {
        Ok(payload) => Ok(Json(payload)),
        Err(e) => Err(reject(&BridgeOperation::TraktListItems { list_id }, e)),
    }
}

/// GET /api/trakt-lists/history?limit=
pub async fn trakt_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> BridgeResponse {
    let limit = query.limit_or(DEFAULT_GLOBAL_HISTORY_LIMIT);
    forward(&state, BridgeOperation::TraktHistory { limit }).await
}

/// GET /api/trakt-lists/history/:session_id/items
pub async fn trakt_history_items(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> BridgeResponse {
    forward(&state, BridgeOperation::TraktHistoryItems { session_id }).await
}

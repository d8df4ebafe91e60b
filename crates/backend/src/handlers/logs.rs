use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::shared::logger::{LogEntry, LogsOverview};
use contracts::shared::paging::PageResult;
use serde_json::{json, Value};

use crate::shared::logger::pagination::{self, ListParams, ListQuery};
use crate::shared::logger::statistics;
use crate::state::AppState;

/// GET /api/logs-statistics
pub async fn get_statistics(State(state): State<AppState>) -> Json<LogsOverview> {
    let overview = statistics::get_logs_overview(
        state.store.as_ref(),
        &state.rules,
        state.logs.statistics_window,
        state.logs.recent_sample_cap,
        state.logs.recent_logs_limit,
    )
    .await;
    Json(overview)
}

/// GET /api/logs/entries?page=&limit=&level=
pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PageResult<LogEntry>>, (StatusCode, Json<Value>)> {
    let params = ListParams::from_query(&query, state.logs.default_page_size);
    match pagination::list_entries(state.store.as_ref(), &params).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Failed to fetch log entries",
                "details": e.message,
            })),
        )),
    }
}

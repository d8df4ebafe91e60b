use axum::extract::State;
use axum::Json;
use contracts::system::bridge::BridgeStatus;

use crate::shared::bridge::status::compose_status;
use crate::state::AppState;

/// GET /api/service-status
pub async fn get_service_status(State(state): State<AppState>) -> Json<BridgeStatus> {
    let status = compose_status(
        &state.bridge,
        state.store.as_ref(),
        &state.bridge_config.status_path,
        state.bridge_config.stale_after_secs,
    )
    .await;
    Json(status)
}

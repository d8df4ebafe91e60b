use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        // ========================================
        // LOG TELEMETRY
        // ========================================
        .route("/api/logs-statistics", get(handlers::logs::get_statistics))
        .route("/api/logs/entries", get(handlers::logs::list_entries))
        // ========================================
        // BRIDGE STATUS & CONTROL
        // ========================================
        .route(
            "/api/service-status",
            get(handlers::status::get_service_status),
        )
        .route("/api/bridge-reload", post(handlers::bridge::reload_env))
        .route("/api/restart", post(handlers::bridge::restart))
        .route(
            "/api/re-queue-stuck-movies",
            post(handlers::bridge::requeue_stuck_movies),
        )
        .route(
            "/api/bridge-refresh-tasks",
            post(handlers::bridge::refresh_tasks),
        )
        .route(
            "/api/retrigger-media/:id",
            post(handlers::bridge::retrigger_media),
        )
        .route(
            "/api/retrigger-media-bulk",
            post(handlers::bridge::retrigger_media_bulk),
        )
        // ========================================
        // TRAKT LISTS
        // ========================================
        .route(
            "/api/trakt-lists",
            get(handlers::bridge::list_trakt_lists),
        )
        // "history" is a static segment and takes priority over :id
        .route(
            "/api/trakt-lists/history",
            get(handlers::bridge::trakt_history),
        )
        .route(
            "/api/trakt-lists/history/:session_id/items",
            get(handlers::bridge::trakt_history_items),
        )
        .route(
            "/api/trakt-lists/:id",
            axum::routing::delete(handlers::bridge::delete_trakt_list),
        )
        .route(
            "/api/trakt-lists/:id/history",
            get(handlers::bridge::trakt_list_history),
        )
        .route(
            "/api/trakt-lists/:id/items",
            get(handlers::bridge::trakt_list_items),
        )
        .with_state(state)
}

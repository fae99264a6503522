//! Settings handlers: stored download defaults and executor maintenance.

use crate::api::AppState;
use crate::db::{Settings, SettingsUpdate};
use crate::error::ApiError;
use crate::types::ExecutorUpdate;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// GET /settings - Stored defaults and cached executor version
#[utoipa::path(
    get,
    path = "/api/v1/settings",
    tag = "settings",
    responses(
        (status = 200, description = "Current settings", body = Settings),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn get_settings(State(state): State<AppState>) -> Response {
    match state.downloader.db.settings().await {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to read settings");
            e.into_response()
        }
    }
}

/// PUT /settings - Update stored defaults
///
/// Fields left out of the body keep their stored value.
#[utoipa::path(
    put,
    path = "/api/v1/settings",
    tag = "settings",
    request_body = SettingsUpdate,
    responses(
        (status = 200, description = "Settings updated", body = Settings),
        (status = 400, description = "Invalid value", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn update_settings(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Response {
    match state.downloader.db.update_settings(&update).await {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /executor/version - Version reported by the executor
#[utoipa::path(
    get,
    path = "/api/v1/executor/version",
    tag = "settings",
    responses(
        (status = 200, description = "Executor version (cached value if the executor is unavailable)")
    )
)]
pub async fn get_executor_version(State(state): State<AppState>) -> Response {
    match state.downloader.executor_version().await {
        Ok(version) => (
            StatusCode::OK,
            Json(json!({
                "executor": state.downloader.executor_name(),
                "version": version,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /executor/update - Run the executor's self-update
#[utoipa::path(
    post,
    path = "/api/v1/executor/update",
    tag = "settings",
    responses(
        (status = 200, description = "Update finished", body = ExecutorUpdate),
        (status = 501, description = "No executor available", body = ApiError),
        (status = 502, description = "Executor failed", body = ApiError)
    )
)]
pub async fn update_executor(State(state): State<AppState>) -> Response {
    match state.downloader.update_executor().await {
        Ok(update) => (StatusCode::OK, Json(update)).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Executor update failed");
            e.into_response()
        }
    }
}

//! Download handlers: named and quick lanes, cancellation, engine state.

use super::{CancelResponse, DownloadAccepted, ShareRequest, StartDownloadRequest};
use crate::api::AppState;
use crate::downloader::{RejectReason, StartOutcome};
use crate::error::ApiError;
use crate::types::{DownloadOptions, Lane, TaskId};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// 400 for options carrying a quality tier outside 0..=7
fn reject_unknown_quality(options: Option<&DownloadOptions>) -> Option<Response> {
    let quality = options?.video_quality;
    if quality.is_known() {
        return None;
    }
    Some(
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::validation(format!(
                "video_quality must be between 0 and 7, got {}",
                quality.0
            ))),
        )
            .into_response(),
    )
}

/// POST /downloads - Set the pending URL and start the named download
#[utoipa::path(
    post,
    path = "/api/v1/downloads",
    tag = "downloads",
    request_body = StartDownloadRequest,
    responses(
        (status = 202, description = "Download accepted", body = DownloadAccepted),
        (status = 400, description = "Blank URL or unknown quality tier", body = ApiError),
        (status = 409, description = "A named download is already running", body = ApiError),
        (status = 503, description = "Shutting down", body = ApiError)
    )
)]
pub async fn start_download(
    State(state): State<AppState>,
    Json(request): Json<StartDownloadRequest>,
) -> Response {
    if let Some(rejection) = reject_unknown_quality(request.options.as_ref()) {
        return rejection;
    }

    // Rejected while busy before the pending URL is replaced
    if !state.downloader.can_start() {
        return (
            StatusCode::CONFLICT,
            Json(ApiError::conflict("a download is already in progress")),
        )
            .into_response();
    }

    state.downloader.set_pending_url(request.url.trim());

    match state
        .downloader
        .start_named_download_with(request.options)
    {
        StartOutcome::Started(_handle) => (
            StatusCode::ACCEPTED,
            Json(DownloadAccepted {
                lane: Lane::Named,
                url: state.downloader.pending_url(),
            }),
        )
            .into_response(),
        StartOutcome::Rejected(RejectReason::BlankUrl) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::validation("url must not be blank")),
        )
            .into_response(),
        StartOutcome::Rejected(RejectReason::Busy) => (
            StatusCode::CONFLICT,
            Json(ApiError::conflict("a download is already in progress")),
        )
            .into_response(),
        StartOutcome::Rejected(RejectReason::ShuttingDown) => {
            crate::error::Error::ShuttingDown.into_response()
        }
    }
}

/// POST /share - Start a quick download from shared text
#[utoipa::path(
    post,
    path = "/api/v1/share",
    tag = "downloads",
    request_body = ShareRequest,
    responses(
        (status = 202, description = "Download accepted", body = DownloadAccepted),
        (status = 400, description = "Unknown quality tier", body = ApiError),
        (status = 422, description = "No URL found in the shared text", body = ApiError),
        (status = 503, description = "Shutting down", body = ApiError)
    )
)]
pub async fn share_download(
    State(state): State<AppState>,
    Json(request): Json<ShareRequest>,
) -> Response {
    if let Some(rejection) = reject_unknown_quality(request.options.as_ref()) {
        return rejection;
    }

    let Some(url) = crate::share::extract_url(&request.text) else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiError::new("no_url", "no http(s) URL found in shared text")),
        )
            .into_response();
    };

    match state
        .downloader
        .download_from_shared(url.clone(), request.options)
    {
        Ok(_handle) => (
            StatusCode::ACCEPTED,
            Json(DownloadAccepted {
                lane: Lane::Quick,
                url,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /tasks/:id/cancel - Cancel a running download
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{id}/cancel",
    tag = "downloads",
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Cancel processed (idempotent)", body = CancelResponse)
    )
)]
pub async fn cancel_task(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let canceled = state.downloader.cancel(&TaskId::from(id));
    (StatusCode::OK, Json(CancelResponse { canceled }))
}

/// GET /state - Engine status
#[utoipa::path(
    get,
    path = "/api/v1/state",
    tag = "downloads",
    responses(
        (status = 200, description = "Engine status", body = crate::types::EngineStatus)
    )
)]
pub async fn get_state(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.downloader.status()))
}

/// GET /task - The named task
#[utoipa::path(
    get,
    path = "/api/v1/task",
    tag = "downloads",
    responses(
        (status = 200, description = "Current named task", body = crate::types::TaskState)
    )
)]
pub async fn get_task(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.downloader.task()))
}

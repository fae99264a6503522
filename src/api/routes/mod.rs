//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`downloads`] - Named and quick downloads, cancellation, engine state
//! - [`settings`] - Stored defaults and executor maintenance
//! - [`system`] - Health, events, OpenAPI, shutdown

use crate::types::DownloadOptions;
use serde::{Deserialize, Serialize};

mod downloads;
mod settings;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use downloads::*;
pub use settings::*;
pub use system::*;

// ============================================================================
// Request/Response Types (shared across handlers)
// ============================================================================

/// Request body for POST /downloads
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StartDownloadRequest {
    /// URL to download; becomes the pending URL
    pub url: String,
    /// Options for this download (stored defaults when omitted)
    #[serde(default)]
    pub options: Option<DownloadOptions>,
}

/// Request body for POST /share
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ShareRequest {
    /// Free text as shared by another application; the first http(s) URL is used
    pub text: String,
    /// Options for this download (stored defaults when omitted)
    #[serde(default)]
    pub options: Option<DownloadOptions>,
}

/// Response for accepted downloads
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct DownloadAccepted {
    /// Lane the download runs in
    pub lane: crate::types::Lane,
    /// URL being downloaded
    pub url: String,
}

/// Response for POST /tasks/:id/cancel
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CancelResponse {
    /// Whether a running process was terminated
    pub canceled: bool,
}

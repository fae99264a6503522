//! Error types for vidmax-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (Download, Database)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes
//!
//! The download taxonomy lives in [`DownloadError`]. The orchestration engine is the
//! only place that classifies these outcomes; [`Error::is_canceled`] is the check it
//! uses to keep user-initiated cancellation out of error reporting.

use crate::types::TaskId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for vidmax-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for vidmax-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "video_dir")
        key: Option<String>,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Download pipeline error (resolution, transfer, cancellation)
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shutdown in progress - not accepting new downloads
    #[error("shutdown in progress: not accepting new downloads")]
    ShuttingDown,

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// External executor failed to run or exited unsuccessfully
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Operation not supported (missing binary, not implemented, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),
}

impl Error {
    /// Whether this error is a user-initiated cancellation
    ///
    /// Cancellation is an expected terminal state. Callers use this to suppress
    /// error notifications and failure logging.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Error::Download(DownloadError::Canceled { .. }))
    }
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// Download-related errors
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Metadata step failed (network, malformed response, executor crash, timeout)
    #[error("failed to resolve {url}: {reason}")]
    ResolutionFailed {
        /// The URL that was being resolved
        url: String,
        /// The underlying cause
        reason: String,
    },

    /// Descriptor lacks both an original URL and a page URL
    #[error("video {id} has no usable source URL")]
    NoSourceUrl {
        /// The executor-assigned video id
        id: String,
    },

    /// Transfer or extraction failed after metadata succeeded
    #[error("download {task_id} failed: {reason}")]
    ExecutionFailed {
        /// The task whose transfer failed
        task_id: TaskId,
        /// The underlying cause
        reason: String,
    },

    /// The executor process was terminated by a cancel request
    #[error("download {task_id} was canceled")]
    Canceled {
        /// The task that was canceled
        task_id: TaskId,
    },
}

/// API error response format
///
/// ```json
/// {
///   "error": {
///     "code": "resolution_failed",
///     "message": "failed to resolve https://example.com/v: ...",
///     "details": { "url": "https://example.com/v" }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "conflict", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create a "conflict" error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("conflict", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            Error::Config { .. } => 400,

            Error::Download(e) => match e {
                DownloadError::ResolutionFailed { .. } => 422,
                DownloadError::NoSourceUrl { .. } => 422,
                DownloadError::ExecutionFailed { .. } => 502,
                DownloadError::Canceled { .. } => 409,
            },

            Error::ShuttingDown => 503,
            Error::NotSupported(_) => 501,
            Error::ExternalTool(_) => 502,

            Error::Database(_)
            | Error::Sqlx(_)
            | Error::Io(_)
            | Error::Network(_)
            | Error::Serialization(_)
            | Error::ApiServerError(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Database(_) | Error::Sqlx(_) => "database_error",
            Error::Download(e) => match e {
                DownloadError::ResolutionFailed { .. } => "resolution_failed",
                DownloadError::NoSourceUrl { .. } => "no_source_url",
                DownloadError::ExecutionFailed { .. } => "execution_failed",
                DownloadError::Canceled { .. } => "canceled",
            },
            Error::Io(_) => "io_error",
            Error::ShuttingDown => "shutting_down",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::ExternalTool(_) => "external_tool_error",
            Error::NotSupported(_) => "not_supported",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({ "key": key })),
            Error::Download(DownloadError::ResolutionFailed { url, .. }) => {
                Some(serde_json::json!({ "url": url }))
            }
            Error::Download(DownloadError::NoSourceUrl { id }) => {
                Some(serde_json::json!({ "video_id": id }))
            }
            Error::Download(DownloadError::ExecutionFailed { task_id, .. })
            | Error::Download(DownloadError::Canceled { task_id }) => {
                Some(serde_json::json!({ "task_id": task_id }))
            }
            _ => None,
        };

        match details {
            Some(details) => ApiError::with_details(code, message, details),
            None => ApiError::new(code, message),
        }
    }
}

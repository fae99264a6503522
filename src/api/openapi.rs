//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the vidmax-dl REST API using utoipa for
//! compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the vidmax-dl REST API
///
/// The document is served at:
/// - `/api/v1/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "vidmax-dl REST API",
        version = "0.1.0",
        description = "REST API for starting, cancelling and observing yt-dlp downloads",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:6790/api/v1", description = "Local development server")
    ),
    paths(
        // Downloads
        crate::api::routes::start_download,
        crate::api::routes::share_download,
        crate::api::routes::cancel_task,
        crate::api::routes::get_state,
        crate::api::routes::get_task,

        // Settings
        crate::api::routes::get_settings,
        crate::api::routes::update_settings,
        crate::api::routes::get_executor_version,
        crate::api::routes::update_executor,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
        crate::api::routes::shutdown,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::TaskId,
        crate::types::NotificationId,
        crate::types::VideoQuality,
        crate::types::DownloadOptions,
        crate::types::VideoDescriptor,
        crate::types::EngineState,
        crate::types::EngineStatus,
        crate::types::TaskState,
        crate::types::Lane,
        crate::types::OpenTarget,
        crate::types::Event,
        crate::types::WebhookPayload,
        crate::types::UpdateStatus,
        crate::types::ExecutorUpdate,

        // Settings
        crate::db::Settings,
        crate::db::SettingsUpdate,

        // Config types from config.rs
        crate::config::Config,
        crate::config::DownloadConfig,
        crate::config::ExecutorConfig,
        crate::config::PersistenceConfig,
        crate::config::NotificationConfig,
        crate::config::WebhookConfig,
        crate::config::WebhookEvent,
        crate::config::ApiConfig,

        // API request/response types
        crate::api::routes::StartDownloadRequest,
        crate::api::routes::ShareRequest,
        crate::api::routes::DownloadAccepted,
        crate::api::routes::CancelResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "downloads", description = "Downloads - Start named and quick downloads, cancel tasks, observe state"),
        (name = "settings", description = "Settings - Stored download defaults and executor maintenance"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec, events, shutdown"),
    )
)]
pub struct ApiDoc;

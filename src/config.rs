//! Configuration types for vidmax-dl

use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Download destination configuration
///
/// Groups the directories the executor writes into. Used as a nested sub-config
/// within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Destination for video downloads (default: "downloads")
    #[serde(default = "default_video_dir")]
    pub video_dir: PathBuf,

    /// Destination for audio-only downloads (default: "downloads/Audio")
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,

    /// Scratch directory for partial files (default: "downloads/tmp")
    ///
    /// Receives a `.nomedia` marker so media indexers skip partial files.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Capacity of the per-task progress channel (default: 64)
    ///
    /// When the consumer falls behind, the executor's reader waits rather than dropping
    /// emissions, so every progress line is still delivered in order.
    #[serde(default = "default_progress_channel_capacity")]
    pub progress_channel_capacity: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            video_dir: default_video_dir(),
            audio_dir: default_audio_dir(),
            temp_dir: default_temp_dir(),
            progress_channel_capacity: default_progress_channel_capacity(),
        }
    }
}

/// External executor configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ExecutorConfig {
    /// Path to the yt-dlp compatible executable (auto-detected if None)
    #[serde(default)]
    pub binary_path: Option<PathBuf>,

    /// Whether to search PATH for the executor if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Value passed to `--downloader` when acceleration is requested (default: "aria2c")
    #[serde(default = "default_accelerated_downloader")]
    pub accelerated_downloader: String,

    /// Upper bound for a metadata-only invocation (default: 120 seconds)
    #[serde(default = "default_metadata_timeout", with = "duration_serde")]
    pub metadata_timeout: Duration,

    /// Socket timeout handed to the executor during metadata resolution (default: 30)
    #[serde(default = "default_socket_timeout_secs")]
    pub socket_timeout_secs: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            binary_path: None,
            search_path: true,
            accelerated_downloader: default_accelerated_downloader(),
            metadata_timeout: default_metadata_timeout(),
            socket_timeout_secs: default_socket_timeout_secs(),
        }
    }
}

/// Settings database configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PersistenceConfig {
    /// Database path (default: "./vidmax-dl.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Notification configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct NotificationConfig {
    /// Webhook configurations
    #[serde(default)]
    pub webhooks: Vec<WebhookConfig>,
}

/// Webhook configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookConfig {
    /// URL to POST to
    pub url: String,

    /// Events that trigger this webhook
    pub events: Vec<WebhookEvent>,

    /// Optional authentication header value
    #[serde(default)]
    pub auth_header: Option<String>,

    /// Timeout for webhook requests (default: 30 seconds)
    #[serde(default = "default_webhook_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

/// Webhook trigger event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum WebhookEvent {
    /// Triggered when a download completes successfully
    OnComplete,
    /// Triggered when a download fails (cancellation never triggers it)
    OnFailed,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:6790)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// Main configuration for the [`Downloader`](crate::Downloader)
///
/// Fields are organized into sub-configs:
/// - [`download`](DownloadConfig): destination and scratch directories
/// - [`executor`](ExecutorConfig): executor discovery and invocation limits
/// - [`persistence`](PersistenceConfig): settings database
/// - [`notifications`](NotificationConfig): webhooks
/// - [`api`](ApiConfig): REST API server
///
/// `download` and `notifications` are flattened, so their fields appear at the top level
/// of the serialized form.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Download directories
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// Executor settings
    #[serde(default)]
    pub executor: ExecutorConfig,

    /// Settings database
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Webhooks
    #[serde(flatten)]
    pub notifications: NotificationConfig,

    /// REST API
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Video destination directory
    pub fn video_dir(&self) -> &PathBuf {
        &self.download.video_dir
    }

    /// Audio destination directory
    pub fn audio_dir(&self) -> &PathBuf {
        &self.download.audio_dir
    }

    /// Scratch directory
    pub fn temp_dir(&self) -> &PathBuf {
        &self.download.temp_dir
    }

    /// Build a config rooted at a single base directory
    ///
    /// Mirrors the default layout: videos in `base`, audio in `base/Audio`,
    /// partial files in `base/tmp`, and the settings database next to them.
    pub fn rooted_at(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            download: DownloadConfig {
                video_dir: base.clone(),
                audio_dir: base.join("Audio"),
                temp_dir: base.join("tmp"),
                progress_channel_capacity: default_progress_channel_capacity(),
            },
            persistence: PersistenceConfig {
                database_path: base.join("vidmax-dl.db"),
            },
            ..Default::default()
        }
    }
}

// Default value functions
fn default_video_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("downloads/Audio")
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("downloads/tmp")
}

fn default_progress_channel_capacity() -> usize {
    64
}

fn default_true() -> bool {
    true
}

fn default_accelerated_downloader() -> String {
    "aria2c".to_string()
}

fn default_metadata_timeout() -> Duration {
    Duration::from_secs(120)
}

fn default_socket_timeout_secs() -> u64 {
    30
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./vidmax-dl.db")
}

fn default_webhook_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 6790))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

//! Core types for vidmax-dl

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Deterministic identity correlating a request, its progress stream, and its cancel control
///
/// Derived from the executor-assigned video id and a hash of the [`DownloadOptions`], so the
/// same (video, options) pair always maps to the same task id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Derive the task id for a video and a set of options
    pub fn derive(video_id: &str, options: &DownloadOptions) -> Self {
        Self(format!("{}-{:08x}", video_id, options.fingerprint()))
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the notification that tracks a task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct NotificationId(pub u32);

impl NotificationId {
    /// Derive the notification id owned by a task
    pub fn for_task(task_id: &TaskId) -> Self {
        let digest = Sha256::digest(task_id.as_str().as_bytes());
        Self(u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]) & 0x7fff_ffff)
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Video quality tier
///
/// 0 = best available, 1..=6 = resolution ceilings from 2160p down to 360p,
/// 7 = smallest available. Values outside the range behave like 0 but are rejected
/// at the API boundary.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct VideoQuality(pub u8);

impl VideoQuality {
    /// Best available quality (no format sorting)
    pub const BEST: Self = Self(0);
    /// Smallest available quality
    pub const LOWEST: Self = Self(7);

    /// Build a tier from a stored integer, falling back to best for unknown values
    pub fn from_i64(value: i64) -> Self {
        match u8::try_from(value) {
            Ok(tier) if Self(tier).is_known() => Self(tier),
            _ => Self::BEST,
        }
    }

    /// Whether this is one of the tiers 0..=7
    pub fn is_known(&self) -> bool {
        self.0 <= Self::LOWEST.0
    }

    /// Format-sort directive passed to the executor via `-S`, if any
    ///
    /// Tier 7 maps to `+res` (ascending resolution), which is how "lowest" is expressed.
    pub fn sort_directive(&self) -> Option<&'static str> {
        match self.0 {
            1 => Some("res:2160"),
            2 => Some("res:1440"),
            3 => Some("res:1080"),
            4 => Some("res:720"),
            5 => Some("res:480"),
            6 => Some("res:360"),
            7 => Some("+res"),
            _ => None,
        }
    }

    /// Human-readable label for settings screens
    pub fn label(&self) -> &'static str {
        match self.0 {
            1 => "2160p",
            2 => "1440p",
            3 => "1080p",
            4 => "720p",
            5 => "480p",
            6 => "360p",
            7 => "lowest",
            _ => "best",
        }
    }
}

/// Options for a single download request
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct DownloadOptions {
    /// Delegate the transfer to the accelerated external downloader (aria2c)
    #[serde(default)]
    pub use_accelerated_downloader: bool,

    /// Video quality tier (0 = best, 7 = lowest)
    #[serde(default)]
    pub video_quality: VideoQuality,

    /// Extract audio only
    #[serde(default)]
    pub extract_audio: bool,
}

impl DownloadOptions {
    /// Stable 32-bit fingerprint of these options
    pub fn fingerprint(&self) -> u32 {
        let mut hasher = Sha256::new();
        hasher.update([
            self.use_accelerated_downloader as u8,
            self.video_quality.0,
            self.extract_audio as u8,
        ]);
        let digest = hasher.finalize();
        u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
    }
}

/// Video metadata produced by the executor in metadata-only mode
///
/// Unknown fields in the executor's JSON are ignored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VideoDescriptor {
    /// Executor-assigned video id
    #[serde(default)]
    pub id: String,

    /// Video title
    #[serde(default)]
    pub title: String,

    /// Executor-predicted output filename
    #[serde(default)]
    pub filename: Option<String>,

    /// Canonical page URL of the video
    #[serde(default, rename = "webpage_url")]
    pub page_url: Option<String>,

    /// URL as originally submitted
    #[serde(default)]
    pub original_url: Option<String>,

    /// Video codec; `"none"` signals an audio-only source
    #[serde(default, rename = "vcodec")]
    pub video_codec: Option<String>,
}

impl VideoDescriptor {
    /// URL handed to the executor for the transfer, preferring the original URL
    pub fn source_url(&self) -> Option<&str> {
        self.original_url
            .as_deref()
            .or(self.page_url.as_deref())
            .filter(|url| !url.is_empty())
    }

    /// Whether the source carries no video stream
    pub fn is_audio_only_source(&self) -> bool {
        self.video_codec.as_deref() == Some("none")
    }

    /// Name fragment used to find produced files after the transfer
    pub fn discovery_key(&self) -> &str {
        match self.filename.as_deref() {
            Some(filename) if !filename.is_empty() => filename,
            _ => &self.title,
        }
    }
}

/// Engine lifecycle state for the named-download lane
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    /// No named download in flight
    #[default]
    Idle,
    /// A named download has been accepted and has not settled yet
    Downloading,
}

/// State of the single named task
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaskState {
    /// Page URL of the video being downloaded
    pub url: String,
    /// Video title
    pub title: String,
    /// Task id (empty when no task has started)
    pub id: String,
    /// Progress percentage (0.0 to 100.0)
    pub progress: f32,
    /// Raw status line; `Some("")` clears it, `None` means no active task
    pub progress_text: Option<String>,
}

/// Which lane a download runs in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    /// The single UI-tracked download mirrored into [`TaskState`]
    Named,
    /// A fire-and-forget download from a share action
    Quick,
}

/// A single normalized progress emission from the executor
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProgressEvent {
    /// Progress percentage (0.0 to 100.0)
    pub percent: f32,
    /// Current transfer rate in bytes per second (0 when unknown)
    pub rate_bps: u64,
    /// Raw status line as printed by the executor
    pub line: String,
}

/// File a finished download can be opened with
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OpenTarget {
    /// Absolute path to an existing file
    pub path: PathBuf,
}

/// Event emitted by the downloader
///
/// Notifications, state transitions and failures are all published on the event
/// channel; see [`crate::Downloader::subscribe`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A notification was created or its progress changed
    NotificationProgress {
        /// Notification id
        notification_id: NotificationId,
        /// Title shown on the notification
        title: String,
        /// Progress percentage (0 to 100)
        percent: u8,
        /// Task the cancel action targets, if cancellable
        #[serde(skip_serializing_if = "Option::is_none")]
        task_id: Option<TaskId>,
        /// Status line
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },

    /// A notification reached its terminal form
    NotificationFinished {
        /// Notification id
        notification_id: NotificationId,
        /// Title shown on the notification
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        /// Body text
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        /// File to open from the notification
        #[serde(skip_serializing_if = "Option::is_none")]
        open_target: Option<OpenTarget>,
    },

    /// A notification was dismissed
    NotificationCanceled {
        /// Notification id
        notification_id: NotificationId,
    },

    /// The named lane changed state
    StateChanged {
        /// New state
        state: EngineState,
    },

    /// The busy signal flipped
    BusyChanged {
        /// Whether any download (named or quick) is active
        busy: bool,
    },

    /// A download settled successfully
    DownloadComplete {
        /// Task id
        task_id: TaskId,
        /// Lane the download ran in
        lane: Lane,
        /// Files discovered in the destination directory
        files: Vec<PathBuf>,
    },

    /// A download failed (resolution or transfer)
    DownloadFailed {
        /// Task id, when resolution got far enough to derive one
        #[serde(skip_serializing_if = "Option::is_none")]
        task_id: Option<TaskId>,
        /// Lane the download ran in
        lane: Lane,
        /// URL that was requested
        url: String,
        /// Error message
        error: String,
    },

    /// A task was canceled by request
    TaskCanceled {
        /// Task id
        task_id: TaskId,
    },

    /// Webhook delivery failed
    WebhookFailed {
        /// Webhook URL
        url: String,
        /// Error message
        error: String,
    },

    /// Downloader is shutting down
    Shutdown,
}

/// Payload sent to webhook endpoints
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookPayload {
    /// Event type (complete, failed)
    pub event: String,

    /// Task id
    pub task_id: TaskId,

    /// Video title
    pub title: String,

    /// Lane the download ran in
    pub lane: Lane,

    /// Files produced (for complete downloads)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PathBuf>,

    /// Error message (for failed downloads)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Timestamp of the event (Unix timestamp in seconds)
    pub timestamp: i64,
}

/// Outcome of an executor self-update
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStatus {
    /// A new version was installed
    Done,
    /// The installed version is already current
    AlreadyUpToDate,
}

/// Result of [`Downloader::update_executor`](crate::Downloader::update_executor)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExecutorUpdate {
    /// Whether anything was installed
    pub status: UpdateStatus,
    /// Version reported after the update (also cached in settings)
    pub version: String,
}

/// Snapshot of the engine for status queries
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EngineStatus {
    /// Named-lane state
    pub state: EngineState,
    /// Whether any download is active
    pub busy: bool,
    /// Quick downloads in flight
    pub quick_downloads: usize,
    /// URL the next named download starts from
    pub pending_url: String,
}

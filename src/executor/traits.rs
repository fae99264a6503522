//! Traits and types for invoking the external extractor

use crate::types::{ProgressEvent, TaskId, UpdateStatus};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A single structured invocation of the executor
///
/// Arguments are kept in insertion order; the URL is always passed last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecRequest {
    /// Target URL
    pub url: String,
    /// Flags and option/value pairs, in order
    pub args: Vec<String>,
    /// Task the process is registered under, if it can be canceled
    pub process_id: Option<TaskId>,
    /// Upper bound on the process lifetime
    pub timeout: Option<Duration>,
}

impl ExecRequest {
    /// Start a request for `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            args: Vec::new(),
            process_id: None,
            timeout: None,
        }
    }

    /// Append a bare flag
    pub fn flag(mut self, name: &str) -> Self {
        self.args.push(name.to_string());
        self
    }

    /// Append an option followed by its value
    pub fn option(mut self, name: &str, value: impl Into<String>) -> Self {
        self.args.push(name.to_string());
        self.args.push(value.into());
        self
    }

    /// Register the process under a task id
    pub fn with_process_id(mut self, task_id: TaskId) -> Self {
        self.process_id = Some(task_id);
        self
    }

    /// Bound the process lifetime
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Whether a bare flag or option name is present
    pub fn has_flag(&self, name: &str) -> bool {
        self.args.iter().any(|arg| arg == name)
    }

    /// Every value given for an option, in order
    pub fn option_values(&self, name: &str) -> Vec<&str> {
        self.args
            .windows(2)
            .filter(|pair| pair[0] == name)
            .map(|pair| pair[1].as_str())
            .collect()
    }

    /// Full argument vector handed to the process
    pub fn to_args(&self) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(self.url.clone());
        args
    }
}

/// Captured output of a finished invocation
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct ExecOutput {
    /// Standard output, minus lines consumed as progress
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Process exit code (None if killed by a signal)
    pub exit_code: Option<i32>,
}

/// Trait for the yt-dlp compatible executor
///
/// Implementations run the external binary (or a stand-in for tests) and report
/// progress while it runs.
///
/// # Errors
///
/// `execute` returns:
/// - `Error::Download(DownloadError::Canceled)` when `cancel` fires before exit
/// - `Error::ExternalTool` for spawn failures, timeouts and non-zero exits
/// - `Error::NotSupported` when no executor is available
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run the executor with `request`
    ///
    /// When `progress` is given, every progress line is forwarded in emission order. The
    /// sender is awaited, so a slow consumer applies backpressure instead of losing lines.
    async fn execute(
        &self,
        request: &ExecRequest,
        progress: Option<mpsc::Sender<ProgressEvent>>,
        cancel: CancellationToken,
    ) -> crate::Result<ExecOutput>;

    /// Version string reported by the executor
    async fn version(&self) -> crate::Result<String>;

    /// Run the executor's self-update
    async fn update(&self) -> crate::Result<UpdateStatus>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

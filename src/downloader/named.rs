//! The named lane: the single UI-tracked download and its state queries.

use crate::error::Result;
use crate::types::{DownloadOptions, EngineState, EngineStatus, Event, Lane, TaskState};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::Downloader;

/// Why a named download was not started
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// A named download is already in flight
    Busy,
    /// The pending URL is blank
    BlankUrl,
    /// The downloader is shutting down
    ShuttingDown,
}

/// Result of [`Downloader::start_named_download`]
///
/// A rejected start leaves the engine state and the task state untouched.
#[derive(Debug)]
pub enum StartOutcome {
    /// The download was accepted; the handle resolves when it settles
    Started(JoinHandle<Result<Vec<PathBuf>>>),
    /// The download was not started
    Rejected(RejectReason),
}

impl StartOutcome {
    /// Whether the start was accepted
    pub fn is_started(&self) -> bool {
        matches!(self, StartOutcome::Started(_))
    }
}

impl Downloader {
    /// Start a named download from the pending URL using the stored default options
    ///
    /// No-op unless the engine is Idle and the pending URL is non-blank. The check and the
    /// transition to Downloading happen atomically, so concurrent callers cannot both be
    /// accepted.
    pub fn start_named_download(&self) -> StartOutcome {
        self.start_named_download_with(None)
    }

    /// Start a named download with explicit options (`None` reads stored defaults)
    pub fn start_named_download_with(&self, options: Option<DownloadOptions>) -> StartOutcome {
        if !self.accepting_new.load(Ordering::SeqCst) {
            tracing::debug!("named download rejected: shutting down");
            return StartOutcome::Rejected(RejectReason::ShuttingDown);
        }

        let url = self.store.pending_url();
        if url.trim().is_empty() {
            tracing::debug!("named download rejected: blank URL");
            return StartOutcome::Rejected(RejectReason::BlankUrl);
        }

        if !self.store.try_begin_named() {
            tracing::debug!(url = %url, "named download rejected: already downloading");
            return StartOutcome::Rejected(RejectReason::Busy);
        }

        tracing::info!(url = %url, "named download accepted");

        let downloader = self.clone();
        StartOutcome::Started(tokio::spawn(async move {
            downloader.run_named(url, options).await
        }))
    }

    async fn run_named(
        &self,
        url: String,
        options: Option<DownloadOptions>,
    ) -> Result<Vec<PathBuf>> {
        let options = match options {
            Some(options) => options,
            None => self.default_options().await,
        };

        let descriptor = match self.resolver.resolve(&url, &options).await {
            Ok(descriptor) => descriptor,
            Err(e) => {
                tracing::error!(url = %url, error = %e, "failed to resolve named download");
                self.store.finish_named();
                self.emit_event(Event::DownloadFailed {
                    task_id: None,
                    lane: Lane::Named,
                    url,
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        self.run_pipeline(descriptor, options, Lane::Named).await
    }

    /// Set the URL the next named download starts from
    pub fn set_pending_url(&self, url: impl Into<String>) {
        self.store.set_pending_url(url.into());
    }

    /// The URL the next named download starts from
    pub fn pending_url(&self) -> String {
        self.store.pending_url()
    }

    /// Current named-lane state
    pub fn state(&self) -> EngineState {
        self.store.engine_state()
    }

    /// Whether a named download can be started right now
    pub fn can_start(&self) -> bool {
        self.state() == EngineState::Idle
    }

    /// Snapshot of the named task
    pub fn task(&self) -> TaskState {
        self.store.task()
    }

    /// Observe every named-task update, in commit order
    pub fn subscribe_task(&self) -> mpsc::UnboundedReceiver<TaskState> {
        self.store.subscribe_task()
    }

    /// Observe every named-lane state transition
    pub fn subscribe_state(&self) -> mpsc::UnboundedReceiver<EngineState> {
        self.store.subscribe_engine()
    }

    /// Whether any download (named or quick) is active
    pub fn is_busy(&self) -> bool {
        self.store.is_busy()
    }

    /// Snapshot of the engine for status queries
    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            state: self.store.engine_state(),
            busy: self.store.is_busy(),
            quick_downloads: self.store.quick_count(),
            pending_url: self.store.pending_url(),
        }
    }
}

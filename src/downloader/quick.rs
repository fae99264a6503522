//! The quick lane: fire-and-forget downloads started from share actions.

use crate::error::{Error, Result};
use crate::state::TaskStateStore;
use crate::types::{DownloadOptions, Event, Lane};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::task::JoinHandle;

use super::Downloader;

/// Holds one slot of the quick-download counter for as long as it lives
struct QuickLaneGuard {
    store: Arc<TaskStateStore>,
}

impl QuickLaneGuard {
    fn acquire(store: Arc<TaskStateStore>) -> Self {
        store.increment_quick();
        Self { store }
    }
}

impl Drop for QuickLaneGuard {
    fn drop(&mut self) {
        self.store.decrement_quick();
    }
}

impl Downloader {
    /// Download `url` in the quick lane
    ///
    /// The task state is never touched; progress only reaches notifications. Any number of
    /// quick downloads may run alongside each other and alongside the named download. The
    /// counter is incremented before this returns and decremented when the download
    /// settles, so the busy signal covers the whole run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShuttingDown`] if the downloader no longer accepts work. Download
    /// failures are reported through the returned handle.
    pub fn download_from_shared(
        &self,
        url: impl Into<String>,
        options: Option<DownloadOptions>,
    ) -> Result<JoinHandle<Result<Vec<PathBuf>>>> {
        if !self.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let url = url.into();
        let guard = QuickLaneGuard::acquire(self.store.clone());
        tracing::info!(url = %url, "quick download accepted");

        let downloader = self.clone();
        Ok(tokio::spawn(async move {
            let _guard = guard;
            downloader.run_quick(url, options).await
        }))
    }

    async fn run_quick(
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
                tracing::error!(url = %url, error = %e, "failed to resolve quick download");
                self.emit_event(Event::DownloadFailed {
                    task_id: None,
                    lane: Lane::Quick,
                    url,
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        self.run_pipeline(descriptor, options, Lane::Quick).await
    }
}

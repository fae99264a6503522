//! Shutdown coordination and executor maintenance.

use crate::error::Result;
use crate::types::{Event, ExecutorUpdate};
use std::sync::atomic::Ordering;
use std::time::Duration;

use super::Downloader;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

impl Downloader {
    /// Gracefully shut down the downloader
    ///
    /// 1. Stops accepting new downloads
    /// 2. Cancels every running executor process
    /// 3. Waits (up to 30 seconds) for all downloads to settle
    /// 4. Emits [`Event::Shutdown`]
    ///
    /// Settings are written through as they change, so nothing needs persisting here.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        self.accepting_new.store(false, Ordering::SeqCst);
        tracing::info!("Stopped accepting new downloads");

        let canceled = self.transfer.registry().destroy_all();
        tracing::info!(canceled, "Canceled running downloads");

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, self.wait_for_idle()).await {
            Ok(()) => tracing::info!("All downloads settled"),
            Err(_) => tracing::warn!(
                "Timeout waiting for downloads to settle, proceeding with shutdown"
            ),
        }

        self.emit_event(Event::Shutdown);
        tracing::info!("Graceful shutdown complete");
        Ok(())
    }

    // Downloads still resolving metadata register their process after the first sweep,
    // so every poll sweeps the registry again.
    async fn wait_for_idle(&self) {
        loop {
            self.transfer.registry().destroy_all();
            if !self.store.is_busy() {
                return;
            }

            tracing::debug!(
                quick = self.store.quick_count(),
                state = ?self.store.engine_state(),
                "Waiting for downloads to settle"
            );
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Update the executor binary and cache the version it reports
    pub async fn update_executor(&self) -> Result<ExecutorUpdate> {
        let status = self.executor.update().await?;
        let version = self.executor.version().await?;
        self.db.set_executor_version(&version).await?;

        tracing::info!(status = ?status, version = %version, "executor updated");
        Ok(ExecutorUpdate { status, version })
    }

    /// Version reported by the executor, cached in settings
    ///
    /// Falls back to the cached value when the executor cannot be queried.
    pub async fn executor_version(&self) -> Result<Option<String>> {
        match self.executor.version().await {
            Ok(version) => {
                self.db.set_executor_version(&version).await?;
                Ok(Some(version))
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to query executor version");
                self.db.executor_version().await
            }
        }
    }
}

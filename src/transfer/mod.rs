//! Download executor adapter
//!
//! Turns a resolved [`VideoDescriptor`] plus [`DownloadOptions`] into an executor
//! invocation, registers it for cancellation, forwards its progress, and discovers the
//! produced files.

mod registry;
mod request;

pub use registry::{ProcessRegistry, Registration};
pub use request::{OUTPUT_TEMPLATE, TransferPaths, TransferPlan, build_plan, routes_to_audio};

use crate::executor::Executor;
use crate::media::{self, MediaScanner};
use crate::types::{DownloadOptions, ProgressEvent, TaskId, VideoDescriptor};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Executor adapter for transfers
#[derive(Clone)]
pub struct TransferAdapter {
    executor: Arc<dyn Executor>,
    paths: Arc<TransferPaths>,
    registry: ProcessRegistry,
    scanner: Arc<dyn MediaScanner>,
}

impl TransferAdapter {
    /// Create an adapter
    pub fn new(
        executor: Arc<dyn Executor>,
        paths: TransferPaths,
        scanner: Arc<dyn MediaScanner>,
    ) -> Self {
        Self {
            executor,
            paths: Arc::new(paths),
            registry: ProcessRegistry::new(),
            scanner,
        }
    }

    /// Registry of running invocations
    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    /// Run the transfer for `descriptor`
    ///
    /// The invocation is registered under `task_id` with `cancel`, so the caller observes
    /// a cancel request on its own clone of the token. Every progress emission is sent
    /// on `progress` in order, without debouncing. On success, returns the files under the
    /// destination whose path contains the descriptor's discovery key and hands them to
    /// the media scanner. Executor errors
    /// are returned unchanged.
    pub async fn download(
        &self,
        descriptor: &VideoDescriptor,
        options: &DownloadOptions,
        task_id: &TaskId,
        cancel: CancellationToken,
        progress: mpsc::Sender<ProgressEvent>,
    ) -> crate::Result<Vec<PathBuf>> {
        let plan = build_plan(descriptor, options, task_id, &self.paths)?;
        tracing::info!(
            task_id = %task_id,
            url = %plan.request.url,
            audio = plan.audio,
            destination = %plan.destination.display(),
            "starting transfer"
        );

        let registration = self.registry.register_token(task_id.clone(), cancel);
        let result = self
            .executor
            .execute(&plan.request, Some(progress), registration.token())
            .await;
        drop(registration);
        result?;

        let files = media::find_files(
            descriptor.discovery_key(),
            &plan.destination,
            &self.paths.temp_dir,
        )
        .await?;
        if !files.is_empty() {
            self.scanner.scan(&files);
        }
        tracing::debug!(task_id = %task_id, files = files.len(), "discovered downloaded files");
        Ok(files)
    }
}

//! Stand-in executor used when no binary is available

use super::traits::{ExecOutput, ExecRequest, Executor};
use crate::types::{ProgressEvent, UpdateStatus};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const UNAVAILABLE: &str = "downloading requires a yt-dlp compatible binary. \
     Configure executor.binary_path or ensure yt-dlp is in PATH.";

/// Executor that rejects every request with `Error::NotSupported`
///
/// Lets the downloader start (and its API report the problem) on hosts without yt-dlp.
/// Every download resolves to a `ResolutionFailed` error carrying this message.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableExecutor;

#[async_trait]
impl Executor for UnavailableExecutor {
    async fn execute(
        &self,
        _request: &ExecRequest,
        _progress: Option<mpsc::Sender<ProgressEvent>>,
        _cancel: CancellationToken,
    ) -> crate::Result<ExecOutput> {
        Err(crate::Error::NotSupported(UNAVAILABLE.into()))
    }

    async fn version(&self) -> crate::Result<String> {
        Err(crate::Error::NotSupported(UNAVAILABLE.into()))
    }

    async fn update(&self) -> crate::Result<UpdateStatus> {
        Err(crate::Error::NotSupported(UNAVAILABLE.into()))
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

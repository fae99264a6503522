//! Custom test assertions for integration tests

use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast;
use vidmax_dl::{Downloader, Event, TaskId};

/// How a download settled
#[derive(Debug)]
pub enum WaitResult {
    /// Download completed with these files
    Completed(Vec<PathBuf>),
    /// Download failed with error
    Failed(String),
    /// Download was canceled
    Canceled,
    /// Timeout waiting for a terminal event
    Timeout,
    /// Channel closed unexpectedly
    ChannelClosed,
}

/// Wait for the next terminal event on `events`
pub async fn wait_for_settlement(
    events: &mut broadcast::Receiver<Event>,
    timeout: Duration,
) -> WaitResult {
    let result = tokio::time::timeout(timeout, async {
        loop {
            match events.recv().await {
                Ok(Event::DownloadComplete { files, .. }) => return WaitResult::Completed(files),
                Ok(Event::DownloadFailed { error, .. }) => return WaitResult::Failed(error),
                Ok(Event::TaskCanceled { .. }) => return WaitResult::Canceled,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return WaitResult::ChannelClosed,
            }
        }
    })
    .await;

    result.unwrap_or(WaitResult::Timeout)
}

/// Wait until a cancellable progress notification arrives and return its task id
pub async fn wait_for_cancellable_task(
    events: &mut broadcast::Receiver<Event>,
    timeout: Duration,
) -> Option<TaskId> {
    tokio::time::timeout(timeout, async {
        loop {
            match events.recv().await {
                Ok(Event::NotificationProgress {
                    task_id: Some(task_id),
                    percent,
                    ..
                }) if percent > 0 => return Some(task_id),
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
    .await
    .ok()
    .flatten()
}

/// Wait until the downloader reports idle
pub async fn wait_for_idle(downloader: &Downloader, timeout: Duration) -> bool {
    tokio::time::timeout(timeout, async {
        while downloader.is_busy() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .is_ok()
}

use super::test_helpers::*;
use super::*;
use crate::error::{DownloadError, Error};
use crate::types::{
    DownloadOptions, EngineState, Lane, NotificationId, TaskId, TaskState, VideoQuality,
};
use tokio::sync::broadcast;

mod busy;
mod quick;

/// Task id the default test URL resolves to with default options
fn default_task_id() -> TaskId {
    TaskId::derive("abc123", &DownloadOptions::default())
}

fn drain_events(rx: &mut broadcast::Receiver<crate::types::Event>) -> Vec<crate::types::Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Wait until the transfer for `task_id` is registered and running in the executor
async fn wait_for_transfer(h: &TestHarness, task_id: &TaskId) {
    wait_until(|| {
        h.downloader.transfer.registry().contains(task_id)
            && h
                .executor
                .transfer_requests()
                .iter()
                .any(|request| request.process_id.as_ref() == Some(task_id))
    })
    .await;
}

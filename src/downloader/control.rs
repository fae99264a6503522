//! Download control: cancellation.

use crate::types::{NotificationId, TaskId};

use super::Downloader;

impl Downloader {
    /// Cancel the download registered under `task_id`
    ///
    /// Terminates the executor process and dismisses the task's notification. Idempotent:
    /// cancelling an unknown or already-settled task does nothing and returns `false`.
    /// The pipeline settles the canceled task itself; cancellation is never reported as
    /// an error.
    pub fn cancel(&self, task_id: &TaskId) -> bool {
        if !self.transfer.registry().destroy(task_id) {
            tracing::debug!(task_id = %task_id, "cancel ignored: no running process");
            return false;
        }

        tracing::info!(task_id = %task_id, "download cancel requested");
        self.cancel_notification(NotificationId::for_task(task_id));
        true
    }
}

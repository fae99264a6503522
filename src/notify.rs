//! Notification collaborator interface
//!
//! The downloader publishes every notification as an [`Event`](crate::types::Event) and
//! additionally forwards it to a [`Notifier`], which an embedding application implements to
//! drive OS notifications.

use crate::types::{NotificationId, OpenTarget, TaskId};

/// A progress notification (created on first call, updated afterwards)
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressNotification {
    /// Notification id
    pub notification_id: NotificationId,
    /// Title
    pub title: String,
    /// Progress percentage (0 to 100)
    pub percent: u8,
    /// Task the cancel action targets
    pub task_id: Option<TaskId>,
    /// Status line
    pub text: Option<String>,
}

/// Terminal form of a notification
#[derive(Debug, Clone, PartialEq)]
pub struct FinishNotification {
    /// Notification id
    pub notification_id: NotificationId,
    /// Title
    pub title: Option<String>,
    /// Body text
    pub text: Option<String>,
    /// File opened when the notification is tapped
    pub open_target: Option<OpenTarget>,
}

/// Receives notification updates from the downloader
///
/// Calls happen on the download task; implementations must not block.
pub trait Notifier: Send + Sync {
    /// Create or update a progress notification
    fn notify_progress(&self, notification: ProgressNotification);

    /// Turn a notification into its terminal form
    fn finish(&self, notification: FinishNotification);

    /// Dismiss a notification
    fn cancel(&self, notification_id: NotificationId);
}

/// Notifier for hosts that only consume the event stream
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNotifier;

impl Notifier for NoOpNotifier {
    fn notify_progress(&self, _notification: ProgressNotification) {}

    fn finish(&self, _notification: FinishNotification) {}

    fn cancel(&self, _notification_id: NotificationId) {}
}

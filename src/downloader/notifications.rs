//! Notification fan-out: every notification goes to the event stream and the notifier.

use crate::notify::{FinishNotification, ProgressNotification};
use crate::types::{Event, NotificationId};

use super::Downloader;

impl Downloader {
    pub(crate) fn notify_progress(&self, notification: ProgressNotification) {
        self.emit_event(Event::NotificationProgress {
            notification_id: notification.notification_id,
            title: notification.title.clone(),
            percent: notification.percent,
            task_id: notification.task_id.clone(),
            text: notification.text.clone(),
        });
        self.notifier.notify_progress(notification);
    }

    pub(crate) fn finish_notification(&self, notification: FinishNotification) {
        self.emit_event(Event::NotificationFinished {
            notification_id: notification.notification_id,
            title: notification.title.clone(),
            text: notification.text.clone(),
            open_target: notification.open_target.clone(),
        });
        self.notifier.finish(notification);
    }

    pub(crate) fn cancel_notification(&self, notification_id: NotificationId) {
        self.emit_event(Event::NotificationCanceled { notification_id });
        self.notifier.cancel(notification_id);
    }
}

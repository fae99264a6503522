//! The transfer pipeline shared by the named and quick lanes.
//!
//! Both lanes run the same steps. The named lane additionally mirrors progress into the
//! [`TaskState`](crate::types::TaskState) and moves the engine back to Idle when it settles.

use crate::config::WebhookEvent;
use crate::error::{DownloadError, Error, Result};
use crate::media;
use crate::notify::{FinishNotification, ProgressNotification};
use crate::types::{
    DownloadOptions, Event, Lane, NotificationId, ProgressEvent, TaskId, TaskState,
    VideoDescriptor,
};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::Downloader;
use super::webhooks::TriggerWebhooksParams;

pub(crate) const DOWNLOAD_COMPLETED_TEXT: &str = "Download completed";
pub(crate) const DOWNLOAD_ERROR_TEXT: &str = "Download error";

/// Identity of one pipeline run
struct PipelineRun {
    task_id: TaskId,
    notification_id: NotificationId,
    title: String,
    lane: Lane,
    /// Fires on a cancel request; progress is ignored from then on
    cancel: CancellationToken,
}

fn notification_percent(percent: f32) -> u8 {
    percent.clamp(0.0, 100.0) as u8
}

impl Downloader {
    /// Run the transfer for a resolved descriptor and settle the outcome
    ///
    /// Settlement happens exactly once: success finishes the notification with an open
    /// target, cancellation dismisses it, and any other failure finishes it with an error
    /// text. Progress arriving after settlement is dropped.
    pub(crate) async fn run_pipeline(
        &self,
        descriptor: VideoDescriptor,
        options: DownloadOptions,
        lane: Lane,
    ) -> Result<Vec<PathBuf>> {
        let task_id = TaskId::derive(&descriptor.id, &options);
        let run = PipelineRun {
            notification_id: NotificationId::for_task(&task_id),
            task_id,
            title: descriptor.title.clone(),
            lane,
            cancel: CancellationToken::new(),
        };

        if lane == Lane::Named {
            self.store.set_task(TaskState {
                url: descriptor.page_url.clone().unwrap_or_default(),
                title: run.title.clone(),
                id: run.task_id.to_string(),
                progress: 0.0,
                progress_text: Some(String::new()),
            });
        }
        self.notify_progress(ProgressNotification {
            notification_id: run.notification_id,
            title: run.title.clone(),
            percent: 0,
            task_id: Some(run.task_id.clone()),
            text: None,
        });

        tracing::info!(task_id = %run.task_id, lane = ?lane, title = %run.title, "download started");

        let result = if self.accepting_new.load(Ordering::SeqCst) {
            self.transfer_with_progress(&descriptor, &options, &run).await
        } else {
            Err(DownloadError::Canceled {
                task_id: run.task_id.clone(),
            }
            .into())
        };

        match result {
            Ok(files) => {
                self.settle_success(&run, &files).await;
                Ok(files)
            }
            Err(e) if e.is_canceled() => {
                self.settle_canceled(&run);
                Err(e)
            }
            Err(e) => {
                let e = match e {
                    Error::Download(_) => e,
                    other => DownloadError::ExecutionFailed {
                        task_id: run.task_id.clone(),
                        reason: other.to_string(),
                    }
                    .into(),
                };
                self.settle_failure(&run, &descriptor, &e);
                Err(e)
            }
        }
    }

    async fn transfer_with_progress(
        &self,
        descriptor: &VideoDescriptor,
        options: &DownloadOptions,
        run: &PipelineRun,
    ) -> Result<Vec<PathBuf>> {
        let (progress_tx, mut progress_rx) =
            mpsc::channel::<ProgressEvent>(self.config.download.progress_channel_capacity.max(1));

        let download = self
            .transfer
            .download(descriptor, options, &run.task_id, run.cancel.clone(), progress_tx);
        tokio::pin!(download);

        let result = loop {
            tokio::select! {
                biased;
                Some(event) = progress_rx.recv() => self.apply_progress(run, event),
                result = &mut download => break result,
            }
        };

        // Progress emitted before a successful exit is still in the channel
        if result.is_ok() {
            while let Ok(event) = progress_rx.try_recv() {
                self.apply_progress(run, event);
            }
        }
        result
    }

    fn apply_progress(&self, run: &PipelineRun, event: ProgressEvent) {
        // Lines the reader forwards after a kill must not revive the notification
        if run.cancel.is_cancelled() {
            tracing::trace!(task_id = %run.task_id, "progress after cancel request ignored");
            return;
        }
        if run.lane == Lane::Named {
            self.store.update_task(|task| {
                task.progress = event.percent;
                task.progress_text = Some(event.line.clone());
            });
        }
        self.notify_progress(ProgressNotification {
            notification_id: run.notification_id,
            title: run.title.clone(),
            percent: notification_percent(event.percent),
            task_id: Some(run.task_id.clone()),
            text: Some(event.line),
        });
    }

    async fn settle_success(&self, run: &PipelineRun, files: &[PathBuf]) {
        let open_target = media::open_target(files).await;

        if run.lane == Lane::Named {
            self.store.update_task(|task| {
                task.progress = 100.0;
                task.progress_text = Some(String::new());
            });
            self.store.finish_named();
        }

        self.finish_notification(FinishNotification {
            notification_id: run.notification_id,
            title: Some(run.title.clone()),
            text: Some(DOWNLOAD_COMPLETED_TEXT.to_string()),
            open_target,
        });
        self.emit_event(Event::DownloadComplete {
            task_id: run.task_id.clone(),
            lane: run.lane,
            files: files.to_vec(),
        });
        self.trigger_webhooks(TriggerWebhooksParams {
            event_type: WebhookEvent::OnComplete,
            task_id: run.task_id.clone(),
            title: run.title.clone(),
            lane: run.lane,
            files: files.to_vec(),
            error: None,
        });

        tracing::info!(task_id = %run.task_id, files = files.len(), "download complete");
    }

    fn settle_canceled(&self, run: &PipelineRun) {
        if run.lane == Lane::Named {
            self.clear_named_progress();
        }
        self.cancel_notification(run.notification_id);
        self.emit_event(Event::TaskCanceled {
            task_id: run.task_id.clone(),
        });

        tracing::info!(task_id = %run.task_id, "download canceled");
    }

    fn settle_failure(&self, run: &PipelineRun, descriptor: &VideoDescriptor, error: &Error) {
        if run.lane == Lane::Named {
            self.clear_named_progress();
        }

        self.finish_notification(FinishNotification {
            notification_id: run.notification_id,
            title: None,
            text: Some(DOWNLOAD_ERROR_TEXT.to_string()),
            open_target: None,
        });
        self.emit_event(Event::DownloadFailed {
            task_id: Some(run.task_id.clone()),
            lane: run.lane,
            url: descriptor.source_url().unwrap_or_default().to_string(),
            error: error.to_string(),
        });
        self.trigger_webhooks(TriggerWebhooksParams {
            event_type: WebhookEvent::OnFailed,
            task_id: run.task_id.clone(),
            title: run.title.clone(),
            lane: run.lane,
            files: Vec::new(),
            error: Some(error.to_string()),
        });

        tracing::error!(task_id = %run.task_id, error = %error, "download failed");
    }

    fn clear_named_progress(&self) {
        self.store.update_task(|task| {
            task.progress = 0.0;
            task.progress_text = Some(String::new());
        });
        self.store.finish_named();
    }
}

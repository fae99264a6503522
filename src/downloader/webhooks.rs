//! Webhook notification handling.

use crate::config::WebhookEvent;
use crate::types::{Event, Lane, TaskId, WebhookPayload};
use std::path::PathBuf;
use std::sync::Arc;

use super::Downloader;

/// Parameters for triggering webhooks
pub struct TriggerWebhooksParams {
    /// The webhook event that occurred
    pub event_type: WebhookEvent,
    /// The task that settled
    pub task_id: TaskId,
    /// Video title
    pub title: String,
    /// Lane the download ran in
    pub lane: Lane,
    /// Files produced (for completed downloads)
    pub files: Vec<PathBuf>,
    /// Optional error message (for failed downloads)
    pub error: Option<String>,
}

impl Downloader {
    /// Trigger webhooks for download events
    ///
    /// Sends an HTTP POST to every configured webhook subscribed to the given event type.
    /// Delivery runs on a spawned task (fire and forget) so it never holds up settlement.
    pub(crate) fn trigger_webhooks(&self, params: TriggerWebhooksParams) {
        let TriggerWebhooksParams {
            event_type,
            task_id,
            title,
            lane,
            files,
            error,
        } = params;

        let matching_webhooks: Vec<_> = self
            .config
            .notifications
            .webhooks
            .iter()
            .filter(|w| w.events.contains(&event_type))
            .cloned()
            .collect();

        if matching_webhooks.is_empty() {
            return;
        }

        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            let event_str: &'static str = match event_type {
                WebhookEvent::OnComplete => "complete",
                WebhookEvent::OnFailed => "failed",
            };

            let payload = Arc::new(WebhookPayload {
                event: event_str.to_string(),
                task_id,
                title,
                lane,
                files,
                error,
                timestamp: chrono::Utc::now().timestamp(),
            });

            let client = reqwest::Client::new();
            for webhook in matching_webhooks {
                let mut request = client
                    .post(&webhook.url)
                    .json(payload.as_ref())
                    .timeout(webhook.timeout);

                if let Some(auth) = &webhook.auth_header {
                    request = request.header("Authorization", auth);
                }

                let url = webhook.url;
                let timeout = webhook.timeout;
                let error_msg = match tokio::time::timeout(timeout, request.send()).await {
                    Ok(Ok(response)) if response.status().is_success() => {
                        tracing::debug!(url = %url, "webhook sent successfully");
                        continue;
                    }
                    Ok(Ok(response)) => format!(
                        "Webhook returned status {}: {}",
                        response.status(),
                        response.text().await.unwrap_or_default()
                    ),
                    Ok(Err(e)) => format!("Failed to send webhook: {}", e),
                    Err(_) => format!("Webhook timed out after {:?}", timeout),
                };

                tracing::warn!(url = %url, error = %error_msg, "webhook failed");
                event_tx
                    .send(Event::WebhookFailed {
                        url,
                        error: error_msg,
                    })
                    .ok();
            }
        });
    }
}

//! Shared test helpers for building Downloader instances around scripted collaborators.

use crate::config::Config;
use crate::downloader::{Downloader, Services};
use crate::error::{DownloadError, Error};
use crate::executor::{ExecOutput, ExecRequest, Executor};
use crate::media::MediaScanner;
use crate::notify::{FinishNotification, Notifier, ProgressNotification};
use crate::service::ServiceLifecycle;
use crate::types::{NotificationId, ProgressEvent, UpdateStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub(crate) const TEST_URL: &str = "https://video.example.com/watch?v=abc123";

/// Metadata JSON as printed by the executor's `--dump-json`
pub(crate) fn metadata_json(id: &str, title: &str, vcodec: &str) -> String {
    serde_json::json!({
        "id": id,
        "title": title,
        "filename": title.replace(' ', "_"),
        "webpage_url": format!("https://video.example.com/watch?v={}", id),
        "vcodec": vcodec,
        "duration": 212,
        "formats": [{"format_id": "18"}]
    })
    .to_string()
}

/// What the fake executor does for a transfer request
#[derive(Clone, Default)]
pub(crate) struct TransferScript {
    /// Progress lines emitted in order
    pub progress: Vec<(f32, &'static str)>,
    /// File names created in the destination directory on success
    pub create_files: Vec<String>,
    /// Block until canceled instead of finishing
    pub wait_for_cancel: bool,
    /// After cancellation, keep sending progress from a detached reader after returning
    pub late_progress: bool,
    /// After cancellation, lines still buffered in the pipe, sent before returning
    pub buffered_after_cancel: Vec<(f32, &'static str)>,
    /// Exit unsuccessfully with this message
    pub fail_with: Option<String>,
}

/// Scripted executor standing in for the yt-dlp binary
#[derive(Default)]
pub(crate) struct FakeExecutor {
    metadata: Mutex<HashMap<String, String>>,
    script: Mutex<TransferScript>,
    requests: Mutex<Vec<ExecRequest>>,
    version: Mutex<String>,
}

impl FakeExecutor {
    pub(crate) fn new() -> Arc<Self> {
        let executor = Self::default();
        *executor.version.lock().unwrap() = "2024.08.06".to_string();
        Arc::new(executor)
    }

    /// Answer metadata requests for `url` with `json`
    pub(crate) fn with_metadata(&self, url: &str, json: String) {
        self.metadata.lock().unwrap().insert(url.to_string(), json);
    }

    pub(crate) fn set_script(&self, script: TransferScript) {
        *self.script.lock().unwrap() = script;
    }

    pub(crate) fn set_version(&self, version: &str) {
        *self.version.lock().unwrap() = version.to_string();
    }

    /// Every request received so far
    pub(crate) fn requests(&self) -> Vec<ExecRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Transfer requests only (metadata lookups filtered out)
    pub(crate) fn transfer_requests(&self) -> Vec<ExecRequest> {
        self.requests()
            .into_iter()
            .filter(|request| !request.has_flag("--dump-json"))
            .collect()
    }

    async fn transfer(
        &self,
        request: &ExecRequest,
        progress: Option<mpsc::Sender<ProgressEvent>>,
        cancel: CancellationToken,
    ) -> crate::Result<ExecOutput> {
        let script = self.script.lock().unwrap().clone();
        let task_id = request
            .process_id
            .clone()
            .unwrap_or_else(|| request.url.as_str().into());

        let send = |percent: f32, line: &str| {
            let progress = progress.clone();
            let event = ProgressEvent {
                percent,
                rate_bps: 1024,
                line: line.to_string(),
            };
            async move {
                if let Some(tx) = progress {
                    tx.send(event).await.ok();
                }
            }
        };

        for (percent, line) in &script.progress {
            send(*percent, line).await;
        }

        if script.wait_for_cancel {
            cancel.cancelled().await;
            for (percent, line) in &script.buffered_after_cancel {
                send(*percent, line).await;
            }
            if script.late_progress {
                // A reader task that outlives the killed process
                let late = send(99.0, "[download]  99.0% of 10.00MiB at 1.00MiB/s ETA 00:00");
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    late.await;
                });
            }
            return Err(DownloadError::Canceled { task_id }.into());
        }

        if let Some(message) = script.fail_with {
            return Err(Error::ExternalTool(message));
        }

        let destination = request
            .option_values("-P")
            .into_iter()
            .find(|value| !value.starts_with("temp:"))
            .map(PathBuf::from)
            .unwrap();
        tokio::fs::create_dir_all(&destination).await.unwrap();
        for name in &script.create_files {
            tokio::fs::write(destination.join(name), b"media").await.unwrap();
        }

        Ok(ExecOutput {
            exit_code: Some(0),
            ..Default::default()
        })
    }
}

#[async_trait]
impl Executor for FakeExecutor {
    async fn execute(
        &self,
        request: &ExecRequest,
        progress: Option<mpsc::Sender<ProgressEvent>>,
        cancel: CancellationToken,
    ) -> crate::Result<ExecOutput> {
        self.requests.lock().unwrap().push(request.clone());

        if request.has_flag("--dump-json") {
            let json = self.metadata.lock().unwrap().get(&request.url).cloned();
            return match json {
                Some(stdout) => Ok(ExecOutput {
                    stdout,
                    stderr: String::new(),
                    exit_code: Some(0),
                }),
                None => Err(Error::ExternalTool(format!(
                    "ERROR: Unsupported URL: {}",
                    request.url
                ))),
            };
        }

        self.transfer(request, progress, cancel).await
    }

    async fn version(&self) -> crate::Result<String> {
        Ok(self.version.lock().unwrap().clone())
    }

    async fn update(&self) -> crate::Result<UpdateStatus> {
        self.set_version("2024.09.01");
        Ok(UpdateStatus::Done)
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// A call the downloader made on its notifier
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NotifierCall {
    Progress(ProgressNotification),
    Finish(FinishNotification),
    Cancel(NotificationId),
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    calls: Mutex<Vec<NotifierCall>>,
}

impl RecordingNotifier {
    pub(crate) fn calls(&self) -> Vec<NotifierCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn finishes(&self) -> Vec<FinishNotification> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                NotifierCall::Finish(finish) => Some(finish),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn cancels(&self) -> Vec<NotificationId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                NotifierCall::Cancel(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn progress(&self) -> Vec<ProgressNotification> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                NotifierCall::Progress(progress) => Some(progress),
                _ => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_progress(&self, notification: ProgressNotification) {
        self.calls
            .lock()
            .unwrap()
            .push(NotifierCall::Progress(notification));
    }

    fn finish(&self, notification: FinishNotification) {
        self.calls
            .lock()
            .unwrap()
            .push(NotifierCall::Finish(notification));
    }

    fn cancel(&self, notification_id: NotificationId) {
        self.calls
            .lock()
            .unwrap()
            .push(NotifierCall::Cancel(notification_id));
    }
}

/// Records `start`/`stop` calls in order
#[derive(Default)]
pub(crate) struct RecordingLifecycle {
    calls: Mutex<Vec<&'static str>>,
}

impl RecordingLifecycle {
    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

impl ServiceLifecycle for RecordingLifecycle {
    fn start(&self) {
        self.calls.lock().unwrap().push("start");
    }

    fn stop(&self) {
        self.calls.lock().unwrap().push("stop");
    }
}

#[derive(Default)]
pub(crate) struct RecordingScanner {
    scanned: Mutex<Vec<PathBuf>>,
}

impl RecordingScanner {
    pub(crate) fn scanned(&self) -> Vec<PathBuf> {
        self.scanned.lock().unwrap().clone()
    }
}

impl MediaScanner for RecordingScanner {
    fn scan(&self, paths: &[PathBuf]) {
        self.scanned.lock().unwrap().extend_from_slice(paths);
    }
}

/// A downloader wired to recording collaborators
pub(crate) struct TestHarness {
    pub downloader: Downloader,
    pub executor: Arc<FakeExecutor>,
    pub notifier: Arc<RecordingNotifier>,
    pub lifecycle: Arc<RecordingLifecycle>,
    pub scanner: Arc<RecordingScanner>,
    pub temp_dir: tempfile::TempDir,
}

/// Build a harness with the given config tweaks applied on top of a temp-dir layout
pub(crate) async fn create_harness_with(configure: impl FnOnce(&mut Config)) -> TestHarness {
    let temp_dir = tempdir().unwrap();
    let mut config = Config::rooted_at(temp_dir.path().join("media"));
    config.persistence.database_path = temp_dir.path().join("test.db");
    configure(&mut config);

    let executor = FakeExecutor::new();
    executor.with_metadata(TEST_URL, metadata_json("abc123", "Test Video", "avc1"));

    let notifier = Arc::new(RecordingNotifier::default());
    let lifecycle = Arc::new(RecordingLifecycle::default());
    let scanner = Arc::new(RecordingScanner::default());

    let downloader = Downloader::with_services(
        config,
        Services {
            executor: executor.clone(),
            notifier: notifier.clone(),
            scanner: scanner.clone(),
            lifecycle: lifecycle.clone(),
        },
    )
    .await
    .unwrap();

    TestHarness {
        downloader,
        executor,
        notifier,
        lifecycle,
        scanner,
        temp_dir,
    }
}

/// Helper to create a test harness with the default temp-dir layout.
pub(crate) async fn create_test_harness() -> TestHarness {
    create_harness_with(|_| {}).await
}

/// Poll `condition` until it holds, failing the test after five seconds
pub(crate) async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached within 5s");
}

//! CLI-based executor using an external yt-dlp compatible binary

use super::progress::parse_progress_line;
use super::traits::{ExecOutput, ExecRequest, Executor};
use crate::error::{DownloadError, Error};
use crate::types::{ProgressEvent, TaskId, UpdateStatus};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// CLI-based executor
///
/// Spawns the configured binary once per request. Progress is read from standard output
/// line by line, which requires `--newline`; the flag is added automatically whenever a
/// progress channel is supplied.
///
/// # Examples
///
/// ```no_run
/// use vidmax_dl::executor::{CliExecutor, Executor};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let executor = CliExecutor::from_path().expect("yt-dlp not found in PATH");
/// println!("{}", executor.version().await?);
/// # Ok(())
/// # }
/// ```
pub struct CliExecutor {
    binary_path: PathBuf,
}

impl CliExecutor {
    /// Create a new CLI executor with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find yt-dlp in PATH
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Path of the binary this executor runs
    pub fn binary_path(&self) -> &PathBuf {
        &self.binary_path
    }

    async fn run_simple(&self, args: &[&str]) -> crate::Result<ExecOutput> {
        let output = Command::new(&self.binary_path)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        let result = ExecOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };
        if output.status.success() {
            Ok(result)
        } else {
            Err(exit_error(&result))
        }
    }

    fn spawn_error(&self, e: std::io::Error) -> Error {
        Error::ExternalTool(format!(
            "failed to execute {}: {}",
            self.binary_path.display(),
            e
        ))
    }
}

#[async_trait]
impl Executor for CliExecutor {
    async fn execute(
        &self,
        request: &ExecRequest,
        progress: Option<mpsc::Sender<ProgressEvent>>,
        cancel: CancellationToken,
    ) -> crate::Result<ExecOutput> {
        let mut args = Vec::with_capacity(request.args.len() + 2);
        if progress.is_some() {
            args.push("--newline".to_string());
        }
        args.extend(request.to_args());

        tracing::debug!(
            executor = self.name(),
            binary = %self.binary_path.display(),
            ?args,
            "spawning executor"
        );

        let mut child = Command::new(&self.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::ExternalTool("executor stdout not captured".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::ExternalTool("executor stderr not captured".into()))?;

        let stdout_reader = tokio::spawn(read_output(stdout, progress));
        let stderr_reader = tokio::spawn(read_output(stderr, None));

        let deadline = async {
            match request.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending::<()>().await,
            }
        };

        let status = tokio::select! {
            status = child.wait() => status.map_err(|e| self.spawn_error(e))?,
            _ = cancel.cancelled() => {
                child.kill().await.ok();
                stdout_reader.await.ok();
                stderr_reader.await.ok();
                let task_id = request
                    .process_id
                    .clone()
                    .unwrap_or_else(|| TaskId::from(request.url.as_str()));
                return Err(DownloadError::Canceled { task_id }.into());
            }
            _ = deadline => {
                child.kill().await.ok();
                stdout_reader.await.ok();
                stderr_reader.await.ok();
                return Err(Error::ExternalTool(format!(
                    "{} timed out after {}s",
                    self.name(),
                    request.timeout.map(|t| t.as_secs()).unwrap_or_default()
                )));
            }
        };

        let output = ExecOutput {
            stdout: stdout_reader.await.unwrap_or_default(),
            stderr: stderr_reader.await.unwrap_or_default(),
            exit_code: status.code(),
        };

        if status.success() {
            Ok(output)
        } else {
            Err(exit_error(&output))
        }
    }

    async fn version(&self) -> crate::Result<String> {
        let output = self.run_simple(&["--version"]).await?;
        Ok(output.stdout.trim().to_string())
    }

    async fn update(&self) -> crate::Result<UpdateStatus> {
        let output = self.run_simple(&["-U"]).await?;
        if output.stdout.contains("is up to date") {
            Ok(UpdateStatus::AlreadyUpToDate)
        } else {
            Ok(UpdateStatus::Done)
        }
    }

    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }
}

// Forwards progress lines when a sender is given and collects everything else.
async fn read_output<R>(stream: R, progress: Option<mpsc::Sender<ProgressEvent>>) -> String
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    let mut collected = String::new();
    let mut progress = progress;

    while let Ok(Some(line)) = lines.next_line().await {
        if let Some(tx) = &progress
            && let Some(event) = parse_progress_line(&line)
        {
            if tx.send(event).await.is_err() {
                // Receiver gone; keep draining so the process never blocks on a full pipe
                progress = None;
            }
            continue;
        }
        collected.push_str(&line);
        collected.push('\n');
    }
    collected
}

fn exit_error(output: &ExecOutput) -> Error {
    let reason = output
        .stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("no error output")
        .trim()
        .to_string();
    match output.exit_code {
        Some(code) => Error::ExternalTool(format!("executor exited with status {}: {}", code, reason)),
        None => Error::ExternalTool(format!("executor terminated by signal: {}", reason)),
    }
}

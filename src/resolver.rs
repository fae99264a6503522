//! Metadata resolution: executor in metadata-only mode, output parsed into a descriptor.

use crate::config::ExecutorConfig;
use crate::error::{DownloadError, Error, Result};
use crate::executor::{ExecRequest, Executor};
use crate::types::{DownloadOptions, VideoDescriptor};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Resolves a URL into a [`VideoDescriptor`]
#[derive(Clone)]
pub struct MetadataResolver {
    executor: Arc<dyn Executor>,
    timeout: Duration,
    socket_timeout_secs: u64,
}

impl MetadataResolver {
    /// Create a resolver that invokes `executor` with the configured limits
    pub fn new(executor: Arc<dyn Executor>, config: &ExecutorConfig) -> Self {
        Self {
            executor,
            timeout: config.metadata_timeout,
            socket_timeout_secs: config.socket_timeout_secs,
        }
    }

    /// Build the metadata-only request for `url`
    pub fn build_request(&self, url: &str, options: &DownloadOptions) -> ExecRequest {
        let mut request = ExecRequest::new(url)
            .option("-o", "%(title).200B")
            .flag("--restrict-filenames");
        if options.extract_audio {
            request = request.flag("-x");
        }
        request
            .flag("--dump-json")
            .option("-R", "1")
            .flag("--no-playlist")
            .option("--socket-timeout", self.socket_timeout_secs.to_string())
            .with_timeout(self.timeout)
    }

    /// Resolve `url` into a descriptor
    ///
    /// A blank URL is still handed to the executor; its failure is reported like any
    /// other. Every failure (non-zero exit, timeout, malformed or empty JSON) becomes
    /// `DownloadError::ResolutionFailed`; no partial descriptor is ever returned.
    pub async fn resolve(&self, url: &str, options: &DownloadOptions) -> Result<VideoDescriptor> {
        let request = self.build_request(url, options);
        let failed = |reason: String| -> Error {
            DownloadError::ResolutionFailed {
                url: url.to_string(),
                reason,
            }
            .into()
        };

        let output = self
            .executor
            .execute(&request, None, CancellationToken::new())
            .await
            .map_err(|e| failed(e.to_string()))?;

        let descriptor = parse_descriptor(&output.stdout).map_err(failed)?;
        tracing::debug!(
            url,
            video_id = %descriptor.id,
            title = %descriptor.title,
            "resolved video metadata"
        );
        Ok(descriptor)
    }
}

/// Parse the single JSON document printed by `--dump-json`
pub fn parse_descriptor(stdout: &str) -> std::result::Result<VideoDescriptor, String> {
    let descriptor: VideoDescriptor = serde_json::from_str(stdout.trim())
        .map_err(|e| format!("malformed metadata: {}", e))?;
    if descriptor.id.is_empty() {
        return Err("metadata has no video id".to_string());
    }
    Ok(descriptor)
}

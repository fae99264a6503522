//! Transfer request construction

use crate::error::{DownloadError, Result};
use crate::executor::ExecRequest;
use crate::types::{DownloadOptions, TaskId, VideoDescriptor};
use std::path::{Path, PathBuf};

/// Output template; the section suffix keeps clips of the same video apart
pub const OUTPUT_TEMPLATE: &str = "%(title).200B [%(section_start)d-%(section_end)d].%(ext)s";

/// Directories and downloader name a transfer request is built from
#[derive(Debug, Clone)]
pub struct TransferPaths {
    /// Destination for video downloads
    pub video_dir: PathBuf,
    /// Destination for audio-only downloads
    pub audio_dir: PathBuf,
    /// Scratch directory for partial files
    pub temp_dir: PathBuf,
    /// Value for `--downloader` when acceleration is requested
    pub accelerated_downloader: String,
}

/// A built transfer request and where its output lands
#[derive(Debug, Clone)]
pub struct TransferPlan {
    /// Request handed to the executor
    pub request: ExecRequest,
    /// Destination directory searched after the transfer
    pub destination: PathBuf,
    /// Whether the audio route was taken
    pub audio: bool,
}

/// Whether a request takes the audio route
pub fn routes_to_audio(descriptor: &VideoDescriptor, options: &DownloadOptions) -> bool {
    options.extract_audio || descriptor.is_audio_only_source()
}

/// Build the executor request for a transfer
///
/// Fails with `NoSourceUrl` when the descriptor carries neither URL.
pub fn build_plan(
    descriptor: &VideoDescriptor,
    options: &DownloadOptions,
    task_id: &TaskId,
    paths: &TransferPaths,
) -> Result<TransferPlan> {
    let url = descriptor
        .source_url()
        .ok_or_else(|| DownloadError::NoSourceUrl {
            id: descriptor.id.clone(),
        })?;

    let mut request = ExecRequest::new(url).flag("--no-mtime");

    if options.use_accelerated_downloader {
        request = request
            .option("--downloader", paths.accelerated_downloader.as_str())
            .option(
                "--external-downloader-args",
                "aria2c:\"--summary-interval=1\"",
            );
    }

    let audio = routes_to_audio(descriptor, options);
    let destination = if audio {
        request = request
            .flag("-x")
            .option("--audio-format", "mp3")
            .option(
                "--parse-metadata",
                "%(release_year,upload_date)s:%(meta_date)s",
            )
            .option("--parse-metadata", "%(album,title)s:%(meta_album)s");
        paths.audio_dir.clone()
    } else {
        request = request.flag("--add-metadata").flag("--no-embed-info-json");
        if let Some(directive) = options.video_quality.sort_directive() {
            request = request.option("-S", directive);
        }
        paths.video_dir.clone()
    };

    let request = request
        .option("-P", path_arg(&destination))
        .option("-P", format!("temp:{}", path_arg(&paths.temp_dir)))
        .option("-o", OUTPUT_TEMPLATE)
        .flag("--restrict-filenames")
        .flag("--no-playlist")
        .with_process_id(task_id.clone());

    Ok(TransferPlan {
        request,
        destination,
        audio,
    })
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

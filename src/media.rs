//! Destination directories, post-download file discovery, and media-index invalidation.

use crate::config::DownloadConfig;
use crate::error::{Error, Result};
use crate::types::OpenTarget;
use std::path::{Path, PathBuf};

/// Marker that keeps media indexers out of the scratch directory
pub const NO_MEDIA_MARKER: &str = ".nomedia";

/// Hook for telling the host's media index about new files
///
/// Called fire-and-forget after a successful download; implementations must not block.
pub trait MediaScanner: Send + Sync {
    /// Invalidate the index entries for `paths`
    fn scan(&self, paths: &[PathBuf]);
}

/// Scanner for hosts without a media index
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpMediaScanner;

impl MediaScanner for NoOpMediaScanner {
    fn scan(&self, _paths: &[PathBuf]) {}
}

/// Create the destination and scratch directories
pub async fn ensure_dirs(config: &DownloadConfig) -> Result<()> {
    for (label, dir) in [
        ("video", &config.video_dir),
        ("audio", &config.audio_dir),
        ("temp", &config.temp_dir),
    ] {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create {} directory '{}': {}",
                    label,
                    dir.display(),
                    e
                ),
            ))
        })?;
    }

    let marker = config.temp_dir.join(NO_MEDIA_MARKER);
    if !tokio::fs::try_exists(&marker).await.unwrap_or(false) {
        tokio::fs::write(&marker, b"").await?;
    }
    Ok(())
}

/// Every file under `directory` whose path contains `key`
///
/// Walks recursively and skips `exclude` (the scratch directory when it is nested in the
/// destination). An empty key matches nothing. Results are sorted.
pub async fn find_files(key: &str, directory: &Path, exclude: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    if key.is_empty() {
        return Ok(found);
    }

    let mut pending = vec![directory.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                if path != exclude {
                    pending.push(path);
                }
            } else if path.to_string_lossy().contains(key) {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

/// Target for the "open file" action: the first discovered file that still exists
pub async fn open_target(files: &[PathBuf]) -> Option<OpenTarget> {
    let path = files.first()?;
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        Some(OpenTarget { path: path.clone() })
    } else {
        None
    }
}

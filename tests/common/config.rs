//! Test configuration helpers for creating downloaders around the scripted executor

use super::fixtures::EXECUTOR_SCRIPT;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use vidmax_dl::{Config, Downloader};

/// Error type for test configuration
#[derive(Debug)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Write the scripted executor into `dir` and make it executable
#[cfg(unix)]
pub fn install_script(dir: &Path) -> Result<PathBuf, ConfigError> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("yt-dlp");
    std::fs::write(&path, EXECUTOR_SCRIPT)
        .map_err(|e| ConfigError(format!("Failed to write executor script: {}", e)))?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| ConfigError(format!("Failed to mark script executable: {}", e)))?;
    Ok(path)
}

/// Config rooted in `temp_dir` that runs `binary`
pub fn script_config(temp_dir: &TempDir, binary: PathBuf) -> Config {
    let mut config = Config::rooted_at(temp_dir.path().join("media"));
    config.persistence.database_path = temp_dir.path().join("test.db");
    config.executor.binary_path = Some(binary);
    config.executor.search_path = false;
    config
}

/// Create a Downloader driving the scripted executor
///
/// Returns the downloader and temp directory (keep temp_dir alive for test duration)
#[cfg(unix)]
pub async fn create_script_downloader() -> Result<(Arc<Downloader>, TempDir), ConfigError> {
    let temp_dir = tempfile::tempdir()
        .map_err(|e| ConfigError(format!("Failed to create temp dir: {}", e)))?;
    let binary = install_script(temp_dir.path())?;

    let downloader = Downloader::new(script_config(&temp_dir, binary))
        .await
        .map_err(|e| ConfigError(format!("Failed to create downloader: {}", e)))?;

    Ok((Arc::new(downloader), temp_dir))
}

/// Create a Downloader around whatever yt-dlp is on PATH
///
/// Returns `None` when the binary is missing.
pub async fn create_live_downloader() -> Result<Option<(Arc<Downloader>, TempDir)>, ConfigError> {
    let Ok(binary) = which::which("yt-dlp") else {
        return Ok(None);
    };
    let temp_dir = tempfile::tempdir()
        .map_err(|e| ConfigError(format!("Failed to create temp dir: {}", e)))?;

    let downloader = Downloader::new(script_config(&temp_dir, binary))
        .await
        .map_err(|e| ConfigError(format!("Failed to create downloader: {}", e)))?;

    Ok(Some((Arc::new(downloader), temp_dir)))
}

/// URL for live tests, taken from `VIDMAX_LIVE_URL`
pub fn live_url() -> Option<String> {
    std::env::var("VIDMAX_LIVE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
}

/// Skip test if no live URL is configured
#[macro_export]
macro_rules! skip_if_no_live_url {
    () => {
        match $crate::common::live_url() {
            Some(url) => url,
            None => {
                eprintln!("Skipping test: VIDMAX_LIVE_URL not set");
                return;
            }
        }
    };
}

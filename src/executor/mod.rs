//! External executor invocation
//!
//! The downloader never shells out directly. Every invocation goes through the
//! [`Executor`] trait, so the binary can be swapped for a scripted stand-in in tests.
//!
//! - [`CliExecutor`]: runs a yt-dlp compatible binary
//! - [`UnavailableExecutor`]: rejects every request when no binary is available
//!
//! Progress lines are normalized by [`parse_progress_line`].

mod cli;
mod noop;
mod progress;
mod traits;

pub use cli::CliExecutor;
pub use noop::UnavailableExecutor;
pub use progress::{parse_progress_line, parse_size};
pub use traits::{ExecOutput, ExecRequest, Executor};

use crate::config::ExecutorConfig;
use std::sync::Arc;

/// Pick an executor according to the configuration
///
/// An explicit `binary_path` wins; otherwise PATH is searched when enabled. Falls back to
/// [`UnavailableExecutor`].
pub fn from_config(config: &ExecutorConfig) -> Arc<dyn Executor> {
    if let Some(ref binary_path) = config.binary_path {
        Arc::new(CliExecutor::new(binary_path.clone()))
    } else if config.search_path {
        CliExecutor::from_path()
            .map(|executor| Arc::new(executor) as Arc<dyn Executor>)
            .unwrap_or_else(|| Arc::new(UnavailableExecutor))
    } else {
        Arc::new(UnavailableExecutor)
    }
}

//! Database layer for vidmax-dl
//!
//! Handles SQLite persistence for user settings.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`]: database lifecycle, schema migrations
//! - [`settings`]: typed key-value settings

use sqlx::sqlite::SqlitePool;

mod migrations;
mod settings;

pub use settings::{SettingKey, Settings, SettingsUpdate};

/// Database handle
pub struct Database {
    pool: SqlitePool,
}

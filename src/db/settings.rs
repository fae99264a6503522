//! Typed key-value settings.

use crate::error::DatabaseError;
use crate::types::{DownloadOptions, VideoQuality};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Database;

/// The fixed set of persisted settings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingKey {
    /// Extract audio by default (bool)
    DownloadAudio,
    /// Default video quality tier (int)
    VideoQuality,
    /// Last reported executor version (string)
    ExecutorVersion,
}

impl SettingKey {
    /// Column value used for this key
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::DownloadAudio => "download_audio",
            SettingKey::VideoQuality => "video_quality",
            SettingKey::ExecutorVersion => "yt_dlp_version",
        }
    }
}

/// Snapshot of all settings
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Settings {
    /// Extract audio by default
    pub download_audio: bool,
    /// Default video quality tier
    pub video_quality: VideoQuality,
    /// Cached executor version
    pub yt_dlp_version: Option<String>,
}

/// Partial settings update; absent fields are left unchanged
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct SettingsUpdate {
    /// Extract audio by default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_audio: Option<bool>,
    /// Default video quality tier (0-7)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_quality: Option<VideoQuality>,
}

impl Database {
    async fn get_setting(&self, key: SettingKey) -> Result<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to read setting {}: {}",
                    key.as_str(),
                    e
                )))
            })
    }

    async fn put_setting(&self, key: SettingKey, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key.as_str())
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to write setting {}: {}",
                key.as_str(),
                e
            )))
        })?;

        Ok(())
    }

    /// Whether audio extraction is the default (false if unset)
    pub async fn download_audio(&self) -> Result<bool> {
        Ok(self
            .get_setting(SettingKey::DownloadAudio)
            .await?
            .is_some_and(|value| value == "true"))
    }

    /// Set the audio extraction default
    pub async fn set_download_audio(&self, enabled: bool) -> Result<()> {
        self.put_setting(SettingKey::DownloadAudio, if enabled { "true" } else { "false" })
            .await
    }

    /// Default quality tier (best if unset or unreadable)
    pub async fn video_quality(&self) -> Result<VideoQuality> {
        Ok(self
            .get_setting(SettingKey::VideoQuality)
            .await?
            .and_then(|value| value.parse::<i64>().ok())
            .map(VideoQuality::from_i64)
            .unwrap_or_default())
    }

    /// Set the default quality tier
    pub async fn set_video_quality(&self, quality: VideoQuality) -> Result<()> {
        self.put_setting(SettingKey::VideoQuality, &quality.0.to_string())
            .await
    }

    /// Cached executor version
    pub async fn executor_version(&self) -> Result<Option<String>> {
        self.get_setting(SettingKey::ExecutorVersion).await
    }

    /// Cache the executor version
    pub async fn set_executor_version(&self, version: &str) -> Result<()> {
        self.put_setting(SettingKey::ExecutorVersion, version).await
    }

    /// All settings at once
    pub async fn settings(&self) -> Result<Settings> {
        Ok(Settings {
            download_audio: self.download_audio().await?,
            video_quality: self.video_quality().await?,
            yt_dlp_version: self.executor_version().await?,
        })
    }

    /// Apply a partial update and return the resulting settings
    pub async fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings> {
        if let Some(quality) = update.video_quality
            && !quality.is_known()
        {
            return Err(Error::Config {
                message: format!("video_quality must be between 0 and 7, got {}", quality.0),
                key: Some("video_quality".to_string()),
            });
        }
        if let Some(download_audio) = update.download_audio {
            self.set_download_audio(download_audio).await?;
        }
        if let Some(quality) = update.video_quality {
            self.set_video_quality(quality).await?;
        }
        self.settings().await
    }

    /// Options used when a caller supplies none
    ///
    /// Acceleration is never a stored default.
    pub async fn default_options(&self) -> Result<DownloadOptions> {
        Ok(DownloadOptions {
            use_accelerated_downloader: false,
            video_quality: self.video_quality().await?,
            extract_audio: self.download_audio().await?,
        })
    }
}

//! Orchestration engine split into focused submodules.
//!
//! The `Downloader` struct and its methods are organized by domain:
//! - [`named`] - The single UI-tracked download and its state queries
//! - [`quick`] - Fire-and-forget downloads from share actions
//! - [`pipeline`] - The transfer pipeline shared by both lanes
//! - [`control`] - Cancellation
//! - [`lifecycle`] - Shutdown and executor maintenance
//! - [`notifications`] - Notification and event fan-out
//! - [`webhooks`] - Webhook delivery

mod control;
mod lifecycle;
mod named;
mod notifications;
mod pipeline;
mod quick;
mod webhooks;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use named::{RejectReason, StartOutcome};
pub use webhooks::TriggerWebhooksParams;

use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::executor::{self, Executor};
use crate::media::{self, MediaScanner, NoOpMediaScanner};
use crate::notify::{NoOpNotifier, Notifier};
use crate::resolver::MetadataResolver;
use crate::service::{self, NoOpServiceLifecycle, ServiceLifecycle};
use crate::state::TaskStateStore;
use crate::transfer::{TransferAdapter, TransferPaths};
use crate::types::{DownloadOptions, Event};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// External collaborators the engine drives
///
/// Everything the engine talks to outside the process goes through one of these, so an
/// embedding application (or a test) can swap any of them.
#[derive(Clone)]
pub struct Services {
    /// Runs the yt-dlp compatible binary
    pub executor: Arc<dyn Executor>,
    /// Shows OS notifications
    pub notifier: Arc<dyn Notifier>,
    /// Invalidates the host media index
    pub scanner: Arc<dyn MediaScanner>,
    /// Keep-alive started while busy
    pub lifecycle: Arc<dyn ServiceLifecycle>,
}

impl Services {
    /// Executor picked from config, no-op collaborators for everything else
    pub fn from_config(config: &Config) -> Self {
        Self {
            executor: executor::from_config(&config.executor),
            notifier: Arc::new(NoOpNotifier),
            scanner: Arc::new(NoOpMediaScanner),
            lifecycle: Arc::new(NoOpServiceLifecycle),
        }
    }
}

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct Downloader {
    /// Settings database
    pub db: Arc<Database>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Configuration
    pub(crate) config: Arc<Config>,
    /// Named task, engine state, quick counter and busy signal
    pub(crate) store: Arc<TaskStateStore>,
    /// Metadata step
    pub(crate) resolver: MetadataResolver,
    /// Transfer step and its process registry
    pub(crate) transfer: TransferAdapter,
    /// Executor, for version queries and self-update
    pub(crate) executor: Arc<dyn Executor>,
    /// Notification collaborator
    pub(crate) notifier: Arc<dyn Notifier>,
    /// Flag to indicate whether new downloads are accepted (set to false during shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
}

impl Downloader {
    /// Create a new Downloader with collaborators derived from `config`
    ///
    /// This initializes all core components:
    /// - Creates the destination and scratch directories
    /// - Opens/creates the settings database and runs migrations
    /// - Locates the executor (explicit path, then PATH)
    /// - Sets up the event broadcast channel and the service lifecycle bridge
    pub async fn new(config: Config) -> Result<Self> {
        let services = Services::from_config(&config);
        Self::with_services(config, services).await
    }

    /// Create a new Downloader with explicit collaborators
    pub async fn with_services(config: Config, services: Services) -> Result<Self> {
        media::ensure_dirs(&config.download).await?;

        let db = Database::new(&config.persistence.database_path).await?;

        // Buffer of 1000 events; slower subscribers receive `RecvError::Lagged`
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        let store = Arc::new(TaskStateStore::new(event_tx.clone()));
        service::spawn_bridge(store.subscribe_busy(), services.lifecycle.clone());

        let resolver = MetadataResolver::new(services.executor.clone(), &config.executor);
        let transfer = TransferAdapter::new(
            services.executor.clone(),
            TransferPaths {
                video_dir: config.download.video_dir.clone(),
                audio_dir: config.download.audio_dir.clone(),
                temp_dir: config.download.temp_dir.clone(),
                accelerated_downloader: config.executor.accelerated_downloader.clone(),
            },
            services.scanner.clone(),
        );

        tracing::info!(
            executor = services.executor.name(),
            video_dir = %config.download.video_dir.display(),
            audio_dir = %config.download.audio_dir.display(),
            "Downloader initialized"
        );

        Ok(Self {
            db: Arc::new(db),
            event_tx,
            config: Arc::new(config),
            store,
            resolver,
            transfer,
            executor: services.executor,
            notifier: services.notifier,
            accepting_new: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Subscribe to download events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    /// If a subscriber falls behind by more than 1000 events, it receives
    /// `RecvError::Lagged`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vidmax_dl::{Config, Downloader};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = Downloader::new(Config::default()).await?;
    ///
    ///     let mut events = downloader.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             tracing::info!(?event, "download event");
    ///         }
    ///     });
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Name of the executor implementation in use
    pub fn executor_name(&self) -> &'static str {
        self.executor.name()
    }

    /// Options stored as defaults, or built-in defaults if the database is unreadable
    pub(crate) async fn default_options(&self) -> DownloadOptions {
        match self.db.default_options().await {
            Ok(options) => options,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored download defaults");
                DownloadOptions::default()
            }
        }
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers, the event is silently dropped.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Spawn the REST API server in a background task
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let downloader = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(downloader, config).await })
    }
}

//! Background-service keep-alive driven by the busy signal.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Keep-alive hook started while any download is active
///
/// Implementations should return quickly; they are called from the bridge task.
pub trait ServiceLifecycle: Send + Sync {
    /// Busy went false -> true
    fn start(&self);

    /// Busy went true -> false
    fn stop(&self);
}

/// No-op lifecycle used when the embedding application has no keep-alive to manage
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpServiceLifecycle;

impl ServiceLifecycle for NoOpServiceLifecycle {
    fn start(&self) {}

    fn stop(&self) {}
}

/// Spawn the task that turns busy edges into `start()`/`stop()` calls
///
/// `busy_rx` must come from [`TaskStateStore::subscribe_busy`](crate::state::TaskStateStore::subscribe_busy),
/// which publishes only changes. The bridge still tracks whether it has started so that a
/// repeated value can never produce a duplicate call. When the channel closes while the
/// service is running, it is stopped.
pub fn spawn_bridge(
    mut busy_rx: mpsc::UnboundedReceiver<bool>,
    lifecycle: Arc<dyn ServiceLifecycle>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut running = false;
        while let Some(busy) = busy_rx.recv().await {
            match (busy, running) {
                (true, false) => {
                    tracing::debug!("starting service keep-alive");
                    lifecycle.start();
                    running = true;
                }
                (false, true) => {
                    tracing::debug!("stopping service keep-alive");
                    lifecycle.stop();
                    running = false;
                }
                _ => {}
            }
        }
        if running {
            lifecycle.stop();
        }
    })
}

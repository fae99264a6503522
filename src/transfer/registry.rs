//! Registry of running executor processes, keyed by task id.

use crate::types::TaskId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

type Entries = HashMap<TaskId, (u64, CancellationToken)>;

/// Map of in-flight invocations to their cancellation tokens
///
/// Registering a task id that is already present replaces the older entry; the older
/// invocation keeps running but can no longer be canceled by id.
#[derive(Clone, Default)]
pub struct ProcessRegistry {
    entries: Arc<Mutex<Entries>>,
    next_generation: Arc<AtomicU64>,
}

impl ProcessRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an invocation; the entry is removed when the returned guard drops
    pub fn register(&self, task_id: TaskId) -> Registration {
        self.register_token(task_id, CancellationToken::new())
    }

    /// Register an invocation under a token the caller already holds
    ///
    /// The caller can watch `token` to learn that the invocation was destroyed.
    pub fn register_token(&self, task_id: TaskId, token: CancellationToken) -> Registration {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let replaced = self
            .lock()
            .insert(task_id.clone(), (generation, token.clone()));
        if replaced.is_some() {
            tracing::warn!(task_id = %task_id, "task id re-registered while still running");
        }
        Registration {
            registry: self.clone(),
            task_id,
            generation,
            token,
        }
    }

    /// Terminate the invocation registered under `task_id`
    ///
    /// Returns false if nothing was registered (already finished, already canceled, or
    /// never started).
    pub fn destroy(&self, task_id: &TaskId) -> bool {
        match self.lock().remove(task_id) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Terminate every registered invocation; returns how many were canceled
    pub fn destroy_all(&self) -> usize {
        let drained: Vec<_> = self.lock().drain().collect();
        for (_, (_, token)) in &drained {
            token.cancel();
        }
        drained.len()
    }

    /// Whether `task_id` currently has a registered invocation
    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.lock().contains_key(task_id)
    }

    /// Number of registered invocations
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// A registered invocation; unregisters itself on drop
pub struct Registration {
    registry: ProcessRegistry,
    task_id: TaskId,
    generation: u64,
    token: CancellationToken,
}

impl Registration {
    /// Token that fires when the invocation is destroyed
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut entries = self.registry.lock();
        // A newer registration under the same id must survive this one finishing
        if entries
            .get(&self.task_id)
            .is_some_and(|(generation, _)| *generation == self.generation)
        {
            entries.remove(&self.task_id);
        }
    }
}

//! Subscribable task and engine state.
//!
//! [`StateCell`] is a last-writer-wins cell whose subscribers observe every committed value
//! in commit order. [`TaskStateStore`] groups the cells the engine owns and derives the
//! busy signal from the engine state and the quick-download counter.

use crate::types::{EngineState, Event, TaskState};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, mpsc};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct CellInner<T> {
    value: T,
    subscribers: Vec<mpsc::UnboundedSender<T>>,
}

/// A value cell with atomic `set`/`update` and per-commit subscriptions
///
/// Subscribers are published to while the cell's lock is held, so every subscriber sees
/// every committed value exactly once, in commit order. Closed subscribers are pruned
/// on the next commit.
pub struct StateCell<T> {
    inner: Mutex<CellInner<T>>,
}

impl<T: Clone> StateCell<T> {
    /// Create a cell holding `value`
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(CellInner {
                value,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Current value
    pub fn get(&self) -> T {
        lock(&self.inner).value.clone()
    }

    /// Replace the value
    pub fn set(&self, value: T) {
        let mut inner = lock(&self.inner);
        inner.value = value;
        Self::publish(&mut inner);
    }

    /// Mutate the value in place and publish the result
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut inner = lock(&self.inner);
        f(&mut inner.value);
        Self::publish(&mut inner);
    }

    /// Mutate the value only if `f` returns true; publishes only on change
    pub fn update_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        let mut inner = lock(&self.inner);
        let changed = f(&mut inner.value);
        if changed {
            Self::publish(&mut inner);
        }
        changed
    }

    /// Receive every value committed after this call
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.inner).subscribers.push(tx);
        rx
    }

    fn publish(inner: &mut CellInner<T>) {
        let value = inner.value.clone();
        inner
            .subscribers
            .retain(|subscriber| subscriber.send(value.clone()).is_ok());
    }
}

impl<T: Clone + PartialEq> StateCell<T> {
    /// Atomically replace `expected` with `new`; returns whether the swap happened
    pub fn compare_and_set(&self, expected: &T, new: T) -> bool {
        self.update_if(|value| {
            if value == expected {
                *value = new;
                true
            } else {
                false
            }
        })
    }
}

/// State owned by the orchestration engine
///
/// The engine is the only writer. Readers use the getters or subscribe to a cell.
pub struct TaskStateStore {
    task: StateCell<TaskState>,
    engine: StateCell<EngineState>,
    quick_count: StateCell<usize>,
    pending_url: StateCell<String>,
    busy: StateCell<bool>,
    event_tx: broadcast::Sender<Event>,
}

impl TaskStateStore {
    /// Create an idle store that mirrors state transitions onto `event_tx`
    pub fn new(event_tx: broadcast::Sender<Event>) -> Self {
        Self {
            task: StateCell::new(TaskState::default()),
            engine: StateCell::new(EngineState::Idle),
            quick_count: StateCell::new(0),
            pending_url: StateCell::new(String::new()),
            busy: StateCell::new(false),
            event_tx,
        }
    }

    /// Snapshot of the named task
    pub fn task(&self) -> TaskState {
        self.task.get()
    }

    /// Replace the named task
    pub fn set_task(&self, task: TaskState) {
        self.task.set(task);
    }

    /// Mutate the named task in place
    pub fn update_task(&self, f: impl FnOnce(&mut TaskState)) {
        self.task.update(f);
    }

    /// Observe every named-task update
    pub fn subscribe_task(&self) -> mpsc::UnboundedReceiver<TaskState> {
        self.task.subscribe()
    }

    /// Current engine state
    pub fn engine_state(&self) -> EngineState {
        self.engine.get()
    }

    /// Observe every engine state transition
    pub fn subscribe_engine(&self) -> mpsc::UnboundedReceiver<EngineState> {
        self.engine.subscribe()
    }

    /// Atomically move Idle -> Downloading; returns false if a named download is active
    pub fn try_begin_named(&self) -> bool {
        let accepted = self.transition(EngineState::Idle, EngineState::Downloading);
        if accepted {
            self.refresh_busy();
        }
        accepted
    }

    /// Move back to Idle (no-op if already Idle)
    pub fn finish_named(&self) {
        if self.transition(EngineState::Downloading, EngineState::Idle) {
            self.refresh_busy();
        }
    }

    fn transition(&self, from: EngineState, to: EngineState) -> bool {
        self.engine.update_if(|state| {
            if *state != from {
                return false;
            }
            *state = to;
            self.event_tx.send(Event::StateChanged { state: to }).ok();
            true
        })
    }

    /// Number of quick downloads in flight
    pub fn quick_count(&self) -> usize {
        self.quick_count.get()
    }

    /// Register a quick download
    pub fn increment_quick(&self) {
        self.quick_count.update(|count| *count += 1);
        self.refresh_busy();
    }

    /// Release a quick download (never goes below zero)
    pub fn decrement_quick(&self) {
        self.quick_count
            .update_if(|count| match count.checked_sub(1) {
                Some(next) => {
                    *count = next;
                    true
                }
                None => false,
            });
        self.refresh_busy();
    }

    /// The URL a named download will start from
    pub fn pending_url(&self) -> String {
        self.pending_url.get()
    }

    /// Replace the pending URL
    pub fn set_pending_url(&self, url: String) {
        self.pending_url.set(url);
    }

    /// Whether any download (named or quick) is active
    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    /// Observe busy edges; only changes are published
    pub fn subscribe_busy(&self) -> mpsc::UnboundedReceiver<bool> {
        self.busy.subscribe()
    }

    // Recomputes busy from its inputs under the busy cell's lock, so concurrent refreshes
    // cannot publish the same edge twice or publish edges out of order.
    fn refresh_busy(&self) {
        self.busy.update_if(|busy| {
            let next =
                self.engine.get() == EngineState::Downloading || self.quick_count.get() > 0;
            if *busy == next {
                return false;
            }
            *busy = next;
            self.event_tx.send(Event::BusyChanged { busy: next }).ok();
            true
        });
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn store() -> TaskStateStore {
        let (event_tx, _rx) = broadcast::channel(64);
        TaskStateStore::new(event_tx)
    }

    fn drain<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> Vec<T> {
        let mut out = Vec::new();
        while let Ok(value) = rx.try_recv() {
            out.push(value);
        }
        out
    }

    #[test]
    fn cell_publishes_every_update_in_order() {
        let cell = StateCell::new(0u32);
        let mut rx = cell.subscribe();

        for i in 1..=100 {
            cell.set(i);
        }

        assert_eq!(drain(&mut rx), (1..=100).collect::<Vec<_>>());
        assert_eq!(cell.get(), 100);
    }

    #[test]
    fn cell_prunes_dropped_subscribers() {
        let cell = StateCell::new(0u32);
        let rx = cell.subscribe();
        drop(rx);
        cell.set(1);
        assert!(lock(&cell.inner).subscribers.is_empty());
    }

    #[test]
    fn compare_and_set_only_swaps_expected() {
        let cell = StateCell::new(EngineState::Idle);
        assert!(cell.compare_and_set(&EngineState::Idle, EngineState::Downloading));
        assert!(!cell.compare_and_set(&EngineState::Idle, EngineState::Downloading));
        assert_eq!(cell.get(), EngineState::Downloading);
    }

    #[test]
    fn second_begin_is_rejected() {
        let store = store();
        assert!(store.try_begin_named());
        assert!(!store.try_begin_named());
        store.finish_named();
        assert_eq!(store.engine_state(), EngineState::Idle);
        assert!(store.try_begin_named());
    }

    #[test]
    fn busy_tracks_named_and_quick() {
        let store = store();
        let mut busy = store.subscribe_busy();

        store.increment_quick();
        store.try_begin_named();
        store.decrement_quick();
        store.finish_named();

        assert_eq!(drain(&mut busy), vec![true, false]);
        assert!(!store.is_busy());
    }

    #[test]
    fn quick_counter_never_underflows() {
        let store = store();
        store.decrement_quick();
        assert_eq!(store.quick_count(), 0);
        assert!(!store.is_busy());
    }

    #[test]
    fn busy_edges_alternate_under_contention() {
        let store = Arc::new(store());
        let mut busy = store.subscribe_busy();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        if i % 2 == 0 {
                            store.increment_quick();
                            store.decrement_quick();
                        } else if store.try_begin_named() {
                            store.finish_named();
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let edges = drain(&mut busy);
        assert!(!edges.is_empty());
        for pair in edges.windows(2) {
            assert_ne!(pair[0], pair[1], "busy edges must alternate");
        }
        assert_eq!(edges.first(), Some(&true));
        assert_eq!(edges.last(), Some(&false));
        assert!(!store.is_busy());
    }

    #[test]
    fn transitions_are_mirrored_as_events() {
        let (event_tx, mut events) = broadcast::channel(16);
        let store = TaskStateStore::new(event_tx);

        store.try_begin_named();
        store.finish_named();

        let mut kinds = Vec::new();
        while let Ok(event) = events.try_recv() {
            kinds.push(match event {
                Event::StateChanged { state } => format!("state:{:?}", state),
                Event::BusyChanged { busy } => format!("busy:{}", busy),
                other => format!("{:?}", other),
            });
        }
        assert_eq!(
            kinds,
            vec!["state:Downloading", "busy:true", "state:Idle", "busy:false"]
        );
    }
}

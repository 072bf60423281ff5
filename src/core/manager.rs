//! Debounced deferred-task manager.
//!
//! A [`Manager`] runs a task once after a delay. Tasks are keyed by id:
//! scheduling an id that already has an entry cancels the old entry and
//! installs the new one, so bursts of schedules collapse into a single run.
//!
//! # Lifecycle of an entry
//!
//! ```text
//! Scheduled ──► Cancelled
//!     │
//!     ▼
//! TimerFired ──► ClosedAbort
//!     │
//!     ▼
//! AcquiringSlot ──► Dropped | CancelledWhileWaiting
//!     │
//!     ▼
//! Running ──► Completed
//! ```
//!
//! Every terminal state removes the entry at most once, and only if it is
//! still the current entry for its id, so a replaced instance finishing late
//! never evicts its successor.
//!
//! # Locking
//!
//! The registry lives behind a `parking_lot::RwLock`. Schedule, cancel, and
//! self-removal take the write lock. The fire path takes the read lock to
//! check `closed` and register the body with the drain tracker; shutdown flips
//! `closed` under the write lock. A fired timer is therefore either excluded
//! entirely or counted before shutdown starts waiting. No lock is held across
//! an `.await`.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Once, RwLock};
use tokio::runtime::Runtime;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::builders::ManagerBuilder;
use crate::core::entry::Entry;
use crate::core::gate::{AdmissionGate, Rejection};
use crate::core::stats::{ManagerCounters, ManagerStats, RunningGuard};
use crate::core::{SchedulerError, Spawn, TelemetrySink};
use crate::runtime::TokioSpawner;
use crate::util::clock::millis_u64;

#[derive(Debug, Default)]
struct Registry {
    closed: bool,
    entries: HashMap<String, Entry>,
}

struct Shared<S> {
    registry: RwLock<Registry>,
    gate: AdmissionGate,
    sink: Arc<dyn TelemetrySink>,
    spawner: S,
    /// Counts task bodies past the fire check; shutdown drains against it.
    tracker: TaskTracker,
    close_once: Once,
    next_generation: AtomicU64,
    counters: ManagerCounters,
}

/// Coordinates delayed tasks keyed by id.
///
/// Cloning is cheap; clones share one registry.
///
/// When the spawner owns its runtime, the handles own it instead: dropping
/// the last handle shuts the runtime down, abandoning pending timers and
/// running bodies. Drop it outside of async context, after `shutdown` if
/// running bodies should finish.
pub struct Manager<S: Spawn = TokioSpawner> {
    shared: Arc<Shared<S>>,
    /// Declared after `shared` so the runtime outlives this handle's share.
    runtime: Option<Arc<Runtime>>,
}

impl<S: Spawn> Clone for Manager<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            runtime: self.runtime.clone(),
        }
    }
}

impl<S: Spawn> fmt::Debug for Manager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.shared.registry.read();
        f.debug_struct("Manager")
            .field("closed", &registry.closed)
            .field("pending", &registry.entries.len())
            .field("gate", &self.shared.gate)
            .field("owns_runtime", &self.runtime.is_some())
            .finish_non_exhaustive()
    }
}

impl Manager<TokioSpawner> {
    /// Manager without a concurrency limit on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Runtime`] when called outside a tokio runtime.
    pub fn new() -> Result<Self, SchedulerError> {
        ManagerBuilder::new().build()
    }

    /// Start configuring a manager.
    #[must_use]
    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::new()
    }
}

impl<S: Spawn> Manager<S> {
    pub(crate) fn from_parts(
        gate: AdmissionGate,
        sink: Arc<dyn TelemetrySink>,
        mut spawner: S,
    ) -> Self {
        let runtime = spawner.take_runtime();
        Self {
            runtime,
            shared: Arc::new(Shared {
                registry: RwLock::new(Registry::default()),
                gate,
                sink,
                spawner,
                tracker: TaskTracker::new(),
                close_once: Once::new(),
                next_generation: AtomicU64::new(0),
                counters: ManagerCounters::default(),
            }),
        }
    }

    /// Schedule `task` to run once after `delay` under `id`.
    ///
    /// An existing entry for `id` is stopped and replaced whether it is still
    /// waiting on its timer, waiting for a slot, or already running; a running
    /// body only sees its token cancelled. After shutdown this is a no-op.
    ///
    /// The task receives a token that is cancelled when the entry is
    /// replaced, cancelled, or shut down.
    pub fn schedule<F, Fut>(&self, id: impl Into<String>, delay: Duration, task: F)
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = id.into();
        let shared = &self.shared;

        let mut registry = shared.registry.write();
        if registry.closed {
            tracing::debug!(task_id = %id, "manager closed, schedule ignored");
            return;
        }

        if let Some(old) = registry.entries.remove(&id) {
            old.stop();
            ManagerCounters::bump(&shared.counters.rescheduled);
            tracing::debug!(task_id = %id, "replacing pending task");
            shared.sink.on_rescheduled(&id);
        } else {
            ManagerCounters::bump(&shared.counters.scheduled);
            tracing::debug!(task_id = %id, delay_ms = millis_u64(delay), "task scheduled");
            shared.sink.on_scheduled(&id, delay);
        }

        let generation = shared.next_generation.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        let timer = {
            let owner = Arc::clone(shared);
            let id = id.clone();
            let token = token.clone();
            shared.spawner.spawn(async move {
                tokio::time::sleep(delay).await;
                Shared::fire(&owner, id, generation, token, task);
            })
        };

        registry.entries.insert(
            id,
            Entry {
                generation,
                token,
                timer,
            },
        );
    }

    /// Cancel the entry for `id`, if any.
    ///
    /// A timer that has not fired is stopped; a body waiting for a slot or
    /// running has its token cancelled. Unknown ids are ignored.
    pub fn cancel(&self, id: &str) {
        let shared = &self.shared;
        let mut registry = shared.registry.write();
        if let Some(entry) = registry.entries.remove(id) {
            entry.stop();
            ManagerCounters::bump(&shared.counters.cancelled);
            tracing::debug!(task_id = id, "task cancelled");
            shared.sink.on_cancelled(id);
        }
    }

    /// Close the manager and wait up to `timeout` for running tasks.
    ///
    /// See [`Manager::shutdown_until`].
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::ShutdownTimeout`] if tasks are still running
    /// when `timeout` elapses.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), SchedulerError> {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.shutdown_until(deadline).await,
            None => {
                self.close();
                self.shared.tracker.wait().await;
                Ok(())
            }
        }
    }

    /// Close the manager and wait until `deadline` for running tasks.
    ///
    /// The first call cancels and removes every entry; later and concurrent
    /// calls only wait. A timed-out call leaves the drain in progress, so a
    /// retry with a later deadline can still succeed. Once drained, every
    /// call returns `Ok(())`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::ShutdownTimeout`] if tasks are still running
    /// at `deadline`.
    pub async fn shutdown_until(&self, deadline: Instant) -> Result<(), SchedulerError> {
        self.close();
        match tokio::time::timeout_at(deadline, self.shared.tracker.wait()).await {
            Ok(()) => {
                tracing::debug!("manager drained");
                Ok(())
            }
            Err(_) => {
                tracing::warn!(
                    running = self.shared.tracker.len(),
                    "shutdown deadline exceeded with tasks still running"
                );
                Err(SchedulerError::ShutdownTimeout)
            }
        }
    }

    fn close(&self) {
        let shared = &self.shared;
        shared.close_once.call_once(|| {
            let mut registry = shared.registry.write();
            registry.closed = true;
            let cancelled = registry.entries.len();
            for (id, entry) in registry.entries.drain() {
                entry.stop();
                ManagerCounters::bump(&shared.counters.cancelled);
                shared.sink.on_cancelled(&id);
            }
            shared.tracker.close();
            tracing::info!(cancelled, running = shared.tracker.len(), "manager closed");
        });
    }

    /// Whether an entry is registered for `id`.
    #[must_use]
    pub fn is_pending(&self, id: &str) -> bool {
        self.shared.registry.read().entries.contains_key(id)
    }

    /// Number of registered entries.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.shared.registry.read().entries.len()
    }

    /// Whether shutdown has started.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.registry.read().closed
    }

    /// The admission gate this manager runs bodies through.
    #[must_use]
    pub fn gate(&self) -> &AdmissionGate {
        &self.shared.gate
    }

    /// Snapshot of manager activity.
    #[must_use]
    pub fn stats(&self) -> ManagerStats {
        let pending = self.pending_count();
        self.shared.counters.snapshot(pending)
    }
}

impl<S: Spawn> Shared<S> {
    /// Timer callback. Decides under the read lock whether the body may
    /// start, and if so registers it with the tracker before releasing it.
    fn fire<F, Fut>(
        this: &Arc<Self>,
        id: String,
        generation: u64,
        token: CancellationToken,
        task: F,
    ) where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let registry = this.registry.read();
        if registry.closed || token.is_cancelled() {
            token.cancel();
            tracing::debug!(task_id = %id, closed = registry.closed, "fired task aborted");
            return;
        }

        let run = Arc::clone(this).run(id, generation, token, task);
        this.spawner.spawn(this.tracker.track_future(run));
        drop(registry);
    }

    async fn run<F, Fut>(
        self: Arc<Self>,
        id: String,
        generation: u64,
        token: CancellationToken,
        task: F,
    ) where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let _cancel_on_exit = token.clone().drop_guard();

        let slot = match self.gate.acquire(&token).await {
            Ok(slot) => slot,
            Err(Rejection::Dropped) => {
                ManagerCounters::bump(&self.counters.dropped);
                tracing::warn!(task_id = %id, "task dropped: concurrency limit reached");
                self.sink.on_failed(&id, &SchedulerError::Dropped);
                self.remove_if_current(&id, generation);
                return;
            }
            Err(Rejection::Cancelled) => {
                tracing::debug!(task_id = %id, "task cancelled while waiting for a slot");
                self.remove_if_current(&id, generation);
                return;
            }
        };

        if token.is_cancelled() {
            drop(slot);
            tracing::debug!(task_id = %id, "task cancelled before start");
            self.remove_if_current(&id, generation);
            return;
        }

        tracing::debug!(task_id = %id, "executing task");
        let started = Instant::now();
        {
            let _running = RunningGuard::enter(&self.counters);
            task(token.clone()).await;
        }
        let elapsed = started.elapsed();
        drop(slot);

        self.remove_if_current(&id, generation);
        ManagerCounters::bump(&self.counters.executed);
        tracing::debug!(task_id = %id, elapsed_ms = millis_u64(elapsed), "task completed");
        self.sink.on_executed(&id, elapsed);
    }

    /// Remove the entry for `id` only if it is still the given generation.
    fn remove_if_current(&self, id: &str, generation: u64) {
        let mut registry = self.registry.write();
        if registry
            .entries
            .get(id)
            .is_some_and(|current| current.generation == generation)
        {
            registry.entries.remove(id);
        }
    }
}

//! Telemetry sink implementations.
//!
//! The manager reports every lifecycle transition of a task through a
//! [`TelemetrySink`]. Sinks are called synchronously from the manager's
//! internal tasks, sometimes while the registry lock is held, so they must
//! return promptly and must not call back into the manager.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::SchedulerError;
use crate::util::clock::{millis_u64, now_ms};

/// Receives lifecycle events for scheduled tasks.
///
/// Every method defaults to a no-op, so implementations only override the
/// events they care about.
pub trait TelemetrySink: Send + Sync {
    /// A task was scheduled under an id that had no pending entry.
    fn on_scheduled(&self, _id: &str, _delay: Duration) {}
    /// A task replaced the pending or running entry of the same id.
    fn on_rescheduled(&self, _id: &str) {}
    /// A task body returned.
    fn on_executed(&self, _id: &str, _elapsed: Duration) {}
    /// A pending or running entry was cancelled (manually or by shutdown).
    fn on_cancelled(&self, _id: &str) {}
    /// A fired task could not run.
    fn on_failed(&self, _id: &str, _error: &SchedulerError) {}
}

impl<T: TelemetrySink + ?Sized> TelemetrySink for Arc<T> {
    fn on_scheduled(&self, id: &str, delay: Duration) {
        (**self).on_scheduled(id, delay);
    }

    fn on_rescheduled(&self, id: &str) {
        (**self).on_rescheduled(id);
    }

    fn on_executed(&self, id: &str, elapsed: Duration) {
        (**self).on_executed(id, elapsed);
    }

    fn on_cancelled(&self, id: &str) {
        (**self).on_cancelled(id);
    }

    fn on_failed(&self, id: &str, error: &SchedulerError) {
        (**self).on_failed(id, error);
    }
}

/// Sink that discards every event. Used when no sink is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NopSink;

impl TelemetrySink for NopSink {}

/// Sink that forwards events to `tracing` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn on_scheduled(&self, id: &str, delay: Duration) {
        tracing::debug!(task_id = id, delay_ms = millis_u64(delay), "task scheduled");
    }

    fn on_rescheduled(&self, id: &str) {
        tracing::debug!(task_id = id, "task rescheduled");
    }

    fn on_executed(&self, id: &str, elapsed: Duration) {
        tracing::info!(task_id = id, elapsed_ms = millis_u64(elapsed), "task executed");
    }

    fn on_cancelled(&self, id: &str) {
        tracing::debug!(task_id = id, "task cancelled");
    }

    fn on_failed(&self, id: &str, error: &SchedulerError) {
        tracing::warn!(task_id = id, error = %error, "task failed");
    }
}

/// Kind of a recorded telemetry event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryKind {
    /// See [`TelemetrySink::on_scheduled`].
    Scheduled,
    /// See [`TelemetrySink::on_rescheduled`].
    Rescheduled,
    /// See [`TelemetrySink::on_executed`].
    Executed,
    /// See [`TelemetrySink::on_cancelled`].
    Cancelled,
    /// See [`TelemetrySink::on_failed`].
    Failed,
}

impl fmt::Display for TelemetryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scheduled => "scheduled",
            Self::Rescheduled => "rescheduled",
            Self::Executed => "executed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A recorded telemetry event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryEvent {
    /// What happened.
    pub kind: TelemetryKind,
    /// Task id the event refers to.
    pub task_id: String,
    /// Delay for `Scheduled`, elapsed time for `Executed`.
    pub duration: Option<Duration>,
    /// Error for `Failed`.
    pub error: Option<SchedulerError>,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// Helper to build a telemetry event stamped with the current time.
pub fn build_telemetry_event(
    kind: TelemetryKind,
    task_id: impl Into<String>,
    duration: Option<Duration>,
    error: Option<SchedulerError>,
) -> TelemetryEvent {
    TelemetryEvent {
        kind,
        task_id: task_id.into(),
        duration,
        error,
        created_at_ms: now_ms(),
    }
}

/// In-memory sink with a bounded buffer, for tests and diagnostics.
///
/// When the buffer is full the oldest event is evicted.
pub struct InMemorySink {
    events: Mutex<VecDeque<TelemetryEvent>>,
    max_events: usize,
}

impl InMemorySink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events)),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Stored events of one kind, oldest first.
    pub fn events_of(&self, kind: TelemetryKind) -> Vec<TelemetryEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    /// Number of stored events of `kind` for `task_id`.
    pub fn count(&self, kind: TelemetryKind, task_id: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.kind == kind && e.task_id == task_id)
            .count()
    }

    fn record(&self, event: TelemetryEvent) {
        if self.max_events == 0 {
            return;
        }
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

impl Default for InMemorySink {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl fmt::Debug for InMemorySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemorySink")
            .field("len", &self.events.lock().len())
            .field("max_events", &self.max_events)
            .finish()
    }
}

impl TelemetrySink for InMemorySink {
    fn on_scheduled(&self, id: &str, delay: Duration) {
        self.record(build_telemetry_event(TelemetryKind::Scheduled, id, Some(delay), None));
    }

    fn on_rescheduled(&self, id: &str) {
        self.record(build_telemetry_event(TelemetryKind::Rescheduled, id, None, None));
    }

    fn on_executed(&self, id: &str, elapsed: Duration) {
        self.record(build_telemetry_event(TelemetryKind::Executed, id, Some(elapsed), None));
    }

    fn on_cancelled(&self, id: &str) {
        self.record(build_telemetry_event(TelemetryKind::Cancelled, id, None, None));
    }

    fn on_failed(&self, id: &str, error: &SchedulerError) {
        self.record(build_telemetry_event(
            TelemetryKind::Failed,
            id,
            None,
            Some(error.clone()),
        ));
    }
}

//! Manager statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of manager activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagerStats {
    /// Entries currently registered (waiting on a timer, a slot, or running).
    pub pending: usize,
    /// Task bodies executing right now.
    pub running: u64,
    /// Schedules that created a new entry.
    pub scheduled: u64,
    /// Schedules that replaced an existing entry.
    pub rescheduled: u64,
    /// Task bodies that returned.
    pub executed: u64,
    /// Entries cancelled manually or by shutdown.
    pub cancelled: u64,
    /// Fired tasks rejected by the drop strategy.
    pub dropped: u64,
}

/// Internal counters for manager statistics (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct ManagerCounters {
    pub running: AtomicU64,
    pub scheduled: AtomicU64,
    pub rescheduled: AtomicU64,
    pub executed: AtomicU64,
    pub cancelled: AtomicU64,
    pub dropped: AtomicU64,
}

impl ManagerCounters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self, pending: usize) -> ManagerStats {
        ManagerStats {
            pending,
            running: self.running.load(Ordering::Relaxed),
            scheduled: self.scheduled.load(Ordering::Relaxed),
            rescheduled: self.rescheduled.load(Ordering::Relaxed),
            executed: self.executed.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Marks one body as running for as long as it lives.
pub(crate) struct RunningGuard<'a> {
    counters: &'a ManagerCounters,
}

impl<'a> RunningGuard<'a> {
    pub fn enter(counters: &'a ManagerCounters) -> Self {
        counters.running.fetch_add(1, Ordering::Relaxed);
        Self { counters }
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.counters.running.fetch_sub(1, Ordering::Relaxed);
    }
}

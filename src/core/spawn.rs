//! Abstraction over where timers and task bodies run.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Runtime;
use tokio::task::AbortHandle;

/// Abstraction for spawning work on a runtime.
///
/// The returned handle lets the manager stop a timer that has not fired yet.
pub trait Spawn: Send + Sync + 'static {
    /// Spawn a future and return a handle that can abort it.
    fn spawn<F>(&self, fut: F) -> AbortHandle
    where
        F: Future<Output = ()> + Send + 'static;

    /// Hand over a runtime this spawner owns, leaving only a handle behind.
    ///
    /// The manager keeps the returned runtime in its caller-facing handles
    /// rather than in state shared with spawned futures, so the runtime is
    /// never dropped from one of its own workers.
    fn take_runtime(&mut self) -> Option<Arc<Runtime>> {
        None
    }
}

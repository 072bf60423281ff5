//! Per-id registry entry.

use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;

/// Live state of one scheduled instance of a task.
///
/// An entry is never mutated after creation; a new schedule under the same
/// id installs a fresh entry with a higher generation.
#[derive(Debug)]
pub(crate) struct Entry {
    /// Identity of this instance, unique within a manager.
    pub generation: u64,
    /// Cancelled when the entry is replaced, cancelled, or shut down, and on
    /// every exit path of the task itself.
    pub token: CancellationToken,
    /// Delay timer. Aborting it before it fires prevents execution.
    pub timer: AbortHandle,
}

impl Entry {
    /// Stop the timer and signal the body, whichever stage it is in.
    pub fn stop(&self) {
        self.timer.abort();
        self.token.cancel();
    }
}

//! Admission gate bounding how many task bodies run at once.
//!
//! Without a limit every acquisition succeeds immediately. With a limit of
//! `N` the gate owns a semaphore of `N` permits and a [`Strategy`] deciding
//! what a fired task does when all permits are taken.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// Behaviour when the concurrency limit is reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Wait for a slot, giving up if the task is cancelled meanwhile.
    #[default]
    Block,
    /// Reject the execution immediately.
    Drop,
}

/// Why an acquisition did not produce a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Drop strategy found no free slot.
    Dropped,
    /// The task's token was cancelled before a slot was granted.
    Cancelled,
}

/// A held admission slot. Dropping it returns the slot to the gate.
#[derive(Debug)]
pub struct Slot {
    permit: Option<OwnedSemaphorePermit>,
}

impl Slot {
    const fn unlimited() -> Self {
        Self { permit: None }
    }

    /// Whether this slot counts against a concurrency limit.
    #[must_use]
    pub const fn is_limited(&self) -> bool {
        self.permit.is_some()
    }
}

#[derive(Debug, Clone)]
struct Limit {
    semaphore: Arc<Semaphore>,
    max: usize,
    strategy: Strategy,
}

/// Bounded-capacity guard shared by every task of a manager.
#[derive(Debug, Clone, Default)]
pub struct AdmissionGate {
    limit: Option<Limit>,
}

impl AdmissionGate {
    /// Gate without a limit.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self { limit: None }
    }

    /// Gate allowing at most `max` concurrent bodies. A `max` of zero yields
    /// an unlimited gate.
    #[must_use]
    pub fn limited(max: usize, strategy: Strategy) -> Self {
        if max == 0 {
            return Self::unlimited();
        }
        Self {
            limit: Some(Limit {
                semaphore: Arc::new(Semaphore::new(max)),
                max,
                strategy,
            }),
        }
    }

    /// Configured limit, `None` when unlimited.
    #[must_use]
    pub fn max_concurrent(&self) -> Option<usize> {
        self.limit.as_ref().map(|l| l.max)
    }

    /// Configured strategy, `None` when unlimited.
    #[must_use]
    pub fn strategy(&self) -> Option<Strategy> {
        self.limit.as_ref().map(|l| l.strategy)
    }

    /// Free slots right now, `None` when unlimited.
    #[must_use]
    pub fn available(&self) -> Option<usize> {
        self.limit.as_ref().map(|l| l.semaphore.available_permits())
    }

    /// Take a slot according to the configured strategy.
    ///
    /// Under [`Strategy::Block`] this waits until a slot frees up or `token`
    /// is cancelled; cancellation wins when both are ready.
    pub async fn acquire(&self, token: &CancellationToken) -> Result<Slot, Rejection> {
        let Some(limit) = &self.limit else {
            return Ok(Slot::unlimited());
        };

        match limit.strategy {
            Strategy::Drop => Arc::clone(&limit.semaphore)
                .try_acquire_owned()
                .map(|permit| Slot {
                    permit: Some(permit),
                })
                .map_err(|_| Rejection::Dropped),
            Strategy::Block => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => Err(Rejection::Cancelled),
                    permit = Arc::clone(&limit.semaphore).acquire_owned() => permit
                        .map(|permit| Slot { permit: Some(permit) })
                        // The semaphore is never closed; treat it like a cancellation.
                        .map_err(|_| Rejection::Cancelled),
                }
            }
        }
    }
}

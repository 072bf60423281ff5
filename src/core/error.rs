//! Error types for scheduler operations.

use thiserror::Error;

/// Errors produced by scheduler components.
///
/// `schedule` and `cancel` never fail synchronously. `Dropped` only ever
/// reaches callers through [`TelemetrySink::on_failed`](crate::core::TelemetrySink::on_failed);
/// `ShutdownTimeout` is the only error returned from the public lifecycle API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// The drop strategy rejected a fired task because no slot was free.
    #[error("task dropped due to concurrency limit")]
    Dropped,
    /// Shutdown deadline elapsed before all running tasks returned.
    #[error("shutdown deadline exceeded")]
    ShutdownTimeout,
    /// No tokio runtime was available to drive timers and tasks.
    #[error("runtime unavailable: {0}")]
    Runtime(String),
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SchedulerError {
    /// Whether this error is the admission rejection of the drop strategy.
    #[must_use]
    pub const fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped)
    }

    /// Whether this error is a shutdown deadline expiry.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::ShutdownTimeout)
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

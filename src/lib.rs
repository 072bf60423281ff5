//! # Prometheus Pending
//!
//! An in-process, debounced deferred-task scheduler for the Prometheus AI Platform.
//!
//! Callers register a named unit of work to run once after a delay. Scheduling
//! the same name again replaces the earlier work, so a burst of schedules for
//! one id collapses into a single execution. Work can be cancelled by name,
//! bounded by a concurrency limit, and drained gracefully on shutdown.
//!
//! ## Key Features
//!
//! - **Debounce by id**: a new schedule cancels and supersedes the previous entry
//! - **Cooperative cancellation**: every task receives a `CancellationToken`
//! - **Admission control**: optional concurrency limit that blocks or drops
//! - **Graceful shutdown**: cancel everything pending, then wait for running
//!   bodies with a retryable deadline
//! - **Telemetry**: pluggable sinks for logs, metrics, or tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use prometheus_pending::core::{Manager, Strategy, TracingSink};
//!
//! let manager = Manager::builder()
//!     .with_limit(1, Strategy::Drop)
//!     .with_sink(TracingSink)
//!     .build()?;
//!
//! manager.schedule("email:user-42", Duration::from_secs(2), |token| async move {
//!     tokio::select! {
//!         _ = token.cancelled() => {}
//!         _ = send_digest() => {}
//!     }
//! });
//!
//! manager.shutdown(Duration::from_secs(5)).await?;
//! ```
//!
//! Non-goals: no persistence, no recurring schedules, no ordering across ids,
//! and no delay precision beyond the tokio timer.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: manager, admission gate, telemetry.
pub mod core;
/// Configuration models for the manager.
pub mod config;
/// Builders to construct managers from options or configuration.
pub mod builders;
/// Runtime adapters driving timers and task bodies.
pub mod runtime;
/// Shared utilities.
pub mod util;

pub use crate::builders::ManagerBuilder;
pub use crate::core::{Manager, SchedulerError, Strategy, TelemetrySink};
pub use tokio_util::sync::CancellationToken;

//! Core scheduling abstractions: the manager, its admission gate, and telemetry.

pub mod error;
pub mod gate;
pub mod manager;
pub mod spawn;
pub mod stats;
pub mod telemetry;

mod entry;

pub use error::{AppResult, SchedulerError};
pub use gate::{AdmissionGate, Rejection, Slot, Strategy};
pub use manager::Manager;
pub use spawn::Spawn;
pub use stats::ManagerStats;
pub use telemetry::{
    build_telemetry_event, InMemorySink, NopSink, TelemetryEvent, TelemetryKind, TelemetrySink,
    TracingSink,
};

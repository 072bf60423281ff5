//! Configuration models for the manager.

pub mod manager;

pub use manager::{LimitConfig, ManagerConfig, ENV_MAX_CONCURRENT, ENV_STRATEGY};

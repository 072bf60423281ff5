//! Builders to construct managers from options or configuration.

pub mod manager_builder;

pub use manager_builder::ManagerBuilder;

//! Runtime adapters driving timers and task bodies.

pub mod tokio_spawner;

pub use tokio_spawner::TokioSpawner;

//! Builder assembling a [`Manager`] from options or configuration.

use std::fmt;
use std::sync::Arc;

use crate::config::ManagerConfig;
use crate::core::{AdmissionGate, Manager, NopSink, SchedulerError, Spawn, Strategy, TelemetrySink};
use crate::runtime::TokioSpawner;

/// Configures and builds a [`Manager`].
///
/// ```rust,ignore
/// use prometheus_pending::core::{Strategy, TracingSink};
/// use prometheus_pending::builders::ManagerBuilder;
///
/// let manager = ManagerBuilder::new()
///     .with_limit(4, Strategy::Drop)
///     .with_sink(TracingSink)
///     .build()?;
/// ```
#[derive(Clone)]
pub struct ManagerBuilder {
    limit: Option<(usize, Strategy)>,
    sink: Arc<dyn TelemetrySink>,
}

impl ManagerBuilder {
    /// Builder for an unlimited manager with a no-op sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            limit: None,
            sink: Arc::new(NopSink),
        }
    }

    /// Builder seeded from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfig`] if `cfg` fails validation.
    pub fn from_config(cfg: &ManagerConfig) -> Result<Self, SchedulerError> {
        cfg.validate().map_err(SchedulerError::InvalidConfig)?;
        let builder = Self::new();
        Ok(match cfg.limit {
            Some(limit) => builder.with_limit(limit.max_concurrent, limit.strategy),
            None => builder,
        })
    }

    /// Run at most `max` bodies at once. A `max` of zero keeps the manager
    /// unlimited.
    #[must_use]
    pub fn with_limit(mut self, max: usize, strategy: Strategy) -> Self {
        if max > 0 {
            self.limit = Some((max, strategy));
        }
        self
    }

    /// Report lifecycle events to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: impl TelemetrySink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Report lifecycle events to a shared sink; `None` keeps the current one.
    #[must_use]
    pub fn with_optional_sink(mut self, sink: Option<Arc<dyn TelemetrySink>>) -> Self {
        if let Some(sink) = sink {
            self.sink = sink;
        }
        self
    }

    /// Configured limit and strategy, if any.
    #[must_use]
    pub const fn limit(&self) -> Option<(usize, Strategy)> {
        self.limit
    }

    /// Build on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Runtime`] when called outside a tokio runtime.
    pub fn build(self) -> Result<Manager<TokioSpawner>, SchedulerError> {
        let spawner = TokioSpawner::current()?;
        Ok(self.build_with_spawner(spawner))
    }

    /// Build with an explicit spawner.
    #[must_use]
    pub fn build_with_spawner<S: Spawn>(self, spawner: S) -> Manager<S> {
        let gate = match self.limit {
            Some((max, strategy)) => AdmissionGate::limited(max, strategy),
            None => AdmissionGate::unlimited(),
        };
        tracing::debug!(
            max_concurrent = ?gate.max_concurrent(),
            strategy = ?gate.strategy(),
            "building manager"
        );
        Manager::from_parts(gate, self.sink, spawner)
    }
}

impl Default for ManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ManagerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerBuilder")
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

//! Manager configuration structures.

use std::env;

use serde::{Deserialize, Serialize};

use crate::core::{SchedulerError, Strategy};

/// Environment variable holding the concurrency limit.
pub const ENV_MAX_CONCURRENT: &str = "PENDING_MAX_CONCURRENT";
/// Environment variable holding the limit strategy (`block` or `drop`).
pub const ENV_STRATEGY: &str = "PENDING_STRATEGY";

/// Concurrency limit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitConfig {
    /// Maximum task bodies running at once.
    pub max_concurrent: usize,
    /// Behaviour when the limit is reached.
    #[serde(default)]
    pub strategy: Strategy,
}

/// Root manager configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Concurrency limit; absent means unlimited.
    #[serde(default)]
    pub limit: Option<LimitConfig>,
}

impl LimitConfig {
    /// Validate limit values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrent == 0 {
            return Err("max_concurrent must be greater than 0".into());
        }
        Ok(())
    }
}

impl ManagerConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(limit) = &self.limit {
            limit.validate().map_err(|e| format!("limit invalid: {e}"))?;
        }
        Ok(())
    }

    /// Parse manager configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, SchedulerError> {
        let cfg: Self = serde_json::from_str(input)
            .map_err(|e| SchedulerError::InvalidConfig(format!("parse error: {e}")))?;
        cfg.validate().map_err(SchedulerError::InvalidConfig)?;
        Ok(cfg)
    }

    /// Read configuration from the process environment, loading a `.env`
    /// file first if one exists.
    ///
    /// Without `PENDING_MAX_CONCURRENT` the manager is unlimited.
    /// `PENDING_STRATEGY` defaults to `block`.
    pub fn from_env() -> Result<Self, SchedulerError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SchedulerError> {
        let Some(raw_max) = lookup(ENV_MAX_CONCURRENT) else {
            return Ok(Self::default());
        };
        let max_concurrent = raw_max.trim().parse::<usize>().map_err(|e| {
            SchedulerError::InvalidConfig(format!("{ENV_MAX_CONCURRENT}={raw_max}: {e}"))
        })?;
        let strategy = match lookup(ENV_STRATEGY) {
            None => Strategy::default(),
            Some(raw) => parse_strategy(&raw).ok_or_else(|| {
                SchedulerError::InvalidConfig(format!("{ENV_STRATEGY}={raw}: expected block or drop"))
            })?,
        };

        let cfg = Self {
            limit: Some(LimitConfig {
                max_concurrent,
                strategy,
            }),
        };
        cfg.validate().map_err(SchedulerError::InvalidConfig)?;
        Ok(cfg)
    }
}

fn parse_strategy(raw: &str) -> Option<Strategy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "block" => Some(Strategy::Block),
        "drop" => Some(Strategy::Drop),
        _ => None,
    }
}

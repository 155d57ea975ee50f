//! Runtime configuration for the asynchronous wrapper.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_WORKER_NAME: &str = "stratum-worker";
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Errors that can occur while loading or checking an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse engine configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Queue capacity must be at least 1")]
    ZeroCapacity,
}

/// Settings for [`AsyncStateMachine`](crate::asynchronous::AsyncStateMachine).
///
/// Every field has a default, so a partial (or empty) JSON object is valid.
///
/// # Example
///
/// ```rust
/// use stratum::config::EngineConfig;
///
/// let config = EngineConfig::from_json(r#"{ "queue_capacity": 16 }"#).unwrap();
///
/// assert_eq!(config.queue_capacity, 16);
/// assert_eq!(config.worker_name, "stratum-worker");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Name of the worker thread that runs queued events.
    pub worker_name: String,
    /// Maximum number of events waiting to be run.
    pub queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_name: DEFAULT_WORKER_NAME.to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }

    pub fn with_worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = name.into();
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}

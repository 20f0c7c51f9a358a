//! Catch-up configuration.

use std::num::NonZeroUsize;

use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable holding the batch size.
pub const BATCH_SIZE_ENV: &str = "EVENTLOG_CATCH_UP_BATCH_SIZE";

/// Settings of a [`CatchUp`](crate::CatchUp).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatchUpConfig {
    /// Number of events applied between two checkpoint updates.
    pub batch_size: NonZeroUsize,
}

impl Default for CatchUpConfig {
    fn default() -> Self {
        Self {
            batch_size: NonZeroUsize::MIN,
        }
    }
}

impl CatchUpConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBatchSize` if [`BATCH_SIZE_ENV`] is set
    /// to anything but a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBatchSize` if [`BATCH_SIZE_ENV`] is set
    /// to anything but a positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let Some(value) = lookup(BATCH_SIZE_ENV) else {
            return Ok(Self::default());
        };
        let batch_size = value
            .trim()
            .parse::<NonZeroUsize>()
            .map_err(|source| ConfigError::InvalidBatchSize { value, source })?;
        Ok(Self { batch_size })
    }
}

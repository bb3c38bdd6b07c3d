//! Event-projector configuration

use serde::Deserialize;
use std::time::Duration;

use crate::application::ProjectorSettings;

use super::error::ValidationError;

/// Polling, batching, and retry configuration for the projector
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectorConfig {
    /// Sleep between polls when the feed is drained, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum events fetched per poll
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Handler attempts before an event is dead-lettered
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First retry delay in milliseconds; doubles per attempt
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Upper bound on any single retry delay, in milliseconds
    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_batch_size() -> usize {
    100
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    50
}

fn default_backoff_cap_ms() -> u64 {
    2000
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_cap_ms: default_backoff_cap_ms(),
        }
    }
}

impl ProjectorConfig {
    /// Validate projector configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.batch_size == 0 {
            return Err(ValidationError::InvalidBatchSize);
        }
        if self.backoff_base_ms > self.backoff_cap_ms {
            return Err(ValidationError::InvalidBackoff);
        }
        Ok(())
    }

    /// Convert into the settings used by the projector
    pub fn settings(&self) -> ProjectorSettings {
        ProjectorSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            batch_size: self.batch_size,
            max_retries: self.max_retries,
            backoff_base: Duration::from_millis(self.backoff_base_ms),
            backoff_cap: Duration::from_millis(self.backoff_cap_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ProjectorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.settings().batch_size, 100);
        assert_eq!(config.settings().poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn zero_batch_size_fails_validation() {
        let config = ProjectorConfig {
            batch_size: 0,
            ..ProjectorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_backoff_bounds_fail_validation() {
        let config = ProjectorConfig {
            backoff_base_ms: 5000,
            backoff_cap_ms: 100,
            ..ProjectorConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

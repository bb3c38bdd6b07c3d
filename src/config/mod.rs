//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `RENAISSANCE_` prefix and nested values use double underscores as
//! separators. Every section is fully defaultable; the defaults are the
//! documented production values.
//!
//! # Example
//!
//! ```no_run
//! use renaissance_core::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod aggregation;
mod decision;
mod error;
mod projector;

pub use aggregation::AggregationConfig;
pub use decision::DecisionConfig;
pub use error::{ConfigError, ValidationError};
pub use projector::ProjectorConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Rolling-window aggregation and burnout-risk weights
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Decision-engine thresholds and trigger weights
    #[serde(default)]
    pub decision: DecisionConfig,

    /// Projector polling and retry policy
    #[serde(default)]
    pub projector: ProjectorConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `RENAISSANCE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `RENAISSANCE__AGGREGATION__WINDOW_DAYS=7`
    /// - `RENAISSANCE__DECISION__TRIGGER_THRESHOLD=0.6`
    /// - `RENAISSANCE__PROJECTOR__BATCH_SIZE=100`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("RENAISSANCE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Checks weight sums, threshold ranges, and retry/backoff bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.aggregation.validate()?;
        self.decision.validate()?;
        self.projector.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("RENAISSANCE__AGGREGATION__WINDOW_DAYS");
        env::remove_var("RENAISSANCE__DECISION__TRIGGER_THRESHOLD");
        env::remove_var("RENAISSANCE__PROJECTOR__BATCH_SIZE");
    }

    #[test]
    fn loads_with_no_environment_set() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().expect("defaults should load");

        assert_eq!(config.aggregation.window_days, 7);
        assert_eq!(config.decision.trigger_threshold, 0.6);
        assert_eq!(config.projector.batch_size, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn environment_overrides_nested_values() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("RENAISSANCE__AGGREGATION__WINDOW_DAYS", "14");
        env::set_var("RENAISSANCE__DECISION__TRIGGER_THRESHOLD", "0.7");
        env::set_var("RENAISSANCE__PROJECTOR__BATCH_SIZE", "25");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.aggregation.window_days, 14);
        assert_eq!(config.decision.trigger_threshold, 0.7);
        assert_eq!(config.projector.batch_size, 25);
    }

    #[test]
    fn default_config_validates() {
        assert!(AppConfig::default().validate().is_ok());
    }
}

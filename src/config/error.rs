//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Weights for {0} must sum to 1.0")]
    WeightsMustSumToOne(&'static str),

    #[error("Threshold {0} is out of range")]
    ThresholdOutOfRange(&'static str),

    #[error("Window {0} must be positive")]
    InvalidWindow(&'static str),

    #[error("Projector batch size must be positive")]
    InvalidBatchSize,

    #[error("Backoff base must not exceed backoff cap")]
    InvalidBackoff,
}

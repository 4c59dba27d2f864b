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
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Invalid Redis connection timeout")]
    InvalidTimeout,

    #[error("Invalid dialog id for root_dialog")]
    InvalidRootDialog,

    #[error("Cancel keyword must be a single word")]
    InvalidCancelKeyword,
}

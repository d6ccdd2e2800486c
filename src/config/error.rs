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
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (50)")]
    PoolSizeTooLarge,

    #[error("Capture timeouts must be at least one second")]
    InvalidTimeout,

    #[error("max_silent_turns must be at least 1")]
    InvalidSilentTurns,

    #[error("Invalid language tag '{0}'")]
    InvalidLanguage(String),

    #[error("Script file not found: {0}")]
    ScriptNotFound(String),

    #[error("Invalid log filter '{0}'")]
    InvalidLogFilter(String),
}

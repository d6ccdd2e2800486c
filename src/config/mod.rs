//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `CALL_SCRIPT` prefix and
//! `__` between nested keys. Every section has defaults, so an empty
//! environment yields a runnable in-memory console host.
//!
//! # Example
//!
//! ```no_run
//! use call_script::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod capture;
mod database;
mod error;
mod logging;
mod script;

pub use capture::CaptureConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use script::ScriptConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Script file and per-call defaults
    #[serde(default)]
    pub script: ScriptConfig,

    /// Listen timing and silence budget
    #[serde(default)]
    pub capture: CaptureConfig,

    /// PostgreSQL recorder; calls are kept in memory when absent
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CALL_SCRIPT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `CALL_SCRIPT__SCRIPT__PATH=scripts/short.yaml` -> `script.path`
    /// - `CALL_SCRIPT__CAPTURE__MAX_SILENT_TURNS=5` -> `capture.max_silent_turns`
    /// - `CALL_SCRIPT__DATABASE__URL=...` -> `database.url`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CALL_SCRIPT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.script.validate()?;
        self.capture.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        self.logging.validate()?;
        Ok(())
    }
}

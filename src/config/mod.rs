//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `SLOT_FILLER` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use slot_filler::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Cancel keyword: {}", config.bot.cancel_keyword);
//! ```

mod bot;
mod error;
mod logging;
mod redis;
mod storage;

pub use bot::BotConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use redis::RedisConfig;
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// in-memory bot. Load using [`AppConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Bot behavior (names, keywords, flow definition)
    #[serde(default)]
    pub bot: BotConfig,

    /// State store selection
    #[serde(default)]
    pub storage: StorageConfig,

    /// Redis connection (used by the redis backend)
    #[serde(default)]
    pub redis: RedisConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SLOT_FILLER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `SLOT_FILLER__BOT__CANCEL_KEYWORD=stop` -> `bot.cancel_keyword = stop`
    /// - `SLOT_FILLER__STORAGE__BACKEND=redis` -> `storage.backend = redis`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SLOT_FILLER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Redis settings are only checked when the redis backend is selected.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.bot.validate()?;
        self.storage.validate()?;
        if self.storage.backend == StorageBackend::Redis {
            self.redis.validate()?;
        }
        Ok(())
    }
}

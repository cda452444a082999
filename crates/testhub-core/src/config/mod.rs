//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod database;
pub mod folder;
pub mod logging;

use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

pub use self::database::DatabaseConfig;
pub use self::folder::FolderConfig;
pub use self::logging::LoggingConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Folder hierarchy limits.
    #[serde(default)]
    pub folders: FolderConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// The file is overlaid with environment variables prefixed with
    /// `TESTHUB__` (e.g. `TESTHUB__DATABASE__URL`).
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("TESTHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        parsed.database.validate()?;
        parsed.folders.validate()?;

        debug!(
            path,
            max_depth = parsed.folders.max_depth,
            "Configuration loaded"
        );
        Ok(parsed)
    }
}

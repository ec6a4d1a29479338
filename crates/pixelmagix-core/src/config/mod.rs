//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod database;
pub mod logging;
pub mod plugin;
pub mod storage;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::plugin::PluginConfig;
pub use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged configuration
/// (default.toml + environment overlay + `PIXELMAGIX__*` variables).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Media and export storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Plugin system settings.
    #[serde(default)]
    pub plugins: PluginConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the `config/` directory.
    ///
    /// Merges `config/default.toml` with `config/{env}.toml` and environment
    /// variables prefixed with `PIXELMAGIX__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from(Path::new("config"), env)
    }

    /// Load configuration from an explicit directory.
    pub fn load_from(dir: &Path, env: &str) -> Result<Self, AppError> {
        let default_path = dir.join("default");
        let env_path = dir.join(env);

        let config = config::Config::builder()
            .add_source(config::File::with_name(&default_path.to_string_lossy()).required(false))
            .add_source(config::File::with_name(&env_path.to_string_lossy()).required(false))
            .add_source(
                config::Environment::with_prefix("PIXELMAGIX")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_applies_defaults_and_overlay() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "[database]\nurl = \"sqlite://test.db\"\n\n[server]\nport = 9000\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("testing.toml"),
            "[plugins]\nauto_load = false\n",
        )
        .unwrap();

        let config = AppConfig::load_from(dir.path(), "testing").unwrap();

        assert_eq!(config.database.url, "sqlite://test.db");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(!config.plugins.auto_load);
        assert_eq!(config.plugins.directory, "./data/plugins");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_requires_database_url() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("default.toml"), "[server]\nport = 1\n").unwrap();

        let err = AppConfig::load_from(dir.path(), "none").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }
}

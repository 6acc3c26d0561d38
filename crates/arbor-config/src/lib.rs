//! # arbor-config
//!
//! Layered configuration loading for Arbor using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`ARBOR_*` prefix, `__` as separator)
//! 2. Project-level `.arbor/config.toml`
//! 3. User-level `~/.config/arbor/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `ARBOR_STORE__PATH` -> `store.path`, `ARBOR_GENERAL__USER` -> `general.user`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use arbor_config::ArborConfig;
//!
//! let config = ArborConfig::load_with_dotenv().expect("config");
//! println!("flow store: {}", config.store.path);
//! ```

mod error;
mod general;
mod import;
mod store;

pub use error::ConfigError;
pub use general::GeneralConfig;
pub use import::ImportConfig;
pub use store::StoreConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArborConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

impl ArborConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        // A missing .env is the common case.
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Extract and validate a config from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction or validation fails.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.import.delimiter_byte()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".arbor/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("ARBOR_").split("__"))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("arbor").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_config_loads() {
        let config = ArborConfig::default();
        assert_eq!(config.store.path, ".arbor/arbor.db");
        assert!(!config.general.has_user());
        assert_eq!(config.import.delimiter_byte().unwrap(), None);
    }

    #[test]
    fn env_overrides_nested_sections() {
        Jail::expect_with(|jail| {
            jail.set_env("ARBOR_STORE__PATH", ":memory:");
            jail.set_env("ARBOR_GENERAL__USER", "agent@example.com");
            jail.set_env("ARBOR_GENERAL__DEFAULT_LIMIT", "5");

            let config = ArborConfig::load().expect("config should load");
            assert!(config.store.is_in_memory());
            assert_eq!(config.general.user, "agent@example.com");
            assert_eq!(config.general.default_limit, 5);
            Ok(())
        });
    }

    #[test]
    fn project_file_is_layered_under_env() {
        Jail::expect_with(|jail| {
            jail.create_dir(".arbor")?;
            jail.create_file(
                ".arbor/config.toml",
                r#"
                [store]
                path = "guides.db"

                [import]
                delimiter = ";"
                "#,
            )?;
            jail.set_env("ARBOR_STORE__PATH", "override.db");

            let config = ArborConfig::load().expect("config should load");
            assert_eq!(config.store.path, "override.db");
            assert_eq!(config.import.delimiter_byte().unwrap(), Some(b';'));
            Ok(())
        });
    }

    #[test]
    fn invalid_delimiter_is_rejected_at_load() {
        Jail::expect_with(|jail| {
            jail.set_env("ARBOR_IMPORT__DELIMITER", "|");
            let err = ArborConfig::load().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }));
            Ok(())
        });
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::FactoryConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl FactoryConfig {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/flux-factory/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("flux-factory").join("config.toml")
    }

    /// Loads configuration from the default config file.
    ///
    /// - If the file doesn't exist, returns `FactoryConfig::default()`.
    /// - Otherwise behaves like [`load_from`](Self::load_from).
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(FactoryConfig::default());
        }

        Self::load_from(&path)
    }

    /// Loads, parses and validates the configuration at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: FactoryConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            entities = config.entities.len(),
            "Loaded factory config"
        );
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - No entity has an empty namespace
    /// - Every entity spec honours the field naming contract
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (namespace, spec) in &self.entities {
            if namespace.is_empty() {
                return Err(ConfigError::ValidationError {
                    message: "Entity namespace can not be empty".to_string(),
                });
            }

            spec.validate().map_err(|e| ConfigError::ValidationError {
                message: format!("Entity '{}': {}", namespace, e),
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PersistenceKind, PubSubKind};

    #[test]
    fn test_config_path_suffix() {
        let path = FactoryConfig::config_path();
        assert!(path.ends_with("flux-factory/config.toml"));
    }

    #[test]
    fn test_parse_full() {
        let config: FactoryConfig = toml::from_str(
            r#"
pubsub = "synchronous"
persistent_structure = "none"

[entities.UserProfile]
birthday = ["year", "month", "day"]
gender = ["gender"]
"#,
        )
        .unwrap();

        assert_eq!(config.pubsub, Some(PubSubKind::Synchronous));
        assert_eq!(config.persistent_structure, Some(PersistenceKind::Disabled));
        assert_eq!(config.entities["UserProfile"].len(), 2);
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_keys_stay_unset() {
        let config: FactoryConfig = toml::from_str("").unwrap();
        assert!(config.pubsub.is_none());
        assert!(config.persistent_structure.is_none());
        assert!(config.entities.is_empty());
    }

    #[test]
    fn test_validate_rejects_reserved_field() {
        let config: FactoryConfig = toml::from_str(
            r#"
[entities.UserProfile]
_secret = ["value"]
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}

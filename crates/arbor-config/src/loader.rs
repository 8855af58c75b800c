//! Loading configuration from TOML or JSON

use crate::ArborConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading the configuration file failed
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// TOML syntax or schema error
    #[cfg(feature = "toml")]
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON syntax or schema error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file extension does not name a supported format
    #[error("Unsupported config format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// The configuration parsed but violates a constraint
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ArborConfig {
    /// Parse and validate a TOML document
    #[cfg(feature = "toml")]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.toml` or `.json` file, chosen by extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading arbor configuration");

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            #[cfg(feature = "toml")]
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TraversalDirection;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = ArborConfig::from_toml_str("").unwrap();
        assert_eq!(config, ArborConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = ArborConfig::from_toml_str(
            r#"
            [traversal]
            depth = 3
            direction = "outbound"

            [naming]
            filter_value = "fv"
            "#,
        )
        .unwrap();

        assert_eq!(config.traversal.depth, 3);
        assert_eq!(config.traversal.direction, TraversalDirection::Outbound);
        assert_eq!(config.naming.filter_value, "fv");
        // Untouched prefixes keep their defaults
        assert_eq!(config.naming.filter_path, "filterPath");
    }

    #[test]
    fn test_json_config() {
        let config = ArborConfig::from_json_str(r#"{"result": {"total_field": "count"}}"#)
            .unwrap();
        assert_eq!(config.result.total_field, "count");
        assert_eq!(config.result.items_field, "items");
    }

    #[test]
    fn test_invalid_values_rejected_on_load() {
        let result = ArborConfig::from_toml_str("[traversal]\ndepth = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_direction_is_parse_error() {
        let result = ArborConfig::from_json_str(r#"{"traversal": {"direction": "sideways"}}"#);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }
}

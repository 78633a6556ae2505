//! Configuration loading for the schematic service
//!
//! This module provides configuration loading from YAML files with
//! environment variable substitution support.

use regex::Regex;
use schematic_core::utils::LabelStyle;
use schematic_core::{Result, SchematicError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::warn;

use crate::loader::CsvOptions;
use crate::validator::{DEFAULT_PARALLEL_THRESHOLD, ValidationOptions};

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/schematic.yaml";

/// Default name of the component marker column
pub const DEFAULT_COMPONENT_MARKER: &str = "Component";

static ENV_VAR: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\$\{([^}:]+)(?::(-)?([^}]*))?\}").ok());

/// Load configuration from `YAML` file with environment variable substitution
///
/// # Errors
///
/// Returns `SchematicError::IoError` if the file cannot be read
/// Returns `SchematicError::ConfigError` if the YAML cannot be parsed
pub fn load_config<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)?;
    let substituted = substitute_env_vars(&contents);

    serde_yaml::from_str(&substituted)
        .map_err(|e| SchematicError::config(format!("Failed to parse YAML config: {e}")))
}

/// Substitute environment variables in the format ${VAR:-default}
fn substitute_env_vars(content: &str) -> String {
    let Some(re) = ENV_VAR.as_ref() else {
        return content.to_string();
    };

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default_value = caps.get(3).map_or("", |m| m.as_str());

        env::var(var_name).unwrap_or_else(|_| {
            if caps.get(3).is_none() {
                warn!("Environment variable '{var_name}' is not set and has no default");
            }
            default_value.to_string()
        })
    })
    .to_string()
}

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchematicConfig {
    /// Data model configuration
    pub model: ModelConfig,
    /// Validator configuration
    pub validator: ValidatorConfig,
    /// Manifest configuration
    pub manifest: ManifestConfig,
}

/// Data model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the CSV data model
    pub location: Option<PathBuf>,
    /// How labels are derived from display names
    pub label_style: LabelStyle,
    /// Whether whitespace in display names marks word boundaries
    pub strict_camel_case: bool,
    /// Property every manifest carries to name its component
    pub component_marker: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            location: None,
            label_style: LabelStyle::default(),
            strict_camel_case: false,
            component_marker: DEFAULT_COMPONENT_MARKER.to_string(),
        }
    }
}

/// Validator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Whether to enable parallel validation
    pub enable_parallel: bool,
    /// Minimum number of records for parallel validation
    pub parallel_threshold: usize,
    /// Number of threads for parallel validation
    pub thread_count: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            enable_parallel: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            thread_count: num_cpus::get(),
        }
    }
}

/// Manifest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Whether to trim whitespace from cells
    pub trim_whitespace: bool,
    /// Field delimiter
    pub delimiter: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            trim_whitespace: true,
            delimiter: ",".to_string(),
        }
    }
}

impl SchematicConfig {
    /// Load and validate a configuration file
    ///
    /// # Errors
    ///
    /// Returns the errors of [`load_config`] and [`Self::validate`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let config: Self = load_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Check configuration values
    ///
    /// # Errors
    ///
    /// Returns `SchematicError::ConfigError` if:
    /// - the thread count is zero
    /// - the component marker is empty
    /// - the delimiter is not a single ASCII character
    pub fn validate(&self) -> Result<()> {
        if self.validator.thread_count == 0 {
            return Err(SchematicError::config(
                "validator.thread_count must be greater than zero",
            ));
        }
        if self.model.component_marker.trim().is_empty() {
            return Err(SchematicError::config(
                "model.component_marker must not be empty",
            ));
        }
        self.delimiter_byte()?;
        Ok(())
    }

    fn delimiter_byte(&self) -> Result<u8> {
        match self.manifest.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(SchematicError::config(format!(
                "manifest.delimiter must be a single ASCII character, got '{}'",
                self.manifest.delimiter
            ))),
        }
    }

    /// CSV options for manifests and data models
    ///
    /// # Errors
    ///
    /// Returns `SchematicError::ConfigError` for an invalid delimiter.
    pub fn csv_options(&self) -> Result<CsvOptions> {
        Ok(CsvOptions {
            delimiter: self.delimiter_byte()?,
            trim: self.manifest.trim_whitespace,
            ..CsvOptions::default()
        })
    }

    /// Options for the record validator
    #[must_use]
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            parallel: self.validator.enable_parallel,
            parallel_threshold: self.validator.parallel_threshold,
            thread_count: Some(self.validator.thread_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_substitution() {
        let content = "location: ${SCHEMATIC_NONEXISTENT:-model.csv}";
        let result = substitute_env_vars(content);
        assert_eq!(result, "location: model.csv");

        let content = "${VAR1_UNSET:-val1} and ${VAR2_UNSET:-val2}";
        let result = substitute_env_vars(content);
        assert_eq!(result, "val1 and val2");
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = SchematicConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.model.component_marker, "Component");
        assert_eq!(config.csv_options().unwrap().delimiter, b',');
    }

    #[test]
    fn test_invalid_values() {
        let mut config = SchematicConfig::default();
        config.validator.thread_count = 0;
        assert!(config.validate().is_err());

        let mut config = SchematicConfig::default();
        config.manifest.delimiter = ";;".into();
        assert!(config.validate().is_err());

        let mut config = SchematicConfig::default();
        config.model.component_marker = " ".into();
        assert!(config.validate().is_err());
    }
}

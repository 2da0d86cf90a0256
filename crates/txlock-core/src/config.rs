// Lock table configuration
//
// Loaded from TOML; every field has a default so an empty document is a
// valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use txlock_error::{ensure, ConfigError, ConfigResult};
use txlock_types::resource::SEPARATOR;

/// Default name of the root (whole database) resource
pub const DEFAULT_ROOT_NAME: &str = "database";

/// Default queue length at which a warning is logged
pub const DEFAULT_QUEUE_WARNING_THRESHOLD: usize = 64;

/// Lock table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockTableConfig {
    /// Name of the well-known root context
    pub root_name: String,

    /// Queue length at which a warning is emitted (0 disables it)
    pub queue_warning_threshold: usize,
}

impl Default for LockTableConfig {
    fn default() -> Self {
        Self {
            root_name: DEFAULT_ROOT_NAME.to_string(),
            queue_warning_threshold: DEFAULT_QUEUE_WARNING_THRESHOLD,
        }
    }
}

impl LockTableConfig {
    /// Parse and validate a configuration from TOML text
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| ConfigError::parse_error(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check field values
    pub fn validate(&self) -> ConfigResult<()> {
        ensure!(
            !self.root_name.is_empty(),
            ConfigError::invalid("root_name must not be empty")
        );
        ensure!(
            !self.root_name.contains(SEPARATOR),
            ConfigError::invalid(format!(
                "root_name '{}' must not contain '{}'",
                self.root_name, SEPARATOR
            ))
        );
        Ok(())
    }

    /// Set the root context name
    pub fn with_root_name(mut self, root_name: impl Into<String>) -> Self {
        self.root_name = root_name.into();
        self
    }

    /// Set the queue warning threshold
    pub fn with_queue_warning_threshold(mut self, threshold: usize) -> Self {
        self.queue_warning_threshold = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = LockTableConfig::from_toml_str("").unwrap();
        assert_eq!(config, LockTableConfig::default());
        assert_eq!(config.root_name, "database");
    }

    #[test]
    fn test_partial_document() {
        let config = LockTableConfig::from_toml_str("queue_warning_threshold = 3").unwrap();
        assert_eq!(config.root_name, DEFAULT_ROOT_NAME);
        assert_eq!(config.queue_warning_threshold, 3);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            LockTableConfig::from_toml_str("root_name = \"\""),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            LockTableConfig::from_toml_str("root_name = \"db/main\""),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            LockTableConfig::from_toml_str("queue_warning_threshold = \"many\""),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "root_name = \"warehouse\"").unwrap();
        writeln!(file, "queue_warning_threshold = 0").unwrap();

        let config = LockTableConfig::from_file(file.path()).unwrap();
        assert_eq!(
            config,
            LockTableConfig::default()
                .with_root_name("warehouse")
                .with_queue_warning_threshold(0)
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = LockTableConfig::from_file(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}

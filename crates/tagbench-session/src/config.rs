//! Session configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Session behavior switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Appended to the document stem when suggesting a save path
    pub filename_suffix: String,
    /// Return to normal mode after every tag creation
    pub normal_mode_on_creation: bool,
    /// Activate every tag type for display on a newly opened document
    pub activate_all_on_open: bool,
}

impl SessionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With filename suffix
    #[inline]
    #[must_use]
    pub fn with_filename_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.filename_suffix = suffix.into();
        self
    }

    /// With mode reset after creation
    #[inline]
    #[must_use]
    pub fn with_normal_mode_on_creation(mut self, enabled: bool) -> Self {
        self.normal_mode_on_creation = enabled;
        self
    }

    /// With activation of all types on open
    #[inline]
    #[must_use]
    pub fn with_activate_all_on_open(mut self, enabled: bool) -> Self {
        self.activate_all_on_open = enabled;
        self
    }

    /// Parse from TOML; missing keys keep their defaults
    ///
    /// # Errors
    /// Returns an error if the TOML is malformed
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            filename_suffix: String::new(),
            normal_mode_on_creation: true,
            activate_all_on_open: true,
        }
    }
}

/// Configuration load failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML is malformed
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::new();
        assert_eq!(config.filename_suffix, "");
        assert!(config.normal_mode_on_creation);
        assert!(config.activate_all_on_open);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = SessionConfig::from_toml_str("filename_suffix = \"_adj\"").unwrap();
        assert_eq!(config, SessionConfig::new().with_filename_suffix("_adj"));
    }

    #[test]
    fn malformed_toml_is_error() {
        assert!(matches!(
            SessionConfig::from_toml_str("normal_mode_on_creation = \"yes\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "activate_all_on_open = false\n").unwrap();
        let config = SessionConfig::load(&path).unwrap();
        assert!(!config.activate_all_on_open);
        assert!(config.normal_mode_on_creation);
    }
}

//! Configuration file handling for ~/.loctrack/config.ini.
//!
//! Loads and saves user configuration with sensible defaults.

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::settings::ConfigFile;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.loctrack/config.ini).
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to the default path (~/.loctrack/config.ini).
    pub fn save(&self) -> Result<(), ConfigFileError> {
        let path = config_file_path();
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create the default config file if it doesn't exist.
    ///
    /// Returns the path to the config file and whether it was created.
    pub fn ensure_exists() -> Result<(PathBuf, bool), ConfigFileError> {
        Self::ensure_exists_at(config_file_path())
    }

    /// Create a default config file at `path` if it doesn't exist.
    pub fn ensure_exists_at(path: PathBuf) -> Result<(PathBuf, bool), ConfigFileError> {
        if path.exists() {
            return Ok((path, false));
        }
        Self::default().save_to(&path)?;
        tracing::info!(path = %path.display(), "Created default config file");
        Ok((path, true))
    }
}

/// Get the path to the config directory (~/.loctrack).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".loctrack")
}

/// Get the path to the config file (~/.loctrack/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert_eq!(config.tracking.update_interval_ms, DEFAULT_UPDATE_INTERVAL_MS);
        assert!(!config.tracking.simulation_mode);
        assert_eq!(config.geolocation.endpoint, DEFAULT_GEOLOCATION_ENDPOINT);
        assert!(config.geolocation.api_key.is_none());
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_ensure_exists_creates_once() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.ini");

        let (path, created) = ConfigFile::ensure_exists_at(config_path.clone()).unwrap();
        assert!(created);
        assert!(path.exists());

        let (_, created) = ConfigFile::ensure_exists_at(config_path).unwrap();
        assert!(!created);
    }

    #[test]
    fn test_config_paths() {
        assert!(config_directory().ends_with(".loctrack"));
        assert!(config_file_path().ends_with(".loctrack/config.ini"));
    }
}

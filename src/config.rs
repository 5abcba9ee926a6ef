/// Configuration loading and validation.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ShiftType;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Overrides the database location in the user's data directory.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Where relative export paths are resolved.
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    /// Shift type used by `shift add` when `--type` is omitted.
    #[serde(default = "default_shift_type")]
    pub default_shift_type: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_shift_type() -> String {
    ShiftType::Day.as_str().to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level(),
            export_dir: default_export_dir(),
            default_shift_type: default_shift_type(),
        }
    }
}

impl AppConfig {
    /// Default location: `<config dir>/shiftbook/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("shiftbook").join("config.toml"))
    }

    /// Loads the file when it exists, otherwise returns defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "log_level must not be empty".to_string(),
            ));
        }
        self.shift_type()?;
        Ok(())
    }

    pub fn shift_type(&self) -> Result<ShiftType, ConfigError> {
        self.default_shift_type
            .parse()
            .map_err(ConfigError::ValidationError)
    }

    /// Resolves a relative export path against `export_dir`.
    pub fn export_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.export_dir.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.db_path, None);
        assert_eq!(config.shift_type().unwrap(), ShiftType::Day);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.export_dir, PathBuf::from("."));
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "log_level = \"debug\"\ndefault_shift_type = \"overnight\"\n",
        )
        .unwrap();
        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.shift_type().unwrap(), ShiftType::Overnight);
    }

    #[test]
    fn test_rejects_unknown_shift_type() {
        let config = AppConfig {
            default_shift_type: "graveyard".into(),
            ..AppConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_export_path_resolution() {
        let config = AppConfig {
            export_dir: PathBuf::from("/tmp/reports"),
            ..AppConfig::default()
        };
        assert_eq!(
            config.export_path(Path::new("week.xlsx")),
            PathBuf::from("/tmp/reports/week.xlsx")
        );
    }
}

//! Application configuration.
//!
//! Loaded from a YAML file with environment-variable overrides:
//! env vars > config file > defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sync configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyncConfig {
    /// Server URL (e.g., "https://lists.example.com")
    pub server_url: Option<String>,
    /// Bearer token for authentication
    pub access_token: Option<String>,
    /// Enable automatic sync after writes (default: false)
    #[serde(default)]
    pub auto_sync: bool,
}

impl SyncConfig {
    /// Returns true if sync is configured (has both server_url and
    /// access_token).
    pub fn is_configured(&self) -> bool {
        self.server_url.is_some() && self.access_token.is_some()
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Path to the SQLite mirror database
    pub database_path: PathBuf,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    /// Sync configuration
    pub sync: SyncConfig,
}

/// Internal struct for deserializing the config file.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    database_path: Option<PathBuf>,
    sync: Option<SyncConfig>,
}

/// Errors from loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file {}: {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut database_path = Self::default_data_dir().join("pairlist.db");
        let mut config_file = None;
        let mut sync = SyncConfig::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(db_path) = file_config.database_path {
                // Resolve relative paths against the config file's directory
                database_path = if db_path.is_relative() {
                    path.parent().map(|p| p.join(&db_path)).unwrap_or(db_path)
                } else {
                    db_path
                };
            }
            if let Some(sync_config) = file_config.sync {
                sync = sync_config;
            }
        }

        // Environment variable overrides
        if let Ok(db_path) = std::env::var("PAIRLIST_DATABASE_PATH") {
            database_path = PathBuf::from(db_path);
        }
        if let Ok(url) = std::env::var("PAIRLIST_SERVER_URL") {
            sync.server_url = Some(url);
        }
        if let Ok(token) = std::env::var("PAIRLIST_ACCESS_TOKEN") {
            sync.access_token = Some(token);
        }

        Ok(Config {
            database_path,
            config_file,
            sync,
        })
    }

    fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pairlist")
    }

    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pairlist")
            .join("config.yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_when_no_file() {
        let dir = tempdir().unwrap();
        let config = Config::load(Some(dir.path().join("missing.yaml"))).unwrap();
        assert!(config.config_file.is_none());
        assert!(!config.sync.is_configured());
        assert!(config.database_path.ends_with("pairlist.db"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "database_path: lists.db\nsync:\n  server_url: https://lists.example.com\n  access_token: secret\n  auto_sync: true\n",
        )
        .unwrap();

        let config = Config::load(Some(path.clone())).unwrap();
        assert_eq!(config.config_file, Some(path));
        assert!(config.sync.is_configured());
        assert!(config.sync.auto_sync);
        // relative database path resolves against the config dir
        assert_eq!(config.database_path, dir.path().join("lists.db"));
    }

    #[test]
    fn test_env_var_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "sync:\n  server_url: https://file.example.com\n  access_token: from-file\n",
        )
        .unwrap();

        // Set env vars
        std::env::set_var("PAIRLIST_SERVER_URL", "https://env.example.com");
        std::env::set_var("PAIRLIST_ACCESS_TOKEN", "from-env");

        let config = Config::load(Some(path)).unwrap();
        assert_eq!(
            config.sync.server_url.as_deref(),
            Some("https://env.example.com")
        );
        assert_eq!(config.sync.access_token.as_deref(), Some("from-env"));

        // Clean up
        std::env::remove_var("PAIRLIST_SERVER_URL");
        std::env::remove_var("PAIRLIST_ACCESS_TOKEN");
    }

    #[test]
    fn test_partial_sync_config_is_not_configured() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "sync:\n  server_url: https://lists.example.com\n").unwrap();

        let config = Config::load(Some(path)).unwrap();
        assert!(!config.sync.is_configured());
    }
}

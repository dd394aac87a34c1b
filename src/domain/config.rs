//! # Configuration
//!
//! Manages the loading and parsing of the bot's configuration file (`config.yaml`).
//! Defines the structs for the Matrix connection, the command surface and storage.

use crate::domain::error::StartupError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    pub bot: BotConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Reads and validates the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), StartupError> {
        if self.bot.prefix.trim().is_empty() {
            return Err(StartupError::Config("bot.prefix must not be empty".into()));
        }
        if self.bot.prefix.chars().any(char::is_whitespace) {
            return Err(StartupError::Config(
                "bot.prefix must not contain whitespace".into(),
            ));
        }
        if self.bot.owner.trim().is_empty() {
            return Err(StartupError::Config("bot.owner must be set".into()));
        }
        Ok(())
    }
}

/// Configuration for the connected chat services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub matrix: MatrixConfig,
}

/// Specific configuration for the Matrix service.
/// The access token itself is passed on the command line, never stored here.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub homeserver: String,
    pub user_id: String,
    pub device_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Command surface settings.
#[derive(Debug, Deserialize, Clone)]
pub struct BotConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// User id allowed to run owner-only commands.
    pub owner: String,
    #[serde(default)]
    pub invite_url: Option<String>,
    #[serde(default = "default_source_url")]
    pub source_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
    /// Only honoured when built with the `redis` feature.
    #[serde(default)]
    pub redis_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            redis_url: None,
        }
    }
}

fn default_prefix() -> String {
    "m!".to_string()
}

fn default_source_url() -> String {
    "https://github.com/musubii/maiden".to_string()
}

fn default_store_path() -> String {
    "data/store.json".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
services:
  matrix:
    homeserver: "https://matrix.example.org"
    user_id: "@maiden:example.org"
    device_id: "MAIDEN"
bot:
  owner: "@owner:example.org"
"#;

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.bot.prefix, "m!");
        assert_eq!(config.storage.path, "data/store.json");
        assert!(config.storage.redis_url.is_none());
        assert!(config.bot.invite_url.is_none());
    }

    #[test]
    fn test_missing_owner_rejected() {
        let yaml = MINIMAL.replace("\"@owner:example.org\"", "\"\"");
        assert!(AppConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_prefix_with_whitespace_rejected() {
        let yaml = format!("{MINIMAL}  prefix: \"m !\"\n");
        assert!(AppConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_load_reports_path() {
        let err = AppConfig::load("does/not/exist.yaml").unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.yaml"));
    }
}

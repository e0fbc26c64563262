//! Configuration management
//!
//! TOML config under the platform config directory, with every field
//! defaulted so a missing file means default behavior. The store API key
//! can be supplied by env var instead of the file.

use crate::moderation::DEFAULT_DENYLIST;
use crate::scheduler::SchedulerConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Record store endpoint settings
    #[serde(default)]
    pub store: StoreConfig,
    /// Moderation denylist
    #[serde(default)]
    pub moderation: ModerationConfig,
    /// Improvement scheduler settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the record store API
    #[serde(default)]
    pub url: String,
    /// API key; loadable from the config file but never written back to it.
    /// The WARDEN_STORE_KEY env var takes precedence.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Table holding the records
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    "sites".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: None,
            table: default_table(),
        }
    }
}

impl StoreConfig {
    /// Resolve the API key from the environment, falling back to the loaded
    /// value.
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var("WARDEN_STORE_KEY")
            .ok()
            .or_else(|| self.api_key.clone())
    }

    /// Resolve the store URL, env var first.
    pub fn resolved_url(&self) -> Option<String> {
        std::env::var("WARDEN_STORE_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .or_else(|| Some(self.url.clone()).filter(|u| !u.is_empty()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    /// Denylisted substrings; static configuration, never read from the store
    #[serde(default = "default_denylist")]
    pub denylist: Vec<String>,
}

fn default_denylist() -> Vec<String> {
    DEFAULT_DENYLIST.iter().map(|p| p.to_string()).collect()
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            denylist: default_denylist(),
        }
    }
}

impl Config {
    /// Load configuration, creating a default file on first run.
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent().context("Config path has no parent")?;
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "site-warden", "site-warden")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store.table, "sites");
        assert_eq!(config.moderation.denylist, vec!["<script>alert", "eval(", "malicious"]);
        assert_eq!(config.scheduler.interval_secs, 60);
    }

    #[test]
    fn test_toml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.store.url = "https://store.example.com".to_string();
        config.scheduler.interval_secs = 30;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.store.url, "https://store.example.com");
        assert_eq!(loaded.scheduler.interval_secs, 30);
        assert_eq!(loaded.moderation.denylist.len(), 3);
    }

    #[test]
    fn test_api_key_loads_but_is_never_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[store]\nurl = \"https://s.example.com\"\napi_key = \"sk-secret\"\n",
        )
        .unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.store.api_key.as_deref(), Some("sk-secret"));

        let saved = dir.path().join("saved.toml");
        loaded.save_to(&saved).unwrap();
        let contents = std::fs::read_to_string(&saved).unwrap();
        assert!(!contents.contains("sk-secret"));
        assert!(!contents.contains("api_key"));
    }

    #[test]
    fn test_missing_sections_get_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[store]\nurl = \"https://s.example.com\"\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.store.url, "https://s.example.com");
        assert_eq!(loaded.scheduler.milestone_days, vec![1, 3, 7, 30, 90, 365]);
    }
}

// src/config.rs
//! User configuration
//!
//! Loaded from `config.toml` in the base directory. Every field has a
//! default, so a missing file or a partial file are both valid.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// How much network access is allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NetworkLevel {
    /// Never touch the network
    Offline,
    /// Download only what is missing
    Minimal,
    /// Download freely and refresh stale feeds
    #[default]
    Full,
}

impl NetworkLevel {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "offline" => Ok(Self::Offline),
            "minimal" => Ok(Self::Minimal),
            "full" => Ok(Self::Full),
            other => Err(Error::ConfigError(format!(
                "Unknown network level '{}' (expected offline, minimal or full)",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Minimal => "minimal",
            Self::Full => "full",
        }
    }
}

impl std::fmt::Display for NetworkLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Default mirror for feeds and keys
pub const DEFAULT_FEED_MIRROR: &str = "http://roscidus.com/0mirror";

/// Default key information service
pub const DEFAULT_KEY_INFO_SERVER: &str = "https://keylookup.appspot.com/";

fn default_freshness_secs() -> u64 {
    7 * 24 * 60 * 60
}

fn default_failed_check_delay_secs() -> u64 {
    60 * 60
}

fn default_true() -> bool {
    true
}

fn default_feed_mirror() -> String {
    DEFAULT_FEED_MIRROR.to_string()
}

fn default_key_info_server() -> String {
    DEFAULT_KEY_INFO_SERVER.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network_use: NetworkLevel,

    /// Age after which a cached feed is considered stale
    #[serde(default = "default_freshness_secs")]
    pub freshness_secs: u64,

    /// Minimum time between two attempts to refresh the same feed
    #[serde(default = "default_failed_check_delay_secs")]
    pub failed_check_delay_secs: u64,

    /// Prefer testing versions over stable ones
    #[serde(default)]
    pub help_with_testing: bool,

    /// Trust keys with a positive vote for feeds never seen before
    #[serde(default = "default_true")]
    pub auto_approve_keys: bool,

    /// Mirror consulted when a feed host is unreachable; empty disables it
    #[serde(default = "default_feed_mirror")]
    pub feed_mirror: String,

    /// Service voting on unknown keys; empty disables lookups
    #[serde(default = "default_key_info_server")]
    pub key_info_server: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network_use: NetworkLevel::default(),
            freshness_secs: default_freshness_secs(),
            failed_check_delay_secs: default_failed_check_delay_secs(),
            help_with_testing: false,
            auto_approve_keys: true,
            feed_mirror: default_feed_mirror(),
            key_info_server: default_key_info_server(),
        }
    }
}

impl Config {
    /// Load configuration, using defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("Invalid config {}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;
        crate::lock::write_atomic(path, content.as_bytes())
    }

    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_secs)
    }

    pub fn failed_check_delay(&self) -> Duration {
        Duration::from_secs(self.failed_check_delay_secs)
    }

    pub fn feed_mirror(&self) -> Option<&str> {
        Some(self.feed_mirror.as_str()).filter(|url| !url.is_empty())
    }

    pub fn key_info_server(&self) -> Option<&str> {
        Some(self.key_info_server.as_str()).filter(|url| !url.is_empty())
    }

    /// Set a value by key name
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parse_u64 = |value: &str| {
            value
                .parse::<u64>()
                .map_err(|_| Error::ConfigError(format!("'{}' is not a number of seconds", value)))
        };
        let parse_bool = |value: &str| {
            value
                .parse::<bool>()
                .map_err(|_| Error::ConfigError(format!("'{}' is not true or false", value)))
        };

        match key {
            "network_use" => self.network_use = NetworkLevel::parse(value)?,
            "freshness_secs" => self.freshness_secs = parse_u64(value)?,
            "failed_check_delay_secs" => self.failed_check_delay_secs = parse_u64(value)?,
            "help_with_testing" => self.help_with_testing = parse_bool(value)?,
            "auto_approve_keys" => self.auto_approve_keys = parse_bool(value)?,
            "feed_mirror" => self.feed_mirror = value.to_string(),
            "key_info_server" => self.key_info_server = value.to_string(),
            other => {
                return Err(Error::ConfigError(format!("Unknown config key '{}'", other)));
            }
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_missing() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(&temp.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.freshness(), Duration::from_secs(604800));
        assert_eq!(config.failed_check_delay(), Duration::from_secs(3600));
    }

    #[test]
    fn test_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "network_use = \"offline\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.network_use, NetworkLevel::Offline);
        assert!(config.auto_approve_keys);
        assert_eq!(config.feed_mirror(), Some(DEFAULT_FEED_MIRROR));
    }

    #[test]
    fn test_set_and_save() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        let mut config = Config::default();
        config.set("network_use", "minimal").unwrap();
        config.set("help_with_testing", "true").unwrap();
        config.set("feed_mirror", "").unwrap();
        assert!(config.set("no_such_key", "1").is_err());
        assert!(config.set("freshness_secs", "soon").is_err());
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.network_use, NetworkLevel::Minimal);
        assert!(loaded.help_with_testing);
        assert_eq!(loaded.feed_mirror(), None);
        assert_eq!(loaded.key_info_server(), Some(DEFAULT_KEY_INFO_SERVER));
    }

    #[test]
    fn test_invalid_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "network_use = 3").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::ConfigError(_))));
    }
}

// src/paths.rs
//! Centralized path derivation for the on-disk layout

use crate::model::FeedUri;
use std::path::{Path, PathBuf};

/// Environment variable overriding the base directory
pub const HOME_ENV: &str = "ZERODEPLOY_HOME";

/// Every location used on disk, derived from one base directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locations {
    base: PathBuf,
}

impl Locations {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// `$ZERODEPLOY_HOME`, else the user's data directory
    pub fn from_env() -> Self {
        let base = std::env::var_os(HOME_ENV)
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|dir| dir.join("zerodeploy")))
            .unwrap_or_else(|| PathBuf::from(".zerodeploy"));
        Self::new(base)
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.toml")
    }

    /// Raw feed data, one file per escaped feed URI
    pub fn feed_cache_dir(&self) -> PathBuf {
        self.base.join("feeds")
    }

    /// Markers recording the last download attempt per feed
    pub fn last_check_dir(&self) -> PathBuf {
        self.base.join("last-check-attempt")
    }

    pub fn last_check_file(&self, feed: &FeedUri) -> PathBuf {
        self.last_check_dir().join(feed.pretty_escape())
    }

    pub fn feed_preferences_dir(&self) -> PathBuf {
        self.base.join("preferences").join("feeds")
    }

    pub fn interface_preferences_dir(&self) -> PathBuf {
        self.base.join("preferences").join("interfaces")
    }

    pub fn trust_db_file(&self) -> PathBuf {
        self.base.join("trustdb.toml")
    }

    /// OpenPGP certificates, one `<FINGERPRINT>.asc` per key
    pub fn keyring_dir(&self) -> PathBuf {
        self.base.join("keys")
    }

    pub fn store_dir(&self) -> PathBuf {
        self.base.join("implementations")
    }

    pub fn locks_dir(&self) -> PathBuf {
        self.base.join("locks")
    }
}

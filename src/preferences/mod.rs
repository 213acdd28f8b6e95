// src/preferences/mod.rs

//! User overrides stored per feed and per interface
//!
//! Each record lives in its own TOML file named by the escaped identifier.
//! A missing file is the normal initial state and yields defaults; the
//! `load_for_safe` variants also fall back to defaults (with a warning)
//! when a file cannot be read or parsed.

pub mod feed;
pub mod interface;

pub use feed::{FeedPreferences, ImplementationPreferences};
pub use interface::InterfacePreferences;

use crate::error::{Error, Result};
use crate::lock::write_atomic;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::warn;

fn load_toml<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let content = fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::ParseError(format!("Invalid preferences {}: {}", path.display(), e)))
}

fn load_toml_safe<T: DeserializeOwned + Default>(path: &Path, kind: &str, id: &str) -> T {
    match load_toml(path) {
        Ok(value) => value,
        Err(e) => {
            warn!("Error loading {} preferences for {}: {}", kind, id, e);
            T::default()
        }
    }
}

fn save_toml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = toml::to_string_pretty(value)
        .map_err(|e| Error::IoError(format!("Failed to serialize preferences: {}", e)))?;
    write_atomic(path, content.as_bytes())
}

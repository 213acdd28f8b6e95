// src/trust/db.rs

//! Database of trusted keys
//!
//! Each record pairs a key fingerprint with the set of domains it may sign
//! feeds for. The database lives in a single TOML file; a missing or
//! unreadable file is an empty database, since every trust decision can be
//! asked again.

use crate::error::{Error, Result};
use crate::lock::{NamedLock, TRUST_DB_LOCK, write_atomic};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// A key and the domains it is trusted for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedKey {
    pub fingerprint: String,
    #[serde(default)]
    pub domains: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrustDb {
    #[serde(default, rename = "key")]
    keys: Vec<TrustedKey>,
}

fn normalize_fingerprint(fingerprint: &str) -> String {
    fingerprint
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}

impl TrustDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> &[TrustedKey] {
        &self.keys
    }

    /// Whether `fingerprint` may sign feeds from `domain`
    pub fn is_trusted(&self, fingerprint: &str, domain: &str) -> bool {
        let fingerprint = normalize_fingerprint(fingerprint);
        self.keys
            .iter()
            .any(|key| key.fingerprint == fingerprint && key.domains.contains(domain))
    }

    /// Domains a key is trusted for
    pub fn domains_for(&self, fingerprint: &str) -> BTreeSet<String> {
        let fingerprint = normalize_fingerprint(fingerprint);
        self.keys
            .iter()
            .filter(|key| key.fingerprint == fingerprint)
            .flat_map(|key| key.domains.iter().cloned())
            .collect()
    }

    /// Trust a key for a domain; adding an existing pair changes nothing
    pub fn trust_key(&mut self, fingerprint: &str, domain: &str) {
        let fingerprint = normalize_fingerprint(fingerprint);
        match self.keys.iter_mut().find(|key| key.fingerprint == fingerprint) {
            Some(key) => {
                key.domains.insert(domain.to_string());
            }
            None => self.keys.push(TrustedKey {
                fingerprint,
                domains: BTreeSet::from([domain.to_string()]),
            }),
        }
    }

    /// Stop trusting a key for a domain
    ///
    /// Keys left without any domain are dropped.
    pub fn untrust_key(&mut self, fingerprint: &str, domain: &str) {
        let fingerprint = normalize_fingerprint(fingerprint);
        for key in self.keys.iter_mut().filter(|key| key.fingerprint == fingerprint) {
            key.domains.remove(domain);
        }
        self.keys.retain(|key| !key.domains.is_empty());
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::ParseError(format!("Invalid trust database {}: {}", path.display(), e)))
    }

    /// Load, falling back to an empty database on any failure
    pub fn load_safe(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(db) => db,
            Err(e) => {
                warn!("Ignoring unreadable trust database {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write the database atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::IoError(format!("Failed to serialize trust database: {}", e)))?;
        write_atomic(path, content.as_bytes())
    }

    /// Load, modify and save the database under the trust lock
    ///
    /// Returns the database as saved.
    pub fn update<F>(path: &Path, locks_dir: &Path, modify: F) -> Result<Self>
    where
        F: FnOnce(&mut TrustDb),
    {
        let _lock = NamedLock::acquire(locks_dir, TRUST_DB_LOCK)?;
        let mut db = Self::load_safe(path);
        modify(&mut db);
        db.save(path)?;
        info!("Saved trust database {}", path.display());
        Ok(db)
    }

    fn as_map(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut map: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for key in &self.keys {
            map.entry(key.fingerprint.as_str())
                .or_default()
                .extend(key.domains.iter().map(String::as_str));
        }
        map
    }
}

/// Record order does not matter
impl PartialEq for TrustDb {
    fn eq(&self, other: &Self) -> bool {
        self.as_map() == other.as_map()
    }
}

impl Eq for TrustDb {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FINGERPRINT: &str = "DA9825AECAD089757CDABD8E07133F96CA74D8BA";

    #[test]
    fn test_trust_and_untrust() {
        let mut db = TrustDb::new();
        assert!(!db.is_trusted(FINGERPRINT, "example.com"));

        db.trust_key(FINGERPRINT, "example.com");
        db.trust_key(FINGERPRINT, "example.com");
        db.trust_key(&FINGERPRINT.to_lowercase(), "example.org");
        assert_eq!(db.keys().len(), 1);
        assert!(db.is_trusted(FINGERPRINT, "example.com"));
        assert!(db.is_trusted(FINGERPRINT, "example.org"));
        assert!(!db.is_trusted(FINGERPRINT, "other.net"));

        db.untrust_key(FINGERPRINT, "example.com");
        assert!(!db.is_trusted(FINGERPRINT, "example.com"));
        assert!(db.is_trusted(FINGERPRINT, "example.org"));

        db.untrust_key(FINGERPRINT, "example.org");
        assert!(db.keys().is_empty());

        // Removing something absent is a no-op
        db.untrust_key("0000", "example.com");
    }

    #[test]
    fn test_equality_ignores_order() {
        let mut first = TrustDb::new();
        first.trust_key("AAAA", "a.com");
        first.trust_key("BBBB", "b.com");
        first.trust_key("AAAA", "c.com");

        let mut second = TrustDb::new();
        second.trust_key("BBBB", "b.com");
        second.trust_key("AAAA", "c.com");
        second.trust_key("AAAA", "a.com");

        assert_eq!(first, second);
        second.trust_key("BBBB", "d.com");
        assert_ne!(first, second);
    }

    #[test]
    fn test_load_safe_fallbacks() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("trustdb.toml");
        assert_eq!(TrustDb::load_safe(&path), TrustDb::new());

        fs::write(&path, "this is [not valid").unwrap();
        assert_eq!(TrustDb::load_safe(&path), TrustDb::new());
    }

    #[test]
    fn test_update_persists() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("trustdb.toml");
        let locks = temp.path().join("locks");

        TrustDb::update(&path, &locks, |db| db.trust_key(FINGERPRINT, "example.com")).unwrap();
        let saved = TrustDb::update(&path, &locks, |db| db.trust_key(FINGERPRINT, "example.org")).unwrap();

        let loaded = TrustDb::load(&path).unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.domains_for(FINGERPRINT).len(), 2);
    }
}

// src/store.rs

//! Lookup of already-extracted implementations
//!
//! The store is a directory of implementation trees, each named by one of
//! its manifest digest ids (`sha256new_...`, `sha1=...`). The solver only
//! asks whether an implementation is present; populating the store is out
//! of scope here.

use crate::error::{Error, Result};
use crate::model::ManifestDigest;
use std::path::{Path, PathBuf};

/// Read-only view of an implementation store
///
/// Implementations must be safe to query from several threads at once.
pub trait ImplementationStore: Send + Sync {
    /// Whether any form of the digest is present
    fn contains(&self, digest: &ManifestDigest) -> bool;

    /// Directory holding the implementation
    fn get_path(&self, digest: &ManifestDigest) -> Result<PathBuf>;
}

/// Store backed by a single directory
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    dir: PathBuf,
}

impl DirectoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn find(&self, digest: &ManifestDigest) -> Option<PathBuf> {
        digest
            .available_digests()
            .into_iter()
            .map(|id| self.dir.join(id))
            .find(|path| path.is_dir())
    }
}

impl ImplementationStore for DirectoryStore {
    fn contains(&self, digest: &ManifestDigest) -> bool {
        self.find(digest).is_some()
    }

    fn get_path(&self, digest: &ManifestDigest) -> Result<PathBuf> {
        self.find(digest).ok_or_else(|| {
            Error::NotFoundError(format!(
                "Implementation {} not found in store {}",
                digest,
                self.dir.display()
            ))
        })
    }
}

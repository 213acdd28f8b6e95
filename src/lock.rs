// src/lock.rs

//! Cross-process locks and atomic file writes
//!
//! The feed cache and the trust database are shared by every process
//! using the same base directory. Writers serialize through a named
//! advisory lock and replace files atomically, so readers never observe
//! a half-written file.
//!
//! # Example
//!
//! ```ignore
//! use zerodeploy::lock::{NamedLock, TRUST_DB_LOCK};
//!
//! let _lock = NamedLock::acquire(&locations.locks_dir(), TRUST_DB_LOCK)?;
//! trust_db.save(&locations.trust_db_file())?;
//! // Lock released on drop
//! ```

use crate::error::{Error, Result};
use fs2::FileExt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Lock guarding trust database updates
pub const TRUST_DB_LOCK: &str = "trust-db";

/// Lock guarding feed cache writes
pub const FEED_CACHE_LOCK: &str = "feed-cache";

/// Exclusive advisory lock on `<dir>/<name>.lock`
///
/// Held until dropped.
pub struct NamedLock {
    #[allow(dead_code)]
    file: File,
    path: PathBuf,
}

impl NamedLock {
    /// Acquire the lock, blocking until it is available
    pub fn acquire(dir: &Path, name: &str) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.lock", name));
        let file = File::create(&path)?;

        file.lock_exclusive().map_err(|e| {
            Error::IoError(format!("Failed to acquire lock {}: {}", path.display(), e))
        })?;
        debug!("Acquired lock {}", path.display());

        Ok(Self { file, path })
    }

    /// Try to acquire the lock without blocking
    ///
    /// Returns `Ok(None)` when another process holds it.
    pub fn try_acquire(dir: &Path, name: &str) -> Result<Option<Self>> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.lock", name));
        let file = File::create(&path)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { file, path })),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                debug!("Lock {} already held", path.display());
                Ok(None)
            }
            Err(e) => Err(Error::IoError(format!(
                "Failed to try-acquire lock {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for NamedLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            debug!("Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}

/// Replace `path` with `data` via a temporary file in the same directory
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::IoError(format!("{} has no parent directory", path.display())))?;
    fs::create_dir_all(dir)?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(path)
        .map_err(|e| Error::IoError(format!("Failed to write {}: {}", path.display(), e)))?;
    Ok(())
}

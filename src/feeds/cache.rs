// src/feeds/cache.rs

//! Cache of downloaded feeds
//!
//! Raw feed data (including the signature block) is stored on disk, one
//! file per escaped feed URI. Parsed and normalized feeds are memoized in
//! memory; the cached `Feed` values are shared and never mutated, a new
//! download replaces them.

use crate::error::{Error, Result};
use crate::lock::{FEED_CACHE_LOCK, NamedLock, write_atomic};
use crate::model::{Feed, FeedUri};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Storage for feed data
pub trait FeedCache: Send + Sync {
    /// Whether the feed is available without downloading
    fn contains(&self, uri: &FeedUri) -> bool;

    /// Parsed, normalized feed
    fn get_feed(&self, uri: &FeedUri) -> Result<Arc<Feed>>;

    /// Raw data as stored, signature block included
    fn get_raw(&self, uri: &FeedUri) -> Result<Vec<u8>>;

    /// Store (or replace) the raw data of a remote feed
    fn add(&self, uri: &FeedUri, data: &[u8]) -> Result<()>;

    fn remove(&self, uri: &FeedUri) -> Result<()>;

    /// URIs of every stored remote feed
    fn list_all(&self) -> Result<Vec<FeedUri>>;

    /// Forget parsed feeds held in memory
    fn flush(&self);
}

/// Feed cache in a directory
pub struct DiskFeedCache {
    dir: PathBuf,
    locks_dir: PathBuf,
    memory: RwLock<HashMap<FeedUri, Arc<Feed>>>,
}

impl DiskFeedCache {
    pub fn new(dir: impl Into<PathBuf>, locks_dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks_dir: locks_dir.into(),
            memory: RwLock::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the data of `uri`
    fn path_for(&self, uri: &FeedUri) -> PathBuf {
        match uri.local_path() {
            Some(path) => path,
            None => self.dir.join(uri.escape()),
        }
    }

    fn forget(&self, uri: &FeedUri) {
        self.memory
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(uri);
    }
}

impl FeedCache for DiskFeedCache {
    fn contains(&self, uri: &FeedUri) -> bool {
        let in_memory = self
            .memory
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(uri);
        in_memory || self.path_for(uri).is_file()
    }

    fn get_feed(&self, uri: &FeedUri) -> Result<Arc<Feed>> {
        if let Some(feed) = self
            .memory
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(uri)
        {
            return Ok(Arc::clone(feed));
        }

        let data = self.get_raw(uri)?;
        let mut feed = Feed::load(&data)?;
        feed.normalize(uri)?;
        debug!("Loaded feed {} from cache", uri);

        let feed = Arc::new(feed);
        self.memory
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(uri.clone(), Arc::clone(&feed));
        Ok(feed)
    }

    fn get_raw(&self, uri: &FeedUri) -> Result<Vec<u8>> {
        let path = self.path_for(uri);
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                Error::NotFoundError(format!("Feed {} is not cached ({})", uri, path.display()))
            }
            _ => Error::IoError(format!("Failed to read {}: {}", path.display(), e)),
        })
    }

    fn add(&self, uri: &FeedUri, data: &[u8]) -> Result<()> {
        if uri.is_local() {
            return Err(Error::IoError(format!(
                "Local feed {} cannot be added to the cache",
                uri
            )));
        }

        let _lock = NamedLock::acquire(&self.locks_dir, FEED_CACHE_LOCK)?;
        write_atomic(&self.path_for(uri), data)?;
        self.forget(uri);
        debug!("Stored feed {} in cache", uri);
        Ok(())
    }

    fn remove(&self, uri: &FeedUri) -> Result<()> {
        if uri.is_local() {
            return Err(Error::IoError(format!(
                "Local feed {} cannot be removed from the cache",
                uri
            )));
        }

        let _lock = NamedLock::acquire(&self.locks_dir, FEED_CACHE_LOCK)?;
        self.forget(uri);
        match fs::remove_file(self.path_for(uri)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFoundError(format!(
                "Feed {} is not cached",
                uri
            ))),
            Err(e) => Err(e.into()),
        }
    }

    fn list_all(&self) -> Result<Vec<FeedUri>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut feeds = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            match FeedUri::unescape(name) {
                Ok(uri) => feeds.push(uri),
                Err(e) => warn!("Ignoring unexpected file {} in feed cache: {}", name, e),
            }
        }
        feeds.sort();
        Ok(feeds)
    }

    fn flush(&self) {
        self.memory.write().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

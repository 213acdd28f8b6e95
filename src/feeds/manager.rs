// src/feeds/manager.rs

//! Getting feeds from the cache or the network
//!
//! `FeedManager` decides when a feed has to be downloaded, falls back to the
//! feed mirror when the primary location is unreachable, and admits new
//! data into the cache only after trust has been established and the data
//! has been checked for substitution and replay attacks.

use crate::config::{Config, NetworkLevel};
use crate::error::{Error, Result};
use crate::feeds::cache::FeedCache;
use crate::handler::Handler;
use crate::http::Downloader;
use crate::model::{Feed, FeedUri};
use crate::paths::Locations;
use crate::preferences::FeedPreferences;
use crate::trust::{Keyring, Signature, TrustDb, TrustManager};
use chrono::{DateTime, Utc};
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Provides access to feeds, downloading them as needed
pub struct FeedManager<'a> {
    config: &'a Config,
    locations: &'a Locations,
    cache: &'a dyn FeedCache,
    keyring: &'a dyn Keyring,
    downloader: &'a dyn Downloader,
    handler: &'a dyn Handler,

    /// Download every requested feed, even when cached
    refresh: AtomicBool,

    /// Set once any feed served from the cache was stale; cleared by
    /// [`FeedManager::reset_stale`]
    stale: AtomicBool,
}

impl<'a> FeedManager<'a> {
    pub fn new(
        config: &'a Config,
        locations: &'a Locations,
        cache: &'a dyn FeedCache,
        keyring: &'a dyn Keyring,
        downloader: &'a dyn Downloader,
        handler: &'a dyn Handler,
    ) -> Self {
        Self {
            config,
            locations,
            cache,
            keyring,
            downloader,
            handler,
            refresh: AtomicBool::new(false),
            stale: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    pub fn handler(&self) -> &dyn Handler {
        self.handler
    }

    pub fn set_refresh(&self, refresh: bool) {
        self.refresh.store(refresh, Ordering::SeqCst);
    }

    pub fn refresh(&self) -> bool {
        self.refresh.load(Ordering::SeqCst)
    }

    /// Whether any feed returned so far should have been updated
    pub fn stale(&self) -> bool {
        self.stale.load(Ordering::SeqCst)
    }

    /// Start tracking staleness afresh, e.g. at the start of a solve
    pub fn reset_stale(&self) {
        self.stale.store(false, Ordering::SeqCst);
    }

    /// Forget parsed feeds held in memory
    pub fn flush(&self) {
        self.cache.flush();
    }

    /// Get a feed, downloading it again first when the cached copy is stale
    ///
    /// A failed refresh is not an error: the stale copy is returned and the
    /// feed stays marked as stale.
    pub fn get_feed(&self, uri: &FeedUri) -> Result<Arc<Feed>> {
        let (feed, stale) = self.load(uri)?;
        if !stale || self.refresh() || self.config.network_use != NetworkLevel::Full {
            self.mark_stale(stale);
            return Ok(feed);
        }

        info!("Feed {} is stale, refreshing", uri);
        match self.download(uri) {
            Ok(()) => self.load_cached(uri),
            Err(e) if e.is_network() => {
                warn!("Failed to refresh feed {}: {}", uri, e);
                self.mark_stale(true);
                Ok(feed)
            }
            Err(e) => Err(e),
        }
    }

    /// Get a feed without the stale refresh; returns the feed and whether it
    /// is stale
    fn load(&self, uri: &FeedUri) -> Result<(Arc<Feed>, bool)> {
        if uri.is_local() {
            return self.load_local(uri).map(|feed| (feed, false));
        }

        if self.refresh() {
            self.download(uri)?;
        } else if !self.cache.contains(uri) {
            if self.config.network_use == NetworkLevel::Offline {
                return Err(Error::NotFoundError(format!(
                    "Feed {} is not cached and network use is offline",
                    uri
                )));
            }
            self.download(uri)?;
        }

        let feed = self.load_cached(uri)?;
        Ok((feed, self.is_stale(uri)))
    }

    fn load_local(&self, uri: &FeedUri) -> Result<Arc<Feed>> {
        if !self.cache.contains(uri) {
            return Err(Error::NotFoundError(format!("Feed file {} not found", uri)));
        }
        self.cache.get_feed(uri).map_err(wrap_cache_error)
    }

    fn load_cached(&self, uri: &FeedUri) -> Result<Arc<Feed>> {
        self.cache.get_feed(uri).map_err(wrap_cache_error)
    }

    fn mark_stale(&self, stale: bool) {
        if stale {
            self.stale.store(true, Ordering::SeqCst);
        }
    }

    /// Not checked within the freshness window, and no download attempted
    /// within the failed-check delay
    fn is_stale(&self, uri: &FeedUri) -> bool {
        if self.config.network_use != NetworkLevel::Full {
            return false;
        }

        let now = Utc::now();
        let last_checked = FeedPreferences::load_for_safe(self.locations, uri)
            .last_checked
            .unwrap_or(DateTime::UNIX_EPOCH);
        let last_attempt = self.last_check_attempt(uri).unwrap_or(DateTime::UNIX_EPOCH);

        let stale = now - last_checked > to_delta(self.config.freshness())
            && now - last_attempt > to_delta(self.config.failed_check_delay());
        if stale {
            debug!("Feed {} last checked {}", uri, last_checked);
        }
        stale
    }

    fn last_check_attempt(&self, uri: &FeedUri) -> Option<DateTime<Utc>> {
        let modified = fs::metadata(self.locations.last_check_file(uri))
            .and_then(|metadata| metadata.modified())
            .ok()?;
        Some(DateTime::<Utc>::from(modified))
    }

    fn set_last_check_attempt(&self, uri: &FeedUri) -> Result<()> {
        let path = self.locations.last_check_file(uri);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, b"")?;
        Ok(())
    }

    /// Download a feed and import it, falling back to the mirror
    fn download(&self, uri: &FeedUri) -> Result<()> {
        self.set_last_check_attempt(uri)?;
        let cancellation = self.handler.cancellation();
        cancellation.check()?;

        info!("Downloading feed {}", uri);
        let result = self
            .downloader
            .download(uri.as_str())
            .and_then(|data| self.import_feed(uri, &data, None));
        match result {
            Ok(()) => {}
            Err(e) if e.is_network() => {
                warn!("Failed to download feed {}: {}", uri, e);
                if uri.is_loopback() {
                    return Err(e);
                }
                if let Err(mirror_error) = self.download_mirror(uri) {
                    if !mirror_error.is_network() {
                        return Err(mirror_error);
                    }
                    debug!("Mirror failed for {}: {}", uri, mirror_error);
                    return Err(e);
                }
            }
            Err(e) => return Err(e),
        }

        cancellation.check()
    }

    fn download_mirror(&self, uri: &FeedUri) -> Result<()> {
        let Some(mirror_url) = mirror_url(self.config.feed_mirror(), uri) else {
            return Err(Error::NetworkError(format!("No feed mirror for {}", uri)));
        };
        self.handler.cancellation().check()?;

        info!("Trying feed mirror {}", mirror_url);
        let data = self.downloader.download(&mirror_url)?;
        self.import_feed(uri, &data, Some(&mirror_url))?;
        self.handler.cancellation().check()
    }

    /// Check and store feed data obtained for `uri`
    ///
    /// `mirror` is where the data actually came from when not from `uri`.
    pub fn import_feed(&self, uri: &FeedUri, data: &[u8], mirror: Option<&str>) -> Result<()> {
        let trust = TrustManager::new(
            self.config,
            self.locations,
            self.keyring,
            self.cache,
            self.downloader,
            self.handler,
        );
        let signature = trust.check_trust(uri, mirror, data)?;
        self.detect_attacks(uri, data, &signature)?;

        self.cache.add(uri, data).map_err(wrap_cache_error)?;

        let mut preferences = FeedPreferences::load_for_safe(self.locations, uri);
        preferences.last_checked = Some(Utc::now());
        preferences.save_for(self.locations, uri)?;
        info!("Imported feed {}", uri);
        Ok(())
    }

    fn detect_attacks(&self, uri: &FeedUri, data: &[u8], signature: &Signature) -> Result<()> {
        let feed = Feed::load(data)?;
        match &feed.uri {
            None => return Err(Error::FeedUriMissing(uri.to_string())),
            Some(declared) if declared != uri => {
                return Err(Error::FeedUriMismatch {
                    declared: declared.to_string(),
                    fetched: uri.to_string(),
                });
            }
            Some(_) => {}
        }

        let (Some(new), Some(old)) = (signature.timestamp(), self.old_timestamp(uri)) else {
            return Ok(());
        };
        if new < old {
            return Err(Error::ReplayAttack {
                uri: uri.to_string(),
                old,
                new,
            });
        }
        Ok(())
    }

    /// Timestamp of the trusted signature on the cached copy of `uri`
    fn old_timestamp(&self, uri: &FeedUri) -> Option<DateTime<Utc>> {
        let old_data = self.cache.get_raw(uri).ok()?;
        let signatures = match self.keyring.get_signatures(&old_data) {
            Ok(signatures) => signatures,
            Err(e) => {
                warn!("Failed to verify cached copy of {}: {}", uri, e);
                return None;
            }
        };

        let domain = uri.host()?;
        let trust_db = TrustDb::load_safe(&self.locations.trust_db_file());
        signatures
            .iter()
            .filter(|sig| {
                sig.fingerprint()
                    .is_some_and(|fingerprint| trust_db.is_trusted(fingerprint, &domain))
            })
            .find_map(Signature::timestamp)
    }
}

/// Location of the mirrored copy of `uri`:
/// `<mirror>/feeds/<scheme>/<host>/<path with '/' as %23>/latest.xml`
pub fn mirror_url(mirror: Option<&str>, uri: &FeedUri) -> Option<String> {
    let mirror = mirror?;
    let url = uri.url()?;
    let host = url.host_str()?;
    Some(format!(
        "{}/feeds/{}/{}/{}/latest.xml",
        mirror.trim_end_matches('/'),
        url.scheme(),
        host,
        url.path().trim_start_matches('/').replace('/', "%23")
    ))
}

fn to_delta(duration: std::time::Duration) -> chrono::TimeDelta {
    chrono::TimeDelta::from_std(duration).unwrap_or(chrono::TimeDelta::MAX)
}

/// Network failures and user cancellation pass through; everything else the
/// cache reports becomes an I/O error
fn wrap_cache_error(e: Error) -> Error {
    match e {
        Error::NetworkError(_) | Error::Cancelled | Error::IoError(_) => e,
        other => Error::IoError(other.to_string()),
    }
}

// src/trust/negotiator.rs

//! Deciding whether feed data is signed by a trusted key
//!
//! Trust is scoped to the domain a feed is fetched from. For each check:
//!
//! 1. A valid signature from a key already trusted for the domain wins
//!    immediately.
//! 2. Otherwise every valid signature's key is put up for approval, either
//!    automatically (positive vote from the key information service for a
//!    feed never seen before) or by asking the user.
//! 3. When nothing could be approved but a signature was made by an
//!    unknown key, that key is fetched next to the feed, imported, and the
//!    whole check starts over.

use crate::config::{Config, NetworkLevel};
use crate::error::{Error, Result};
use crate::feeds::cache::FeedCache;
use crate::handler::Handler;
use crate::http::Downloader;
use crate::model::FeedUri;
use crate::paths::Locations;
use crate::trust::db::TrustDb;
use crate::trust::key_info::{KeyInfoClient, has_good_vote};
use crate::trust::signature::{Keyring, Signature};
use std::collections::HashSet;
use std::fs;
use tracing::{debug, info};
use url::Url;

/// Maximum number of missing keys imported during one check
pub const MAX_KEY_IMPORTS: u32 = 3;

/// Establishes trust in signed feed data
pub struct TrustManager<'a> {
    config: &'a Config,
    locations: &'a Locations,
    keyring: &'a dyn Keyring,
    feed_cache: &'a dyn FeedCache,
    downloader: &'a dyn Downloader,
    handler: &'a dyn Handler,
}

impl<'a> TrustManager<'a> {
    pub fn new(
        config: &'a Config,
        locations: &'a Locations,
        keyring: &'a dyn Keyring,
        feed_cache: &'a dyn FeedCache,
        downloader: &'a dyn Downloader,
        handler: &'a dyn Handler,
    ) -> Self {
        Self {
            config,
            locations,
            keyring,
            feed_cache,
            downloader,
            handler,
        }
    }

    /// Find a trusted valid signature on `data` fetched for `uri`
    ///
    /// `mirror` is the URL the data actually came from when a mirror was
    /// used; missing keys are fetched from next to it.
    pub fn check_trust(&self, uri: &FeedUri, mirror: Option<&str>, data: &[u8]) -> Result<Signature> {
        let domain = uri.host().ok_or_else(|| {
            Error::SignatureError(format!("Cannot establish trust for local feed {}", uri))
        })?;

        let mut imported = 0;
        let mut tried_keys = HashSet::new();
        loop {
            self.handler.cancellation().check()?;
            let signatures = self.keyring.get_signatures(data)?;
            let trust_db = TrustDb::load_safe(&self.locations.trust_db_file());

            if let Some(trusted) = signatures.iter().find(|sig| {
                sig.fingerprint()
                    .is_some_and(|fingerprint| trust_db.is_trusted(fingerprint, &domain))
            }) {
                debug!("Feed {} signed by trusted key", uri);
                return Ok(trusted.clone());
            }

            for signature in &signatures {
                let Signature::Valid { fingerprint, .. } = signature else {
                    continue;
                };
                if self.approve(uri, fingerprint, &domain)? {
                    TrustDb::update(
                        &self.locations.trust_db_file(),
                        &self.locations.locks_dir(),
                        |db| db.trust_key(fingerprint, &domain),
                    )?;
                    info!("Trusting key {} for {}", fingerprint, domain);
                    return Ok(signature.clone());
                }
            }

            let missing = signatures.iter().find_map(|sig| match sig {
                Signature::MissingKey { key_id } if !tried_keys.contains(key_id) => Some(key_id.clone()),
                _ => None,
            });
            let Some(key_id) = missing else {
                return Err(Error::NoTrustedSignatures(uri.to_string()));
            };
            if imported >= MAX_KEY_IMPORTS {
                return Err(Error::TrustRetriesExhausted {
                    uri: uri.to_string(),
                    attempts: imported,
                });
            }

            self.fetch_key(uri, mirror, &key_id)?;
            tried_keys.insert(key_id);
            imported += 1;
        }
    }

    fn approve(&self, uri: &FeedUri, fingerprint: &str, domain: &str) -> Result<bool> {
        let hints = if self.config.network_use == NetworkLevel::Offline {
            Vec::new()
        } else {
            self.handler.cancellation().check()?;
            let hints = KeyInfoClient::new(self.config.key_info_server(), self.downloader).lookup(fingerprint);
            self.handler.cancellation().check()?;
            hints
        };

        if self.config.auto_approve_keys && has_good_vote(&hints) && !self.feed_cache.contains(uri) {
            info!("Automatically approving key {} for new feed {}", fingerprint, uri);
            return Ok(true);
        }

        let mut question = format!(
            "Do you want to trust key {} to sign feeds from {}?",
            fingerprint, domain
        );
        for hint in &hints {
            question.push_str(&format!(
                "\n  {} {}",
                if hint.is_good() { "+" } else { "-" },
                hint.text
            ));
        }
        self.handler.ask(&question)
    }

    /// Download `<key_id>.gpg` from next to the feed and import it
    fn fetch_key(&self, uri: &FeedUri, mirror: Option<&str>, key_id: &str) -> Result<()> {
        let base = mirror.unwrap_or(uri.as_str());
        let key_url = Url::parse(base)
            .and_then(|base| base.join(&format!("{}.gpg", key_id)))
            .map_err(|e| Error::SignatureError(format!("Invalid key location for {}: {}", key_id, e)))?;
        info!("Fetching missing key {} from {}", key_id, key_url);

        let key_data = if key_url.scheme() == "file" {
            let path = key_url
                .to_file_path()
                .map_err(|_| Error::SignatureError(format!("Invalid key location {}", key_url)))?;
            fs::read(&path)
                .map_err(|e| Error::SignatureError(format!("Failed to read key {}: {}", path.display(), e)))?
        } else {
            if self.config.network_use == NetworkLevel::Offline {
                return Err(Error::SignatureError(format!(
                    "Key {} is missing and network use is offline",
                    key_id
                )));
            }
            self.handler.cancellation().check()?;
            let data = self.downloader.download(key_url.as_str()).map_err(|e| match e {
                Error::Cancelled => e,
                other => Error::SignatureError(format!("Failed to download key {}: {}", key_id, other)),
            })?;
            self.handler.cancellation().check()?;
            data
        };

        self.keyring.import_key(&key_data)?;
        Ok(())
    }
}

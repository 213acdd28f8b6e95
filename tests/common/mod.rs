// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use sequoia_openpgp as openpgp;
use openpgp::cert::{Cert, CertBuilder};
use openpgp::serialize::SerializeInto;
use std::fs;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use zerodeploy::config::Config;
use zerodeploy::feeds::DiskFeedCache;
use zerodeploy::model::{Architecture, Cpu, FeedUri, Os, Requirements};
use zerodeploy::store::DirectoryStore;
use zerodeploy::trust::{OpenPgp, TrustDb};
use zerodeploy::{Downloader, FeedManager, Handler, Locations, Result};

/// An isolated home directory with a keyring, cache and store.
///
/// Keep the value alive for the duration of the test; dropping it removes
/// the directory.
pub struct TestEnv {
    pub temp: TempDir,
    pub config: Config,
    pub locations: Locations,
    pub keyring: OpenPgp,
    pub cache: DiskFeedCache,
    pub store: DirectoryStore,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().unwrap();
        let locations = Locations::new(temp.path().join("home"));
        let config = Config {
            feed_mirror: String::new(),
            key_info_server: String::new(),
            ..Config::default()
        };
        Self {
            keyring: OpenPgp::new(locations.keyring_dir()),
            cache: DiskFeedCache::new(locations.feed_cache_dir(), locations.locks_dir()),
            store: DirectoryStore::new(locations.store_dir()),
            config,
            locations,
            temp,
        }
    }

    pub fn manager<'a>(
        &'a self,
        downloader: &'a dyn Downloader,
        handler: &'a dyn Handler,
    ) -> FeedManager<'a> {
        FeedManager::new(
            &self.config,
            &self.locations,
            &self.cache,
            &self.keyring,
            downloader,
            handler,
        )
    }

    /// Write a local feed file next to the home directory
    pub fn local_feed(&self, name: &str, elements: &[String]) -> FeedUri {
        let path = self.temp.path().join(name);
        let json = format!(
            "{{\"name\": \"{}\", \"elements\": [{}]}}",
            name,
            elements.join(",")
        );
        fs::write(&path, json).unwrap();
        FeedUri::parse(path.to_str().unwrap()).unwrap()
    }

    /// Import the signer's public key and trust it for `domain`
    pub fn trust(&self, signer: &Cert, domain: &str) -> String {
        let fingerprint = self.keyring.import_key(&public_key(signer)).unwrap();
        TrustDb::update(
            &self.locations.trust_db_file(),
            &self.locations.locks_dir(),
            |db| db.trust_key(&fingerprint, domain),
        )
        .unwrap();
        fingerprint
    }
}

/// Generate a signing key created a week ago so back-dated signatures
/// remain valid.
pub fn signer() -> Cert {
    let (cert, _) = CertBuilder::general_purpose(None, Some("Feed Signer <signer@example.com>"))
        .set_creation_time(SystemTime::now() - Duration::from_secs(7 * 86400))
        .generate()
        .unwrap();
    cert
}

pub fn public_key(cert: &Cert) -> Vec<u8> {
    cert.armored().to_vec().unwrap()
}

/// A feed for `uri` signed at `now - age`
pub fn signed_feed(signer: &Cert, uri: &str, name: &str, elements: &[String], age: Duration) -> Vec<u8> {
    let json = format!(
        "{{\"uri\": \"{}\", \"name\": \"{}\", \"elements\": [{}]}}\n",
        uri,
        name,
        elements.join(",")
    );
    OpenPgp::sign(signer, json.as_bytes(), SystemTime::now() - age).unwrap()
}

/// An implementation element with a `run` command
pub fn implementation(id: &str, version: &str, extra: &str) -> String {
    format!(
        "{{\"implementation\": {{\"id\": \"{}\", \"version\": \"{}\", \"stability\": \"stable\", \"main\": \"bin/app\"{}}}}}",
        id, version, extra
    )
}

/// A `dependencies` attribute fragment for [`implementation`]
pub fn depends_on(interface: &FeedUri, versions: Option<&str>) -> String {
    match versions {
        Some(versions) => format!(
            ", \"dependencies\": [{{\"interface\": \"{}\", \"versions\": \"{}\"}}]",
            interface, versions
        ),
        None => format!(", \"dependencies\": [{{\"interface\": \"{}\"}}]", interface),
    }
}

pub fn linux_requirements(uri: &FeedUri) -> Requirements {
    Requirements::new(uri.clone()).with_architecture(Architecture::new(Os::Linux, Cpu::X86_64))
}

/// Downloader for tests that must never touch the network
pub struct NoNetwork;

impl Downloader for NoNetwork {
    fn download(&self, url: &str) -> Result<Vec<u8>> {
        Err(zerodeploy::Error::NetworkError(format!("no network for {}", url)))
    }
}

// tests/feeds.rs

//! Feed download tests over HTTP: key fetching, trust, replay detection,
//! mirror fallback and offline behavior.

mod common;

use common::{TestEnv, implementation, public_key, signed_feed, signer};
use mockito::{Matcher, Server};
use std::time::Duration;
use zerodeploy::config::NetworkLevel;
use zerodeploy::model::FeedUri;
use zerodeploy::preferences::FeedPreferences;
use zerodeploy::trust::TrustDb;
use zerodeploy::{BatchHandler, Downloader, Error, FeedCache, HttpClient, Result, SilentHandler};

#[test]
fn test_download_fetches_key_and_asks_for_trust() {
    let env = TestEnv::new();
    let cert = signer();
    let mut server = Server::new();
    let uri = format!("{}/feeds/app.json", server.url());

    let feed_mock = server
        .mock("GET", "/feeds/app.json")
        .with_status(200)
        .with_body(signed_feed(
            &cert,
            &uri,
            "app",
            &[implementation("sha1=app", "1.0", "")],
            Duration::ZERO,
        ))
        .expect(1)
        .create();
    let key_mock = server
        .mock("GET", Matcher::Regex(r"^/feeds/[0-9A-F]+\.gpg$".to_string()))
        .with_status(200)
        .with_body(public_key(&cert))
        .expect(1)
        .create();

    let client = HttpClient::new().unwrap();
    let handler = BatchHandler::new(true);
    let manager = env.manager(&client, &handler);
    let feed_uri = FeedUri::parse(&uri).unwrap();

    let feed = manager.get_feed(&feed_uri).unwrap();
    assert_eq!(feed.name, "app");
    assert!(!manager.stale());
    feed_mock.assert();
    key_mock.assert();

    let trust_db = TrustDb::load(&env.locations.trust_db_file()).unwrap();
    assert_eq!(trust_db.keys().len(), 1);
    assert!(trust_db.keys()[0].domains.contains("127.0.0.1"));
    assert!(env.cache.contains(&feed_uri));

    let prefs = FeedPreferences::load_for(&env.locations, &feed_uri).unwrap();
    assert!(prefs.last_checked.is_some());
}

#[test]
fn test_untrusted_key_rejected() {
    let env = TestEnv::new();
    let cert = signer();
    let mut server = Server::new();
    let uri = format!("{}/feeds/app.json", server.url());

    server
        .mock("GET", "/feeds/app.json")
        .with_status(200)
        .with_body(signed_feed(&cert, &uri, "app", &[], Duration::ZERO))
        .create();
    env.keyring.import_key(&public_key(&cert)).unwrap();

    let client = HttpClient::new().unwrap();
    let handler = BatchHandler::new(false);
    let feed_uri = FeedUri::parse(&uri).unwrap();

    let err = env.manager(&client, &handler).get_feed(&feed_uri).unwrap_err();
    assert!(matches!(err, Error::NoTrustedSignatures(_)));
    assert!(!env.cache.contains(&feed_uri));
}

#[test]
fn test_older_feed_is_replay() {
    let env = TestEnv::new();
    let cert = signer();
    env.trust(&cert, "127.0.0.1");
    let mut server = Server::new();
    let uri = format!("{}/feeds/app.json", server.url());
    let feed_uri = FeedUri::parse(&uri).unwrap();

    let current = signed_feed(&cert, &uri, "current", &[], Duration::from_secs(60));
    let client = HttpClient::new().unwrap();
    let handler = SilentHandler::new();
    let manager = env.manager(&client, &handler);
    manager.import_feed(&feed_uri, &current, None).unwrap();

    server
        .mock("GET", "/feeds/app.json")
        .with_status(200)
        .with_body(signed_feed(&cert, &uri, "replayed", &[], Duration::from_secs(86400)))
        .create();
    manager.set_refresh(true);

    let err = manager.get_feed(&feed_uri).unwrap_err();
    assert!(matches!(err, Error::ReplayAttack { .. }));
    assert_eq!(env.cache.get_raw(&feed_uri).unwrap(), current);
}

#[test]
fn test_offline_never_downloads() {
    let mut env = TestEnv::new();
    env.config.network_use = NetworkLevel::Offline;
    let mut server = Server::new();
    let uri = format!("{}/feeds/app.json", server.url());
    let mock = server.mock("GET", "/feeds/app.json").expect(0).create();

    let client = HttpClient::new().unwrap();
    let handler = SilentHandler::new();
    let err = env
        .manager(&client, &handler)
        .get_feed(&FeedUri::parse(&uri).unwrap())
        .unwrap_err();
    assert!(matches!(err, Error::NotFoundError(_)));
    mock.assert();
}

#[test]
fn test_loopback_failure_skips_mirror() {
    let mut env = TestEnv::new();
    env.config.feed_mirror = "http://mirror.invalid/0mirror".to_string();
    let mut server = Server::new();
    let uri = format!("{}/feeds/app.json", server.url());
    server.mock("GET", "/feeds/app.json").with_status(404).create();

    let client = HttpClient::new().unwrap();
    let handler = SilentHandler::new();
    let err = env
        .manager(&client, &handler)
        .get_feed(&FeedUri::parse(&uri).unwrap())
        .unwrap_err();
    let Error::NetworkError(message) = err else {
        panic!("unexpected {:?}", err);
    };
    assert!(message.contains("404"));
}

/// Refuses the primary feed location and forwards everything else
struct PrimaryDown {
    primary: String,
    client: HttpClient,
}

impl Downloader for PrimaryDown {
    fn download(&self, url: &str) -> Result<Vec<u8>> {
        if url == self.primary {
            return Err(Error::NetworkError(format!("connection refused: {}", url)));
        }
        self.client.download(url)
    }
}

#[test]
fn test_mirror_used_when_primary_unreachable() {
    let mut env = TestEnv::new();
    let cert = signer();
    env.trust(&cert, "feeds.example.com");
    let mut server = Server::new();
    env.config.feed_mirror = format!("{}/0mirror/", server.url());

    let uri = "http://feeds.example.com/apps/app.json";
    let mock = server
        .mock(
            "GET",
            Matcher::Regex(r"^/0mirror/feeds/http/feeds\.example\.com/apps(%23|#)app\.json/latest\.xml$".to_string()),
        )
        .with_status(200)
        .with_body(signed_feed(&cert, uri, "mirrored", &[], Duration::ZERO))
        .expect(1)
        .create();

    let downloader = PrimaryDown {
        primary: uri.to_string(),
        client: HttpClient::new().unwrap(),
    };
    let handler = SilentHandler::new();
    let feed_uri = FeedUri::parse(uri).unwrap();

    let feed = env.manager(&downloader, &handler).get_feed(&feed_uri).unwrap();
    assert_eq!(feed.name, "mirrored");
    assert!(env.cache.contains(&feed_uri));
    mock.assert();
}

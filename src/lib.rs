// src/lib.rs

//! Zerodeploy
//!
//! Decentralized software deployment: applications are described by signed
//! feeds published on the web, and a solver picks one implementation per
//! interface for the local machine.
//!
//! # Architecture
//!
//! - Feeds: signed JSON documents, cached on disk and refreshed when stale
//! - Trust: signatures must come from keys trusted for the feed's domain
//! - Solver: depth-first selection over the dependency graph of interfaces
//! - Preferences: per-feed and per-interface user overrides in TOML files

pub mod config;
mod error;
pub mod feeds;
pub mod handler;
pub mod http;
pub mod lock;
pub mod model;
pub mod paths;
pub mod preferences;
pub mod solver;
pub mod store;
pub mod trust;

pub use config::{Config, NetworkLevel};
pub use error::{Error, Result};
pub use feeds::{DiskFeedCache, FeedCache, FeedManager};
pub use handler::{BatchHandler, CancellationToken, CliHandler, Handler, SilentHandler};
pub use http::{Downloader, HttpClient};
pub use model::{Feed, FeedUri, Requirements, Selections};
pub use paths::Locations;
pub use solver::{SimpleSolver, Solver};
pub use store::{DirectoryStore, ImplementationStore};
pub use trust::{OpenPgp, TrustDb, TrustManager};

// src/commands/import.rs

//! Feed import command

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use zerodeploy::{
    Config, DiskFeedCache, Feed, FeedManager, HttpClient, Locations, OpenPgp,
};

use super::interaction_handler;

/// Import a signed feed file, checking its signature like a download
pub fn cmd_import(locations: &Locations, file: &Path, yes: bool) -> Result<()> {
    let data = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let feed = Feed::load(&data)?;
    let Some(uri) = feed.uri else {
        anyhow::bail!("{} does not declare the URI it was published at", file.display());
    };
    if uri.is_local() {
        anyhow::bail!("{} declares the local URI {}; only remote feeds can be imported", file.display(), uri);
    }

    let config = Config::load(&locations.config_file())?;
    let handler = interaction_handler(yes);
    let keyring = OpenPgp::new(locations.keyring_dir());
    let cache = DiskFeedCache::new(locations.feed_cache_dir(), locations.locks_dir());
    let downloader = HttpClient::new()?;

    let feed_manager = FeedManager::new(
        &config,
        locations,
        &cache,
        &keyring,
        &downloader,
        handler.as_ref(),
    );
    feed_manager.import_feed(&uri, &data, None)?;

    println!("Imported feed {} ({})", feed.name, uri);
    Ok(())
}

// src/feeds/mod.rs

//! Feed storage and retrieval
//!
//! - `cache`: raw feed data on disk plus parsed feeds in memory
//! - `manager`: download, mirror fallback, trust and attack checks

pub mod cache;
pub mod manager;

pub use cache::{DiskFeedCache, FeedCache};
pub use manager::FeedManager;

// src/http.rs

//! Fetching bytes from URLs
//!
//! Feeds, keys and key-information replies are all small documents, so the
//! [`Downloader`] seam returns whole bodies. [`HttpClient`] is the real
//! implementation; tests substitute their own.

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use std::fs;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default timeout for HTTP requests (30 seconds)
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of remote documents
pub trait Downloader: Send + Sync {
    /// Fetch the full body at `url`
    ///
    /// Transport failures and non-success statuses are
    /// [`Error::NetworkError`].
    fn download(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blocking HTTP client
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("zerodeploy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    fn read_file_url(url: &str) -> Result<Vec<u8>> {
        let path = Url::parse(url)
            .ok()
            .and_then(|u| u.to_file_path().ok())
            .ok_or_else(|| Error::ParseError(format!("Invalid file URL: {}", url)))?;
        fs::read(&path).map_err(|e| Error::IoError(format!("Failed to read {}: {}", path.display(), e)))
    }
}

impl Downloader for HttpClient {
    fn download(&self, url: &str) -> Result<Vec<u8>> {
        if url.starts_with("file://") {
            return Self::read_file_url(url);
        }

        debug!("Downloading {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::NetworkError(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::NetworkError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| Error::NetworkError(format!("Failed to read response from {}: {}", url, e)))?;
        Ok(bytes.to_vec())
    }
}

// src/model/feed_uri.rs

//! Feed and interface identifiers
//!
//! An identifier is either an absolute `http`, `https` or `file` URL or an
//! absolute local path. Identifiers double as file names in the caches, so
//! they come with two reversible escapings that turn any identifier into a
//! single path segment.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::{Host, Url};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeedUri(String);

impl FeedUri {
    /// Validate an identifier
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidInterfaceId("empty identifier".to_string()));
        }

        if let Some((scheme, _)) = s.split_once("://") {
            if !matches!(scheme, "http" | "https" | "file") {
                return Err(Error::InvalidInterfaceId(format!(
                    "unsupported scheme in '{}'",
                    s
                )));
            }
            let url = Url::parse(s)
                .map_err(|e| Error::InvalidInterfaceId(format!("'{}': {}", s, e)))?;
            return Ok(Self(url.to_string()));
        }

        if Path::new(s).is_absolute() {
            return Ok(Self(s.to_string()));
        }

        Err(Error::InvalidInterfaceId(format!(
            "'{}' is neither an absolute URI nor an absolute path",
            s
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parsed URL for `http`, `https` and `file` identifiers
    pub fn url(&self) -> Option<Url> {
        if self.0.contains("://") {
            Url::parse(&self.0).ok()
        } else {
            None
        }
    }

    /// True for identifiers fetched over the network
    pub fn is_remote(&self) -> bool {
        self.0.starts_with("http://") || self.0.starts_with("https://")
    }

    /// True for plain paths and `file://` URLs
    pub fn is_local(&self) -> bool {
        !self.is_remote()
    }

    /// Filesystem location of a local identifier
    pub fn local_path(&self) -> Option<PathBuf> {
        if self.is_remote() {
            return None;
        }
        match self.url() {
            Some(url) => url.to_file_path().ok(),
            None => Some(PathBuf::from(&self.0)),
        }
    }

    /// Host name of a remote identifier
    pub fn host(&self) -> Option<String> {
        if !self.is_remote() {
            return None;
        }
        self.url()
            .and_then(|url| url.host_str().map(|h| h.to_string()))
    }

    /// True when the identifier points at this machine
    pub fn is_loopback(&self) -> bool {
        let Some(url) = self.url() else {
            return false;
        };
        match url.host() {
            Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
            Some(Host::Ipv4(ip)) => ip.is_loopback(),
            Some(Host::Ipv6(ip)) => ip.is_loopback(),
            None => false,
        }
    }

    /// Escape into a single path segment; reversed by [`FeedUri::unescape`]
    pub fn escape(&self) -> String {
        escape_with(&self.0, |_| None)
    }

    pub fn unescape(escaped: &str) -> Result<Self> {
        Self::parse(&unescape_with(escaped, false)?)
    }

    /// Escape keeping `:` and turning `/` into `#`, for human-readable names
    pub fn pretty_escape(&self) -> String {
        escape_with(&self.0, |c| match c {
            '/' => Some('#'),
            ':' => Some(':'),
            _ => None,
        })
    }

    pub fn pretty_unescape(escaped: &str) -> Result<Self> {
        Self::parse(&unescape_with(escaped, true)?)
    }
}

fn escape_with(value: &str, special: impl Fn(char) -> Option<char>) -> String {
    let mut out = String::with_capacity(value.len() * 2);
    for c in value.chars() {
        if let Some(replacement) = special(c) {
            out.push(replacement);
        } else if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02x}", byte));
            }
        }
    }
    out
}

fn unescape_with(escaped: &str, pretty: bool) -> Result<String> {
    let bytes = escaped.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .map_err(|e| Error::ParseError(e.to_string()))?;
                let byte = u8::from_str_radix(hex, 16).map_err(|_| {
                    Error::ParseError(format!("Invalid escape sequence in '{}'", escaped))
                })?;
                out.push(byte);
                i += 3;
            }
            b'#' if pretty => {
                out.push(b'/');
                i += 1;
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|e| Error::ParseError(e.to_string()))
}

impl fmt::Display for FeedUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FeedUri {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        FeedUri::parse(s)
    }
}

impl AsRef<str> for FeedUri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for FeedUri {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FeedUri {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        FeedUri::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let uri = FeedUri::parse("http://example.com/feed.json").unwrap();
        assert!(uri.is_remote());
        assert_eq!(uri.host().as_deref(), Some("example.com"));

        let path = FeedUri::parse("/opt/feeds/local.json").unwrap();
        assert!(path.is_local());
        assert_eq!(path.local_path(), Some(PathBuf::from("/opt/feeds/local.json")));
        assert_eq!(path.host(), None);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(FeedUri::parse("relative/feed.json").is_err());
        assert!(FeedUri::parse("ftp://example.com/feed").is_err());
        assert!(FeedUri::parse("").is_err());
    }

    #[test]
    fn test_loopback() {
        assert!(FeedUri::parse("http://localhost:8080/feed").unwrap().is_loopback());
        assert!(FeedUri::parse("http://127.0.0.1/feed").unwrap().is_loopback());
        assert!(!FeedUri::parse("http://example.com/feed").unwrap().is_loopback());
    }

    #[test]
    fn test_escape_round_trip() {
        let uri = FeedUri::parse("http://example.com/foo bar/feed.json?x=1").unwrap();
        let escaped = uri.escape();
        assert!(!escaped.contains('/'));
        assert!(!escaped.contains(':'));
        assert_eq!(FeedUri::unescape(&escaped).unwrap(), uri);

        let simple = FeedUri::parse("http://example.com/feed.json").unwrap();
        assert_eq!(simple.escape(), "http%3a%2f%2fexample.com%2ffeed.json");
    }

    #[test]
    fn test_pretty_escape_round_trip() {
        let uri = FeedUri::parse("http://example.com/dir/feed.json").unwrap();
        let escaped = uri.pretty_escape();
        assert_eq!(escaped, "http:##example.com#dir#feed.json");
        assert_eq!(FeedUri::pretty_unescape(&escaped).unwrap(), uri);
    }
}

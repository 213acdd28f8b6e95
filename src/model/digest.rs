// src/model/digest.rs

//! Manifest digests identifying extracted implementation trees
//!
//! A digest may carry several algorithm variants at once. Implementation
//! IDs are usually one of these variants spelled with its prefix, e.g.
//! `sha256new_RPUJPVVH...` or `sha1new=4f860b21...`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const SHA1_PREFIX: &str = "sha1=";
const SHA1NEW_PREFIX: &str = "sha1new=";
const SHA256_PREFIX: &str = "sha256=";
const SHA256NEW_PREFIX: &str = "sha256new_";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ManifestDigest {
    /// SHA-1 hash of the old manifest format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    /// SHA-1 hash of the new manifest format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1new: Option<String>,
    /// SHA-256 hash of the new manifest format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// SHA-256 hash with base32 encoding, safe for use in paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256new: Option<String>,
}

impl ManifestDigest {
    /// Create a digest from a single prefixed ID
    pub fn new(id: &str) -> Result<Self> {
        let mut digest = Self::default();
        digest.parse_id(id);
        if digest.is_empty() {
            return Err(Error::ParseError(format!(
                "'{}' does not use a known digest algorithm",
                id
            )));
        }
        Ok(digest)
    }

    /// Fill in the variant named by a prefixed ID
    ///
    /// Variants that are already set are never overwritten.
    pub fn parse_id(&mut self, id: &str) {
        fill_if_prefixed(&mut self.sha1, id, SHA1_PREFIX);
        fill_if_prefixed(&mut self.sha1new, id, SHA1NEW_PREFIX);
        fill_if_prefixed(&mut self.sha256, id, SHA256_PREFIX);
        fill_if_prefixed(&mut self.sha256new, id, SHA256NEW_PREFIX);
    }

    pub fn is_empty(&self) -> bool {
        self.sha1.is_none() && self.sha1new.is_none() && self.sha256.is_none() && self.sha256new.is_none()
    }

    /// Every set variant as a prefixed ID, strongest first
    pub fn available_digests(&self) -> Vec<String> {
        let mut result = Vec::with_capacity(4);
        if let Some(ref value) = self.sha256new {
            result.push(format!("{}{}", SHA256NEW_PREFIX, value));
        }
        if let Some(ref value) = self.sha256 {
            result.push(format!("{}{}", SHA256_PREFIX, value));
        }
        if let Some(ref value) = self.sha1new {
            result.push(format!("{}{}", SHA1NEW_PREFIX, value));
        }
        if let Some(ref value) = self.sha1 {
            result.push(format!("{}{}", SHA1_PREFIX, value));
        }
        result
    }

    /// The strongest available variant
    pub fn best(&self) -> Option<String> {
        self.available_digests().into_iter().next()
    }

    /// True when no variant conflicts and at least one matches
    pub fn partial_equals(&self, other: &ManifestDigest) -> bool {
        let pairs = [
            (&self.sha1, &other.sha1),
            (&self.sha1new, &other.sha1new),
            (&self.sha256, &other.sha256),
            (&self.sha256new, &other.sha256new),
        ];

        let mut matches = 0;
        for (left, right) in pairs {
            if let (Some(l), Some(r)) = (left, right) {
                if l != r {
                    return false;
                }
                matches += 1;
            }
        }
        matches > 0
    }
}

fn fill_if_prefixed(field: &mut Option<String>, id: &str, prefix: &str) {
    if field.is_none() {
        if let Some(value) = id.strip_prefix(prefix) {
            *field = Some(value.to_string());
        }
    }
}

impl fmt::Display for ManifestDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref value) = self.sha1 {
            parts.push(format!("sha1={}", value));
        }
        if let Some(ref value) = self.sha1new {
            parts.push(format!("sha1new={}", value));
        }
        if let Some(ref value) = self.sha256 {
            parts.push(format!("sha256={}", value));
        }
        if let Some(ref value) = self.sha256new {
            parts.push(format!("sha256new={}", value));
        }
        write!(f, "{}", parts.join(", "))
    }
}

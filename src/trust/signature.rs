// src/trust/signature.rs

//! Signatures found on feed data

use crate::error::{Error, Result};
use crate::model::feed::split_signature;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};

/// Outcome of checking one signature packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    /// Verified against a key in the keyring
    Valid {
        fingerprint: String,
        timestamp: DateTime<Utc>,
    },
    /// Made by a key that is not in the keyring
    MissingKey { key_id: String },
    /// The key is known but the signature does not verify
    Bad { key_id: String },
}

impl Signature {
    pub fn is_valid(&self) -> bool {
        matches!(self, Signature::Valid { .. })
    }

    /// Fingerprint of a valid signature
    pub fn fingerprint(&self) -> Option<&str> {
        match self {
            Signature::Valid { fingerprint, .. } => Some(fingerprint),
            _ => None,
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Signature::Valid { timestamp, .. } => Some(*timestamp),
            _ => None,
        }
    }
}

/// Verifies the signature block attached to feed data
pub trait SignatureVerifier: Send + Sync {
    /// Every signature found on `data`; unsigned data yields none
    fn get_signatures(&self, data: &[u8]) -> Result<Vec<Signature>>;
}

/// A verifier that can also learn new keys
pub trait Keyring: SignatureVerifier {
    /// Import a public key and return its fingerprint
    fn import_key(&self, key_data: &[u8]) -> Result<String>;
}

/// Split signed data into the signed content and decoded signature bytes
pub fn decode_signature_block(data: &[u8]) -> Result<Option<(&[u8], Vec<u8>)>> {
    let (content, block) = split_signature(data);
    let Some(block) = block else {
        return Ok(None);
    };

    let encoded: Vec<u8> = block
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let decoded = STANDARD
        .decode(&encoded)
        .map_err(|e| Error::SignatureError(format!("Invalid base64 in signature block: {}", e)))?;
    Ok(Some((content, decoded)))
}

/// Encode raw signature packets for a signature block
pub fn encode_signature_block(packets: &[u8]) -> String {
    STANDARD.encode(packets)
}

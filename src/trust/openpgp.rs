// src/trust/openpgp.rs

//! OpenPGP signature verification and keyring management
//!
//! Certificates live in a keyring directory, one `<FINGERPRINT>.asc` file
//! per key. Feed signatures are binary signature packets carried in the
//! feed's signature block.

use crate::error::{Error, Result};
use crate::model::feed::append_signature;
use crate::trust::signature::{
    Keyring, Signature, SignatureVerifier, decode_signature_block, encode_signature_block,
};
use chrono::{DateTime, Utc};
use openpgp::cert::Cert;
use openpgp::packet::signature::SignatureBuilder;
use openpgp::parse::Parse;
use openpgp::policy::StandardPolicy;
use openpgp::serialize::SerializeInto;
use openpgp::types::SignatureType;
use openpgp::{KeyHandle, KeyID, Packet, PacketPile};
use sequoia_openpgp as openpgp;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// A certificate in the keyring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    pub fingerprint: String,
    pub user_ids: Vec<String>,
}

/// Keyring-backed OpenPGP operations
pub struct OpenPgp {
    keyring_dir: PathBuf,
    /// OpenPGP policy for signature verification
    policy: StandardPolicy<'static>,
}

impl OpenPgp {
    pub fn new(keyring_dir: impl Into<PathBuf>) -> Self {
        Self {
            keyring_dir: keyring_dir.into(),
            policy: StandardPolicy::new(),
        }
    }

    pub fn keyring_dir(&self) -> &Path {
        &self.keyring_dir
    }

    /// Import a certificate (armored or binary) and return its fingerprint
    ///
    /// Only public key material is stored.
    pub fn import_key(&self, key_data: &[u8]) -> Result<String> {
        let cert = Cert::from_bytes(key_data)
            .map_err(|e| Error::SignatureError(format!("Failed to parse OpenPGP key: {}", e)))?;
        let fingerprint = cert.fingerprint().to_hex();

        let armored = cert
            .armored()
            .to_vec()
            .map_err(|e| Error::SignatureError(format!("Failed to serialize key {}: {}", fingerprint, e)))?;

        fs::create_dir_all(&self.keyring_dir)?;
        let key_path = self.keyring_dir.join(format!("{}.asc", fingerprint));
        fs::write(&key_path, armored)
            .map_err(|e| Error::IoError(format!("Failed to write key {}: {}", key_path.display(), e)))?;

        info!("Imported OpenPGP key {}", fingerprint);
        Ok(fingerprint)
    }

    pub fn import_key_from_file(&self, key_path: &Path) -> Result<String> {
        let key_data = fs::read(key_path)
            .map_err(|e| Error::IoError(format!("Failed to read key file {}: {}", key_path.display(), e)))?;
        self.import_key(&key_data)
    }

    /// Certificates in the keyring; unreadable files are skipped
    fn load_certs(&self) -> Result<Vec<Cert>> {
        if !self.keyring_dir.exists() {
            return Ok(Vec::new());
        }

        let mut certs = Vec::new();
        for entry in fs::read_dir(&self.keyring_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("asc") {
                continue;
            }
            match fs::read(&path).map_err(Error::from).and_then(|data| {
                Cert::from_bytes(&data).map_err(|e| Error::SignatureError(e.to_string()))
            }) {
                Ok(cert) => certs.push(cert),
                Err(e) => warn!("Skipping unreadable key {}: {}", path.display(), e),
            }
        }
        Ok(certs)
    }

    pub fn list_keys(&self) -> Result<Vec<KeyInfo>> {
        let mut keys: Vec<KeyInfo> = self
            .load_certs()?
            .iter()
            .map(|cert| KeyInfo {
                fingerprint: cert.fingerprint().to_hex(),
                user_ids: cert
                    .userids()
                    .map(|uid| String::from_utf8_lossy(uid.userid().value()).into_owned())
                    .collect(),
            })
            .collect();
        keys.sort_by(|a, b| a.fingerprint.cmp(&b.fingerprint));
        Ok(keys)
    }

    fn check_signature(
        &self,
        sig: &openpgp::packet::Signature,
        content: &[u8],
        certs: &[Cert],
    ) -> Signature {
        let issuers: Vec<KeyHandle> = sig.get_issuers();
        let key_id = issuers
            .first()
            .map(|handle| KeyID::from(handle.clone()).to_hex())
            .unwrap_or_default();

        let cert = certs.iter().find(|cert| {
            cert.keys()
                .any(|key| issuers.iter().any(|handle| handle.aliases(key.key().key_handle())))
        });
        let Some(cert) = cert else {
            debug!("No key for signature by {}", key_id);
            return Signature::MissingKey { key_id };
        };

        for key in cert.keys().with_policy(&self.policy, None).for_signing() {
            let mut sig = sig.clone();
            if sig.verify_message(key.key(), content).is_ok() {
                if let Some(created) = sig.signature_creation_time() {
                    return Signature::Valid {
                        fingerprint: cert.fingerprint().to_hex(),
                        timestamp: DateTime::<Utc>::from(created),
                    };
                }
            }
        }

        debug!("Bad signature by {}", key_id);
        Signature::Bad { key_id }
    }

    /// Sign feed content with a secret certificate, creating a signature
    /// timestamped `time`, and return the signed feed data
    pub fn sign(secret: &Cert, content: &[u8], time: SystemTime) -> Result<Vec<u8>> {
        let policy = StandardPolicy::new();
        let mut keypair = secret
            .keys()
            .unencrypted_secret()
            .with_policy(&policy, None)
            .for_signing()
            .next()
            .ok_or_else(|| Error::SignatureError("Certificate has no usable signing key".to_string()))?
            .key()
            .clone()
            .into_keypair()
            .map_err(|e| Error::SignatureError(e.to_string()))?;

        let sig = SignatureBuilder::new(SignatureType::Binary)
            .set_signature_creation_time(time)
            .and_then(|builder| builder.sign_message(&mut keypair, content))
            .map_err(|e| Error::SignatureError(format!("Failed to sign: {}", e)))?;
        let packets = SerializeInto::to_vec(&Packet::from(sig))
            .map_err(|e| Error::SignatureError(e.to_string()))?;

        Ok(append_signature(content, &encode_signature_block(&packets)))
    }
}

impl SignatureVerifier for OpenPgp {
    fn get_signatures(&self, data: &[u8]) -> Result<Vec<Signature>> {
        let Some((content, packets)) = decode_signature_block(data)? else {
            return Ok(Vec::new());
        };

        let pile = PacketPile::from_bytes(&packets)
            .map_err(|e| Error::SignatureError(format!("Failed to parse signature: {}", e)))?;
        let certs = self.load_certs()?;

        let mut signatures = Vec::new();
        for packet in pile.descendants() {
            if let Packet::Signature(sig) = packet {
                signatures.push(self.check_signature(sig, content, &certs));
            }
        }
        Ok(signatures)
    }
}

impl Keyring for OpenPgp {
    fn import_key(&self, key_data: &[u8]) -> Result<String> {
        OpenPgp::import_key(self, key_data)
    }
}

// src/trust/mod.rs

//! Feed signature verification and key trust
//!
//! - `signature`: signature outcomes and the verifier seam
//! - `openpgp`: keyring-backed verification with sequoia
//! - `db`: the persistent database of trusted keys per domain
//! - `key_info`: votes from the key information service
//! - `negotiator`: the trust decision procedure

pub mod db;
pub mod key_info;
pub mod negotiator;
pub mod openpgp;
pub mod signature;

pub use db::{TrustDb, TrustedKey};
pub use key_info::{KeyHint, KeyInfoClient};
pub use negotiator::{MAX_KEY_IMPORTS, TrustManager};
pub use openpgp::{KeyInfo, OpenPgp};
pub use signature::{Keyring, Signature, SignatureVerifier};

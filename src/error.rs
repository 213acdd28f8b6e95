// src/error.rs

//! Crate-wide error type
//!
//! Variants are grouped by the failure classes callers react to:
//! cancellation, trust failures, solver failures, network failures and
//! local I/O. Network errors are never re-wrapped by the layer that first
//! observes them so the root cause survives mirror fallbacks and retries.

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The user or a cancellation token aborted the operation
    #[error("Operation cancelled by user")]
    Cancelled,

    // =========================================================================
    // Trust failures
    // =========================================================================
    #[error("No trusted signatures found for feed {0}")]
    NoTrustedSignatures(String),

    #[error("Feed downloaded from {0} does not declare its own URI")]
    FeedUriMissing(String),

    #[error("Feed declares URI {declared} but was fetched from {fetched}")]
    FeedUriMismatch { declared: String, fetched: String },

    #[error(
        "Replay attack detected for {uri}: cached signature from {old} is newer than downloaded signature from {new}"
    )]
    ReplayAttack {
        uri: String,
        old: chrono::DateTime<chrono::Utc>,
        new: chrono::DateTime<chrono::Utc>,
    },

    #[error("Signature error: {0}")]
    SignatureError(String),

    #[error("Gave up establishing trust for {uri} after importing {attempts} keys")]
    TrustRetriesExhausted { uri: String, attempts: u32 },

    // =========================================================================
    // Solver failures
    // =========================================================================
    #[error("{0}")]
    SolverError(String),

    // =========================================================================
    // Network, I/O and parsing
    // =========================================================================
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid interface ID: {0}")]
    InvalidInterfaceId(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}

impl Error {
    /// Whether this error came from the transport layer
    pub fn is_network(&self) -> bool {
        matches!(self, Error::NetworkError(_))
    }

    /// Whether this error is a user cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Whether this error means a feed failed trust or attack checks
    pub fn is_trust_failure(&self) -> bool {
        matches!(
            self,
            Error::NoTrustedSignatures(_)
                | Error::FeedUriMissing(_)
                | Error::FeedUriMismatch { .. }
                | Error::ReplayAttack { .. }
                | Error::SignatureError(_)
                | Error::TrustRetriesExhausted { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::ParseError(e.to_string())
    }
}

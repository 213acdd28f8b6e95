// src/cli/trust.rs
//! Trust database commands

use clap::Subcommand;

#[derive(Subcommand)]
pub enum TrustCommands {
    /// List trusted keys and their domains
    List,

    /// Trust a key to sign feeds from a domain
    Add {
        /// Key fingerprint
        fingerprint: String,

        /// Domain (host name) the key may sign feeds for
        domain: String,
    },

    /// Stop trusting a key for a domain
    Remove {
        /// Key fingerprint
        fingerprint: String,

        /// Domain to remove
        domain: String,
    },
}

// src/cli/key.rs
//! Keyring commands

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum KeyCommands {
    /// Import a public key (armored or binary)
    Import {
        /// Path to the key file
        file: PathBuf,
    },

    /// List keys in the keyring
    List,
}

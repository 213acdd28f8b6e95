// src/cli/mod.rs
//! CLI definitions for zerodeploy
//!
//! This module contains the command-line interface definitions using clap.
//! The command implementations are in the `commands` module.
//!
//! - `select` - Choose implementations for an interface
//! - `import` - Import a signed feed file
//! - `trust` - Manage trusted keys per domain
//! - `key` - Manage the OpenPGP keyring
//! - `config` - Show or change settings

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod key;
mod trust;

pub use config::ConfigCommands;
pub use key::KeyCommands;
pub use trust::TrustCommands;

#[derive(Parser)]
#[command(name = "zerodeploy")]
#[command(author = "Zerodeploy Contributors")]
#[command(version)]
#[command(about = "Decentralized software deployment with signed feeds", long_about = None)]
pub struct Cli {
    /// Base directory for configuration, caches and keys (default:
    /// $ZERODEPLOY_HOME, else the per-user data directory)
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose implementations for an interface and its dependencies
    Select {
        /// Interface URI or absolute path of a local feed
        interface: String,

        /// Command to select (default: run, or compile with --source)
        #[arg(long)]
        command: Option<String>,

        /// Target operating system (e.g. Linux, Windows, *)
        #[arg(long)]
        os: Option<String>,

        /// Target CPU (e.g. x86_64, i686, *)
        #[arg(long)]
        cpu: Option<String>,

        /// Select source code instead of binaries
        #[arg(long, conflicts_with = "cpu")]
        source: bool,

        /// Acceptable versions of the interface (e.g. 1.2..!2)
        #[arg(long = "version", value_name = "RANGE")]
        versions: Option<String>,

        /// Acceptable versions of another interface
        #[arg(long = "version-for", num_args = 2, value_names = ["URI", "RANGE"], action = ArgAction::Append)]
        version_for: Vec<String>,

        /// Never use the network
        #[arg(long)]
        offline: bool,

        /// Download every feed again, even when cached
        #[arg(long)]
        refresh: bool,

        /// Print the selections as JSON
        #[arg(long)]
        json: bool,

        /// Answer yes to every trust question
        #[arg(short, long)]
        yes: bool,
    },

    /// Import a signed feed file into the cache
    Import {
        /// Path to the feed file
        file: PathBuf,

        /// Answer yes to every trust question
        #[arg(short, long)]
        yes: bool,
    },

    /// Trusted keys per domain
    #[command(subcommand)]
    Trust(TrustCommands),

    /// OpenPGP keyring
    #[command(subcommand)]
    Key(KeyCommands),

    /// Settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

// src/cli/config.rs
//! Configuration commands

use clap::Subcommand;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Change a setting
    Set {
        /// Setting name (e.g. network_use, freshness_secs, feed_mirror)
        key: String,

        /// New value
        value: String,
    },
}

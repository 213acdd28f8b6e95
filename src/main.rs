// src/main.rs

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use zerodeploy::Locations;

mod cli;
mod commands;

use cli::{Cli, Commands, ConfigCommands, KeyCommands, TrustCommands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let locations = match cli.home {
        Some(home) => Locations::new(home),
        None => Locations::from_env(),
    };

    match cli.command {
        Commands::Select {
            interface,
            command,
            os,
            cpu,
            source,
            versions,
            version_for,
            offline,
            refresh,
            json,
            yes,
        } => commands::cmd_select(
            &locations,
            commands::SelectOptions {
                interface,
                command,
                os,
                cpu,
                source,
                versions,
                version_for,
                offline,
                refresh,
                json,
                yes,
            },
        ),

        Commands::Import { file, yes } => commands::cmd_import(&locations, &file, yes),

        Commands::Trust(trust_cmd) => match trust_cmd {
            TrustCommands::List => commands::cmd_trust_list(&locations),
            TrustCommands::Add {
                fingerprint,
                domain,
            } => commands::cmd_trust_add(&locations, &fingerprint, &domain),
            TrustCommands::Remove {
                fingerprint,
                domain,
            } => commands::cmd_trust_remove(&locations, &fingerprint, &domain),
        },

        Commands::Key(key_cmd) => match key_cmd {
            KeyCommands::Import { file } => commands::cmd_key_import(&locations, &file),
            KeyCommands::List => commands::cmd_key_list(&locations),
        },

        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Show => commands::cmd_config_show(&locations),
            ConfigCommands::Set { key, value } => {
                commands::cmd_config_set(&locations, &key, &value)
            }
        },
    }
}

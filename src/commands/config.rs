// src/commands/config.rs

//! Configuration commands

use anyhow::Result;
use tracing::info;

use zerodeploy::{Config, Locations};

/// Print the configuration in effect, defaults included
pub fn cmd_config_show(locations: &Locations) -> Result<()> {
    let config = Config::load(&locations.config_file())?;
    println!("# {}", locations.config_file().display());
    print!("{}", config.to_toml()?);
    Ok(())
}

pub fn cmd_config_set(locations: &Locations, key: &str, value: &str) -> Result<()> {
    let path = locations.config_file();
    let mut config = Config::load(&path)?;
    config.set(key, value)?;
    config.save(&path)?;
    info!("Set {} = {} in {}", key, value, path.display());
    println!("{} = {}", key, value);
    Ok(())
}

// src/commands/key.rs

//! Keyring commands

use anyhow::Result;
use std::path::Path;

use zerodeploy::{Locations, OpenPgp};

pub fn cmd_key_import(locations: &Locations, file: &Path) -> Result<()> {
    let keyring = OpenPgp::new(locations.keyring_dir());
    let fingerprint = keyring.import_key_from_file(file)?;
    println!("Imported key {}", fingerprint);
    Ok(())
}

pub fn cmd_key_list(locations: &Locations) -> Result<()> {
    let keys = OpenPgp::new(locations.keyring_dir()).list_keys()?;
    if keys.is_empty() {
        println!("Keyring is empty.");
        return Ok(());
    }

    for key in keys {
        println!("{}", key.fingerprint);
        for user_id in &key.user_ids {
            println!("  {}", user_id);
        }
    }
    Ok(())
}

// src/commands/trust.rs

//! Trust database commands

use anyhow::Result;
use tracing::info;

use zerodeploy::{Locations, TrustDb};

pub fn cmd_trust_list(locations: &Locations) -> Result<()> {
    let db = TrustDb::load(&locations.trust_db_file())?;
    if db.keys().is_empty() {
        println!("No trusted keys.");
        return Ok(());
    }

    for key in db.keys() {
        println!("{}", key.fingerprint);
        for domain in &key.domains {
            println!("  {}", domain);
        }
    }
    Ok(())
}

pub fn cmd_trust_add(locations: &Locations, fingerprint: &str, domain: &str) -> Result<()> {
    TrustDb::update(&locations.trust_db_file(), &locations.locks_dir(), |db| {
        db.trust_key(fingerprint, domain)
    })?;
    info!("Trusting {} for {}", fingerprint, domain);
    println!("Trusting key {} for {}", fingerprint, domain);
    Ok(())
}

pub fn cmd_trust_remove(locations: &Locations, fingerprint: &str, domain: &str) -> Result<()> {
    let before = TrustDb::load(&locations.trust_db_file())?;
    if !before.is_trusted(fingerprint, domain) {
        println!("Key {} is not trusted for {}", fingerprint, domain);
        return Ok(());
    }

    TrustDb::update(&locations.trust_db_file(), &locations.locks_dir(), |db| {
        db.untrust_key(fingerprint, domain)
    })?;
    println!("No longer trusting key {} for {}", fingerprint, domain);
    Ok(())
}

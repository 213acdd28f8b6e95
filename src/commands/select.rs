// src/commands/select.rs

//! Implementation selection command

use anyhow::{Context, Result};
use tracing::info;

use zerodeploy::model::{Architecture, Cpu, Os, VersionRange};
use zerodeploy::{
    Config, DirectoryStore, DiskFeedCache, FeedManager, FeedUri, HttpClient, Locations,
    NetworkLevel, OpenPgp, Requirements, SimpleSolver, Solver,
};

use super::interaction_handler;

/// Options of `zerodeploy select`
#[derive(Debug, Default)]
pub struct SelectOptions {
    pub interface: String,
    pub command: Option<String>,
    pub os: Option<String>,
    pub cpu: Option<String>,
    pub source: bool,
    pub versions: Option<String>,
    /// Flattened `URI RANGE` pairs
    pub version_for: Vec<String>,
    pub offline: bool,
    pub refresh: bool,
    pub json: bool,
    pub yes: bool,
}

impl SelectOptions {
    fn requirements(&self) -> Result<Requirements> {
        let mut requirements = Requirements::new(FeedUri::parse(&self.interface)?);
        requirements.command = self.command.clone();

        let mut architecture = Architecture::default();
        if let Some(ref os) = self.os {
            architecture.os = Os::parse(os);
        }
        if let Some(ref cpu) = self.cpu {
            architecture.cpu = Cpu::parse(cpu);
        }
        if self.source {
            architecture.cpu = Cpu::Source;
        }
        requirements.architecture = architecture;

        if let Some(ref versions) = self.versions {
            requirements.versions = Some(VersionRange::parse(versions)?);
        }
        for pair in self.version_for.chunks(2) {
            let [interface, range] = pair else {
                anyhow::bail!("--version-for needs a URI and a range");
            };
            requirements
                .extra_restrictions
                .insert(interface.clone(), VersionRange::parse(range)?);
        }
        Ok(requirements)
    }
}

/// Solve the requirements and print the selections
pub fn cmd_select(locations: &Locations, options: SelectOptions) -> Result<()> {
    let requirements = options.requirements()?;
    info!("Selecting {}", requirements.to_command_line());

    let mut config = Config::load(&locations.config_file())?;
    if options.offline {
        config.network_use = NetworkLevel::Offline;
    }

    let handler = interaction_handler(options.yes);
    let keyring = OpenPgp::new(locations.keyring_dir());
    let cache = DiskFeedCache::new(locations.feed_cache_dir(), locations.locks_dir());
    let downloader = HttpClient::new()?;
    let store = DirectoryStore::new(locations.store_dir());

    let feed_manager = FeedManager::new(
        &config,
        locations,
        &cache,
        &keyring,
        &downloader,
        handler.as_ref(),
    );
    feed_manager.set_refresh(options.refresh);

    let solver = SimpleSolver::new(&config, locations, &feed_manager, &store);
    let (selections, stale) = solver
        .solve(&requirements)
        .with_context(|| format!("Failed to select {}", requirements.interface_uri))?;

    if options.json {
        println!("{}", selections.to_json()?);
    } else {
        print!("{}", selections);
    }

    if stale {
        println!();
        println!("Some feeds could not be updated; results may be out of date.");
        println!("Run again with --refresh once the network is reachable.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirements_from_options() {
        let options = SelectOptions {
            interface: "http://example.com/app.json".to_string(),
            command: Some("test".to_string()),
            os: Some("Linux".to_string()),
            versions: Some("1..!2".to_string()),
            version_for: vec!["http://example.com/lib.json".to_string(), "2..".to_string()],
            ..Default::default()
        };
        let requirements = options.requirements().unwrap();
        assert_eq!(
            requirements.to_command_line_args(),
            [
                "--command",
                "test",
                "--os",
                "Linux",
                "--version",
                "1..!2",
                "--version-for",
                "http://example.com/lib.json",
                "2..",
                "http://example.com/app.json",
            ]
        );
    }

    #[test]
    fn test_source_and_invalid_interface() {
        let options = SelectOptions {
            interface: "/srv/feeds/tool.json".to_string(),
            source: true,
            ..Default::default()
        };
        assert!(options.requirements().unwrap().is_source());

        let options = SelectOptions {
            interface: "relative/tool.json".to_string(),
            ..Default::default()
        };
        assert!(options.requirements().is_err());
    }
}

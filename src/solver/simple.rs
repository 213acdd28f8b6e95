// src/solver/simple.rs

//! Depth-first in-process solver
//!
//! Interfaces are resolved in declaration order. The best suitable candidate
//! for each interface is chosen once and never revisited, so a later
//! restriction that excludes an earlier choice fails the solve instead of
//! backtracking.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::feeds::FeedManager;
use crate::model::{
    Architecture, Command, Cpu, Dependency, FeedUri, Importance, ImplementationSelection,
    Requirements, Restriction, Selections, Stability, VersionRange,
};
use crate::paths::Locations;
use crate::preferences::{FeedPreferences, InterfacePreferences};
use crate::solver::Solver;
use crate::solver::candidate::{CandidateFilter, CandidateRanking, SelectionCandidate};
use crate::store::ImplementationStore;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Solver choosing the best candidate per interface without backtracking
pub struct SimpleSolver<'a> {
    config: &'a Config,
    locations: &'a Locations,
    feed_manager: &'a FeedManager<'a>,
    store: &'a dyn ImplementationStore,
}

/// Everything accumulated during one solve
struct SolveState {
    requirements: Requirements,
    selections: Selections,

    /// Combined version range per interface from every restriction seen
    restrictions: HashMap<String, VersionRange>,

    /// Interfaces currently being resolved or already resolved
    resolving: HashSet<String>,
}

impl SolveState {
    /// Narrow the acceptable versions of `interface`
    fn restrict(&mut self, interface: &str, range: Option<VersionRange>, source: &str) -> Result<()> {
        let Some(range) = range else {
            return Err(Error::SolverError(format!(
                "Constraints on {} from {} leave no acceptable version",
                interface, source
            )));
        };
        if range.is_unrestricted() {
            return Ok(());
        }

        let combined = match self.restrictions.get(interface) {
            Some(existing) => existing.intersect(&range).ok_or_else(|| {
                Error::SolverError(format!(
                    "Version restrictions on {} from {} conflict: {} and {}",
                    interface, source, existing, range
                ))
            })?,
            None => range,
        };

        if let Some(selected) = self.selections.get(interface) {
            let satisfied = selected.version.as_ref().is_some_and(|v| combined.matches(v));
            if !satisfied {
                return Err(Error::SolverError(format!(
                    "{} requires {} {}, but {} was already selected",
                    source, interface, combined, selected.id
                )));
            }
        }

        self.restrictions.insert(interface.to_string(), combined);
        Ok(())
    }
}

impl<'a> SimpleSolver<'a> {
    pub fn new(
        config: &'a Config,
        locations: &'a Locations,
        feed_manager: &'a FeedManager<'a>,
        store: &'a dyn ImplementationStore,
    ) -> Self {
        Self {
            config,
            locations,
            feed_manager,
            store,
        }
    }

    /// Stability policy for an interface: the user's choice, else the
    /// global default
    fn stability_policy(&self, preferences: &InterfacePreferences) -> Stability {
        let default = if self.config.help_with_testing {
            Stability::Testing
        } else {
            Stability::Stable
        };
        preferences.stability_policy.or(default)
    }

    /// Architecture dependencies are resolved for; source builds need
    /// binaries for the build machine
    fn dependency_architecture(architecture: Architecture) -> Architecture {
        if architecture.cpu == Cpu::Source {
            Architecture::new(architecture.os, Architecture::current_system().cpu)
        } else {
            architecture
        }
    }

    fn resolve(
        &self,
        state: &mut SolveState,
        interface: &FeedUri,
        command: Option<&str>,
        architecture: Architecture,
    ) -> Result<()> {
        self.feed_manager.handler().cancellation().check()?;

        if state.resolving.contains(interface.as_str()) {
            return self.add_command(state, interface, command, architecture);
        }
        state.resolving.insert(interface.to_string());

        let candidates = self.candidates(state, interface, command, architecture)?;
        let Some(chosen) = candidates.iter().find(|c| c.is_suitable()) else {
            return Err(Error::SolverError(rejection_report(interface, &candidates)));
        };
        debug!("Selected {} for {}", chosen, interface);

        let command_def = match command {
            Some(name) if !name.is_empty() => {
                let found = chosen.implementation.get_command(name).cloned();
                if let Some(ref cmd) = found {
                    check_runner(interface, cmd)?;
                }
                found
            }
            _ => None,
        };

        let implementation = &chosen.implementation;
        let selection = ImplementationSelection {
            interface: interface.clone(),
            from_feed: (chosen.feed != *interface).then(|| chosen.feed.clone()),
            id: implementation.id.clone(),
            manifest_digest: implementation.manifest_digest.clone(),
            architecture: implementation.architecture(),
            version: implementation.version().cloned(),
            released: implementation.attributes.released,
            stability: chosen.effective_stability(),
            license: implementation.attributes.license.clone(),
            local_path: implementation.local_path.clone(),
            dependencies: implementation.attributes.dependencies.clone(),
            bindings: implementation.attributes.bindings.clone(),
            commands: command_def.iter().cloned().collect(),
        };
        state.selections.implementations.push(selection);

        let source = implementation.id.clone();
        let restrictions = implementation.attributes.restrictions.clone();
        let dependencies = implementation.attributes.dependencies.clone();
        self.apply_restrictions(state, &restrictions, &source, architecture)?;
        self.resolve_dependencies(state, &dependencies, command, &source, architecture)?;

        if let Some(cmd) = command_def {
            self.resolve_command(state, &cmd, &source, architecture)?;
        }
        Ok(())
    }

    /// Add a further command to an interface resolved earlier
    fn add_command(
        &self,
        state: &mut SolveState,
        interface: &FeedUri,
        command: Option<&str>,
        architecture: Architecture,
    ) -> Result<()> {
        let Some(name) = command.filter(|name| !name.is_empty()) else {
            return Ok(());
        };
        let Some(selection) = state.selections.get(interface.as_str()) else {
            // Still being resolved further up the stack
            return Ok(());
        };
        if selection.commands.iter().any(|c| c.name == name) {
            return Ok(());
        }

        let feed_uri = selection.from_feed.clone().unwrap_or_else(|| interface.clone());
        let id = selection.id.clone();
        let feed = self.feed_manager.get_feed(&feed_uri)?;
        let cmd = feed
            .get_implementation(&id)?
            .get_command(name)
            .cloned()
            .ok_or_else(|| {
                Error::SolverError(format!(
                    "{} selected for {} has no '{}' command",
                    id, interface, name
                ))
            })?;
        check_runner(interface, &cmd)?;

        if let Some(selection) = state.selections.get_mut(interface.as_str()) {
            selection.commands.push(cmd.clone());
        }
        self.resolve_command(state, &cmd, &id, architecture)
    }

    fn resolve_command(
        &self,
        state: &mut SolveState,
        command: &Command,
        source: &str,
        architecture: Architecture,
    ) -> Result<()> {
        self.apply_restrictions(state, &command.restrictions, source, architecture)?;
        self.resolve_dependencies(state, &command.dependencies, None, source, architecture)
    }

    fn apply_restrictions(
        &self,
        state: &mut SolveState,
        restrictions: &[Restriction],
        source: &str,
        architecture: Architecture,
    ) -> Result<()> {
        for restriction in restrictions {
            if restriction.applies_to(&architecture.os) {
                state.restrict(&restriction.interface, restriction.effective_versions(), source)?;
            }
        }
        Ok(())
    }

    fn resolve_dependencies(
        &self,
        state: &mut SolveState,
        dependencies: &[Dependency],
        command: Option<&str>,
        source: &str,
        architecture: Architecture,
    ) -> Result<()> {
        let architecture = Self::dependency_architecture(architecture);
        for dependency in dependencies {
            if !dependency.is_needed_for(command) || !dependency.restriction.applies_to(&architecture.os) {
                debug!("Skipping dependency of {} on {}", source, dependency.interface());
                continue;
            }

            match dependency.importance {
                Importance::Essential => self.resolve_dependency(state, dependency, source, architecture)?,
                Importance::Recommended => {
                    let restrictions = state.restrictions.clone();
                    let resolving = state.resolving.clone();
                    let selected = state.selections.implementations.clone();
                    if let Err(e) = self.resolve_dependency(state, dependency, source, architecture) {
                        if e.is_cancelled() {
                            return Err(e);
                        }
                        warn!(
                            "Skipping recommended dependency of {} on {}: {}",
                            source,
                            dependency.interface(),
                            e
                        );
                        state.restrictions = restrictions;
                        state.resolving = resolving;
                        state.selections.implementations = selected;
                    }
                }
            }
        }
        Ok(())
    }

    fn resolve_dependency(
        &self,
        state: &mut SolveState,
        dependency: &Dependency,
        source: &str,
        architecture: Architecture,
    ) -> Result<()> {
        let interface = FeedUri::parse(dependency.interface())?;
        state.restrict(interface.as_str(), dependency.effective_versions(), source)?;

        let commands = dependency.binding_commands();
        if commands.is_empty() {
            return self.resolve(state, &interface, None, architecture);
        }
        // After the first command the interface is resolving, so the rest are added to it
        for command in commands {
            self.resolve(state, &interface, Some(command), architecture)?;
        }
        Ok(())
    }

    /// Every implementation offered for `interface`, best first
    fn candidates(
        &self,
        state: &SolveState,
        interface: &FeedUri,
        command: Option<&str>,
        architecture: Architecture,
    ) -> Result<Vec<SelectionCandidate>> {
        let interface_preferences = InterfacePreferences::load_for_safe(self.locations, interface);
        let filter = CandidateFilter {
            architecture,
            languages: &state.requirements.languages,
            command,
            versions: state.restrictions.get(interface.as_str()),
            network_use: self.config.network_use,
        };

        let main_feed = self.feed_manager.get_feed(interface)?;
        let mut feeds = vec![(interface.clone(), Arc::clone(&main_feed))];
        let extra_sources = main_feed
            .feeds
            .iter()
            .filter(|reference| {
                reference.arch.is_compatible(&architecture)
                    && (reference.langs.is_empty()
                        || state.requirements.languages.is_empty()
                        || reference.langs.iter().any(|l| state.requirements.languages.contains(l)))
            })
            .chain(interface_preferences.feeds.iter())
            .map(|reference| reference.src.clone());

        let mut seen = HashSet::from([interface.to_string()]);
        for src in extra_sources {
            if !seen.insert(src.clone()) {
                continue;
            }
            match FeedUri::parse(&src).and_then(|uri| Ok((self.feed_manager.get_feed(&uri)?, uri))) {
                Ok((feed, uri)) => feeds.push((uri, feed)),
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => warn!("Failed to load feed {} for {}: {}", src, interface, e),
            }
        }

        let mut candidates = Vec::new();
        for (feed_uri, feed) in &feeds {
            let preferences = FeedPreferences::load_for_safe(self.locations, feed_uri);
            for implementation in feed.implementations() {
                let cached = implementation.local_path.is_some()
                    || self.store.contains(&implementation.manifest_digest);
                candidates.push(SelectionCandidate::new(
                    feed_uri.clone(),
                    implementation.clone(),
                    preferences.user_stability(&implementation.id),
                    cached,
                    &filter,
                ));
            }
            for package in feed.package_implementations() {
                candidates.push(SelectionCandidate::native(feed_uri.clone(), package));
            }
        }

        let ranking = CandidateRanking {
            policy: self.stability_policy(&interface_preferences),
            network_use: self.config.network_use,
        };
        ranking.sort(&mut candidates);
        for candidate in &candidates {
            debug!("Candidate for {}: {}", interface, candidate);
        }
        Ok(candidates)
    }
}

impl Solver for SimpleSolver<'_> {
    fn solve(&self, requirements: &Requirements) -> Result<(Selections, bool)> {
        self.feed_manager.reset_stale();
        let mut requirements = requirements.clone();
        requirements.fill_in_architecture(&Architecture::current_system());
        let command = requirements.effective_command().map(str::to_string);
        info!(
            "Solving {} for {}",
            requirements.interface_uri, requirements.architecture
        );

        let mut state = SolveState {
            selections: Selections::new(requirements.interface_uri.clone(), command.clone()),
            restrictions: HashMap::new(),
            resolving: HashSet::new(),
            requirements,
        };
        let mut seeds: Vec<String> = state.requirements.extra_restrictions.keys().cloned().collect();
        seeds.push(state.requirements.interface_uri.to_string());
        for interface in seeds {
            let range = state.requirements.versions_for(&interface);
            if range.is_some() {
                state.restrict(&interface, range, "the requirements")?;
            }
        }

        let interface = state.requirements.interface_uri.clone();
        let architecture = state.requirements.architecture;
        self.resolve(&mut state, &interface, command.as_deref(), architecture)?;

        Ok((state.selections, self.feed_manager.stale()))
    }
}

fn check_runner(interface: &FeedUri, command: &Command) -> Result<()> {
    match command.runner {
        Some(ref runner) => Err(Error::SolverError(format!(
            "Command '{}' of {} needs runner {}, which this solver does not support",
            command.name,
            interface,
            runner.dependency.interface()
        ))),
        None => Ok(()),
    }
}

/// Lists every candidate with the reason it was rejected
fn rejection_report(interface: &FeedUri, candidates: &[SelectionCandidate]) -> String {
    if candidates.is_empty() {
        return format!("No implementations of {} are available", interface);
    }
    let mut report = format!("No suitable implementation of {} found:", interface);
    for candidate in candidates {
        report.push_str(&format!("\n  {}", candidate));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkLevel;
    use crate::feeds::DiskFeedCache;
    use crate::handler::{Handler, SilentHandler};
    use crate::http::Downloader;
    use crate::model::Os;
    use crate::store::DirectoryStore;
    use crate::trust::OpenPgp;
    use std::fs;
    use tempfile::TempDir;

    struct NoNetwork;

    impl Downloader for NoNetwork {
        fn download(&self, url: &str) -> Result<Vec<u8>> {
            Err(Error::NetworkError(format!("no network for {}", url)))
        }
    }

    struct Fixture {
        temp: TempDir,
        config: Config,
        locations: Locations,
        cache: DiskFeedCache,
        keyring: OpenPgp,
        handler: SilentHandler,
        store: DirectoryStore,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let locations = Locations::new(temp.path().join("home"));
            Self {
                cache: DiskFeedCache::new(locations.feed_cache_dir(), locations.locks_dir()),
                keyring: OpenPgp::new(locations.keyring_dir()),
                store: DirectoryStore::new(locations.store_dir()),
                handler: SilentHandler::new(),
                config: Config {
                    feed_mirror: String::new(),
                    key_info_server: String::new(),
                    ..Config::default()
                },
                locations,
                temp,
            }
        }

        fn path(&self, name: &str) -> String {
            self.temp.path().join(name).to_string_lossy().into_owned()
        }

        fn feed(&self, name: &str, elements: &str) -> FeedUri {
            let path = self.path(name);
            let json = format!("{{\"name\": \"{}\", \"elements\": [{}]}}", name, elements);
            fs::write(&path, json).unwrap();
            FeedUri::parse(&path).unwrap()
        }

        fn solve(&self, requirements: &Requirements) -> Result<(Selections, bool)> {
            let manager = FeedManager::new(
                &self.config,
                &self.locations,
                &self.cache,
                &self.keyring,
                &NoNetwork,
                &self.handler,
            );
            SimpleSolver::new(&self.config, &self.locations, &manager, &self.store).solve(requirements)
        }
    }

    fn implementation(id: &str, version: &str, extra: &str) -> String {
        format!(
            "{{\"implementation\": {{\"id\": \"{}\", \"version\": \"{}\", \"stability\": \"stable\", \"main\": \"bin/app\"{}}}}}",
            id, version, extra
        )
    }

    fn requirements(uri: &FeedUri) -> Requirements {
        Requirements::new(uri.clone()).with_architecture(Architecture::new(Os::Linux, Cpu::X86_64))
    }

    fn version_of(selections: &Selections, uri: &FeedUri) -> String {
        selections.get(uri.as_str()).unwrap().version.as_ref().unwrap().to_string()
    }

    #[test]
    fn test_selects_best_with_dependency() {
        let fixture = Fixture::new();
        let lib = fixture.feed(
            "lib.json",
            &[
                implementation("sha1=lib1", "1.0", ""),
                implementation("sha1=lib2", "2.0", ""),
            ]
            .join(","),
        );
        let deps = format!(", \"dependencies\": [{{\"interface\": \"{}\", \"versions\": \"..!2\"}}]", lib);
        let app = fixture.feed(
            "app.json",
            &[
                implementation("sha1=app1", "1.0", &deps),
                implementation("sha1=app2", "1.5", &deps),
            ]
            .join(","),
        );

        let (selections, stale) = fixture.solve(&requirements(&app)).unwrap();
        assert!(!stale);
        assert_eq!(selections.implementations.len(), 2);
        assert_eq!(version_of(&selections, &app), "1.5");
        assert_eq!(version_of(&selections, &lib), "1.0");
        assert_eq!(selections.command.as_deref(), Some("run"));
        assert_eq!(selections.main_implementation().unwrap().commands[0].name, "run");
    }

    #[test]
    fn test_cyclic_dependencies() {
        let fixture = Fixture::new();
        let a = fixture.path("a.json");
        let b = fixture.path("b.json");
        let a = fixture.feed(
            "a.json",
            &implementation("sha1=a", "1", &format!(", \"dependencies\": [{{\"interface\": \"{}\"}}]", b)),
        );
        fixture.feed(
            "b.json",
            &implementation("sha1=b", "1", &format!(", \"dependencies\": [{{\"interface\": \"{}\"}}]", a)),
        );

        let (selections, _) = fixture.solve(&requirements(&a)).unwrap();
        assert_eq!(selections.implementations.len(), 2);
        assert_eq!(selections.walk().len(), 2);
    }

    #[test]
    fn test_report_lists_rejections() {
        let fixture = Fixture::new();
        let app = fixture.feed(
            "app.json",
            &[
                implementation("sha1=win", "1.0", ", \"arch\": \"Windows-*\""),
                implementation("sha1=bad", "2.0", "").replace("\"stable\"", "\"buggy\""),
            ]
            .join(","),
        );

        let err = fixture.solve(&requirements(&app)).unwrap_err();
        let Error::SolverError(report) = err else {
            panic!("unexpected {:?}", err);
        };
        assert!(report.contains("sha1=win (1.0, stable): incompatible architecture"));
        assert!(report.contains("sha1=bad (2.0, buggy): marked as buggy"));
    }

    #[test]
    fn test_offline_requires_cached() {
        let mut fixture = Fixture::new();
        fixture.config.network_use = NetworkLevel::Offline;
        let app = fixture.feed(
            "app.json",
            &[
                implementation("sha1=old", "1.0", ""),
                implementation("sha1=new", "2.0", ""),
            ]
            .join(","),
        );

        let err = fixture.solve(&requirements(&app)).unwrap_err();
        assert!(err.to_string().contains("not cached"));

        fs::create_dir_all(fixture.locations.store_dir().join("sha1=old")).unwrap();
        let (selections, _) = fixture.solve(&requirements(&app)).unwrap();
        assert_eq!(selections.main_implementation().unwrap().id, "sha1=old");
    }

    #[test]
    fn test_user_stability_and_policy() {
        let fixture = Fixture::new();
        let app = fixture.feed(
            "app.json",
            &[
                implementation("sha1=one", "1.0", ""),
                implementation("sha1=two", "2.0", ""),
            ]
            .join(","),
        );

        let mut prefs = FeedPreferences::default();
        prefs.get_or_create_implementation("sha1=two").user_stability = Stability::Testing;
        prefs.save_for(&fixture.locations, &app).unwrap();
        let (selections, _) = fixture.solve(&requirements(&app)).unwrap();
        assert_eq!(selections.main_implementation().unwrap().id, "sha1=one");

        let mut interface_prefs = InterfacePreferences {
            stability_policy: Stability::Testing,
            ..Default::default()
        };
        interface_prefs.save_for(&fixture.locations, &app).unwrap();
        let (selections, _) = fixture.solve(&requirements(&app)).unwrap();
        assert_eq!(selections.main_implementation().unwrap().id, "sha1=two");
    }

    #[test]
    fn test_extra_restrictions_and_conflicts() {
        let fixture = Fixture::new();
        let lib = fixture.feed(
            "lib.json",
            &[
                implementation("sha1=lib1", "1.0", ""),
                implementation("sha1=lib2", "2.0", ""),
            ]
            .join(","),
        );
        let app = fixture.feed(
            "app.json",
            &implementation(
                "sha1=app",
                "1.0",
                &format!(", \"dependencies\": [{{\"interface\": \"{}\", \"versions\": \"2..\"}}]", lib),
            ),
        );

        let (selections, _) = fixture.solve(&requirements(&app)).unwrap();
        assert_eq!(version_of(&selections, &lib), "2.0");

        let mut narrowed = requirements(&app);
        narrowed
            .extra_restrictions
            .insert(lib.to_string(), VersionRange::parse("..!2").unwrap());
        let err = fixture.solve(&narrowed).unwrap_err();
        assert!(matches!(err, Error::SolverError(_)));
    }

    #[test]
    fn test_runner_not_supported() {
        let fixture = Fixture::new();
        let python = fixture.path("python.json");
        let app = fixture.feed(
            "app.json",
            &format!(
                "{{\"implementation\": {{\"id\": \"sha1=app\", \"version\": \"1\", \"commands\": [{{\"name\": \"run\", \"path\": \"app.py\", \"runner\": {{\"interface\": \"{}\"}}}}]}}}}",
                python
            ),
        );

        let err = fixture.solve(&requirements(&app)).unwrap_err();
        assert!(err.to_string().contains("runner"));
    }

    #[test]
    fn test_recommended_dependency_skipped() {
        let fixture = Fixture::new();
        let missing = fixture.path("missing.json");
        let app = fixture.feed(
            "app.json",
            &implementation(
                "sha1=app",
                "1.0",
                &format!(
                    ", \"dependencies\": [{{\"interface\": \"{}\", \"importance\": \"recommended\"}}]",
                    missing
                ),
            ),
        );

        let (selections, _) = fixture.solve(&requirements(&app)).unwrap();
        assert_eq!(selections.implementations.len(), 1);
    }

    #[test]
    fn test_executable_binding_adds_command() {
        let fixture = Fixture::new();
        let lib = fixture.feed("lib.json", &implementation("sha1=lib", "1.0", ", \"self_test\": \"tests/run\""));
        let tool = fixture.feed(
            "tool.json",
            &implementation(
                "sha1=tool",
                "1.0",
                &format!(
                    ", \"dependencies\": [{{\"interface\": \"{}\", \"bindings\": [{{\"executable_in_var\": {{\"name\": \"LIB_TESTS\", \"command\": \"test\"}}}}]}}]",
                    lib
                ),
            ),
        );
        let app = fixture.feed(
            "app.json",
            &implementation(
                "sha1=app",
                "1.0",
                &format!(
                    ", \"dependencies\": [{{\"interface\": \"{}\"}}, {{\"interface\": \"{}\"}}]",
                    lib, tool
                ),
            ),
        );

        let (selections, _) = fixture.solve(&requirements(&app)).unwrap();
        let commands: Vec<&str> = selections
            .get(lib.as_str())
            .unwrap()
            .commands
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(commands, ["test"]);
    }

    #[test]
    fn test_failed_recommended_dependency_restores_commands() {
        let fixture = Fixture::new();
        let lib = fixture.feed("lib.json", &implementation("sha1=lib", "1.0", ", \"self_test\": \"tests/run\""));
        let empty = fixture.feed("empty.json", "");
        let plugin = fixture.feed(
            "plugin.json",
            &implementation(
                "sha1=plugin",
                "1.0",
                &format!(
                    ", \"dependencies\": [{{\"interface\": \"{}\", \"bindings\": [{{\"executable_in_var\": {{\"name\": \"LIB_TESTS\", \"command\": \"test\"}}}}]}}, {{\"interface\": \"{}\"}}]",
                    lib, empty
                ),
            ),
        );
        let app = fixture.feed(
            "app.json",
            &implementation(
                "sha1=app",
                "1.0",
                &format!(
                    ", \"dependencies\": [{{\"interface\": \"{}\"}}, {{\"interface\": \"{}\", \"importance\": \"recommended\"}}]",
                    lib, plugin
                ),
            ),
        );

        let (selections, _) = fixture.solve(&requirements(&app)).unwrap();
        assert_eq!(selections.implementations.len(), 2);
        assert!(!selections.contains(plugin.as_str()));
        assert!(!selections.contains(empty.as_str()));
        assert!(selections.get(lib.as_str()).unwrap().commands.is_empty());
    }

    #[test]
    fn test_testing_dependencies_only_for_test_command() {
        let fixture = Fixture::new();
        let harness = fixture.feed("harness.json", &implementation("sha1=h", "1", ""));
        let app = fixture.feed(
            "app.json",
            &implementation(
                "sha1=app",
                "1.0",
                &format!(
                    ", \"self_test\": \"run-tests\", \"dependencies\": [{{\"interface\": \"{}\", \"use\": \"testing\"}}]",
                    harness
                ),
            ),
        );

        let (selections, _) = fixture.solve(&requirements(&app)).unwrap();
        assert!(!selections.contains(harness.as_str()));

        let (selections, _) = fixture
            .solve(&requirements(&app).with_command(crate::model::COMMAND_TEST))
            .unwrap();
        assert!(selections.contains(harness.as_str()));
    }

    #[test]
    fn test_cancelled() {
        let fixture = Fixture::new();
        let app = fixture.feed("app.json", &implementation("sha1=app", "1", ""));
        fixture.handler.cancellation().cancel();
        assert!(matches!(fixture.solve(&requirements(&app)), Err(Error::Cancelled)));
    }
}

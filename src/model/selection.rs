// src/model/selection.rs

//! Solver output: one chosen implementation per interface

use crate::error::{Error, Result};
use crate::model::architecture::Architecture;
use crate::model::binding::Binding;
use crate::model::command::Command;
use crate::model::dependency::Dependency;
use crate::model::digest::ManifestDigest;
use crate::model::feed_uri::FeedUri;
use crate::model::stability::Stability;
use crate::model::version::ImplementationVersion;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

fn is_unset_arch(arch: &Architecture) -> bool {
    *arch == Architecture::default()
}

/// The implementation chosen for one interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationSelection {
    pub interface: FeedUri,

    /// Feed the implementation came from, when not the interface's own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_feed: Option<FeedUri>,

    pub id: String,

    #[serde(default, skip_serializing_if = "ManifestDigest::is_empty")]
    pub manifest_digest: ManifestDigest,

    #[serde(default, rename = "arch", skip_serializing_if = "is_unset_arch")]
    pub architecture: Architecture,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<ImplementationVersion>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released: Option<NaiveDate>,

    #[serde(default)]
    pub stability: Stability,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<Binding>,

    /// Commands selected from this implementation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<Command>,
}

impl ImplementationSelection {
    /// Interfaces this selection depends on, including through its commands
    pub fn dependency_interfaces(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .chain(self.commands.iter().flat_map(|c| c.dependencies.iter()))
            .map(|d| d.interface())
    }
}

/// A complete set of selections rooted at one interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selections {
    pub interface: FeedUri,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default)]
    pub implementations: Vec<ImplementationSelection>,
}

impl Selections {
    pub fn new(interface: FeedUri, command: Option<String>) -> Self {
        Self {
            interface,
            command,
            implementations: Vec::new(),
        }
    }

    pub fn contains(&self, interface: &str) -> bool {
        self.get(interface).is_some()
    }

    pub fn get(&self, interface: &str) -> Option<&ImplementationSelection> {
        self.implementations
            .iter()
            .find(|s| s.interface.as_str() == interface)
    }

    pub fn get_mut(&mut self, interface: &str) -> Option<&mut ImplementationSelection> {
        self.implementations
            .iter_mut()
            .find(|s| s.interface.as_str() == interface)
    }

    /// The selection for the root interface
    pub fn main_implementation(&self) -> Result<&ImplementationSelection> {
        self.get(self.interface.as_str()).ok_or_else(|| {
            Error::NotFoundError(format!("No selection for root interface {}", self.interface))
        })
    }

    /// Selections reachable from the root, depth-first in declaration
    /// order, each visited once
    pub fn walk(&self) -> Vec<(usize, &ImplementationSelection)> {
        let mut handled = HashSet::new();
        let mut visited = Vec::new();
        self.walk_from(self.interface.as_str(), 0, &mut handled, &mut visited);
        visited
    }

    fn walk_from<'a>(
        &'a self,
        interface: &str,
        depth: usize,
        handled: &mut HashSet<String>,
        visited: &mut Vec<(usize, &'a ImplementationSelection)>,
    ) {
        if !handled.insert(interface.to_string()) {
            return;
        }
        let Some(selection) = self.get(interface) else {
            return;
        };
        visited.push((depth, selection));
        for dependency in selection.dependency_interfaces() {
            self.walk_from(dependency, depth + 1, handled, visited);
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for Selections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, selection) in self.walk() {
            let version = selection
                .version
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "(no version)".to_string());
            writeln!(
                f,
                "{}- {}: {} ({})",
                "  ".repeat(depth),
                selection.interface,
                version,
                selection.id
            )?;
        }
        Ok(())
    }
}

// src/model/requirements.rs

//! A request to resolve an interface
//!
//! Requirements have two external forms: a command-line argument list
//! (`--command run --os Linux --version-for URI RANGE URI`) and a JSON
//! object. Both round-trip.

use crate::error::{Error, Result};
use crate::model::architecture::{Architecture, Cpu, Os};
use crate::model::command::{COMMAND_COMPILE, COMMAND_RUN};
use crate::model::feed_uri::FeedUri;
use crate::model::version_range::VersionRange;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "RequirementsRepr", try_from = "RequirementsRepr")]
pub struct Requirements {
    /// Interface to resolve
    pub interface_uri: FeedUri,

    /// Command to select; `None` picks the contextual default and an empty
    /// name selects no command at all
    pub command: Option<String>,

    /// Target architecture; wildcards mean "the current system"
    pub architecture: Architecture,

    /// Preferred languages; empty accepts any
    pub languages: Vec<String>,

    /// Acceptable versions of the interface itself
    pub versions: Option<VersionRange>,

    /// Acceptable versions of other interfaces, keyed by interface URI
    pub extra_restrictions: BTreeMap<String, VersionRange>,
}

impl Requirements {
    pub fn new(interface_uri: FeedUri) -> Self {
        Self {
            interface_uri,
            command: None,
            architecture: Architecture::default(),
            languages: Vec::new(),
            versions: None,
            extra_restrictions: BTreeMap::new(),
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = architecture;
        self
    }

    pub fn is_source(&self) -> bool {
        self.architecture.cpu == Cpu::Source
    }

    /// The command to use, falling back to `compile` for source and `run`
    /// otherwise
    pub fn effective_command(&self) -> Option<&str> {
        match self.command.as_deref() {
            Some("") => None,
            Some(command) => Some(command),
            None if self.is_source() => Some(COMMAND_COMPILE),
            None => Some(COMMAND_RUN),
        }
    }

    /// Replace wildcard OS/CPU values with those of `system`
    pub fn fill_in_architecture(&mut self, system: &Architecture) {
        if self.architecture.os == Os::All {
            self.architecture.os = system.os;
        }
        if self.architecture.cpu == Cpu::All {
            self.architecture.cpu = system.cpu;
        }
    }

    /// Version range applying to `interface`, combining both restriction
    /// sources
    pub fn versions_for(&self, interface: &str) -> Option<VersionRange> {
        let own = if interface == self.interface_uri.as_str() {
            self.versions.clone()
        } else {
            None
        };
        match (own, self.extra_restrictions.get(interface)) {
            (Some(own), Some(extra)) => own.intersect(extra),
            (Some(own), None) => Some(own),
            (None, Some(extra)) => Some(extra.clone()),
            (None, None) => None,
        }
    }

    /// Command-line tokens, each unescaped
    pub fn to_command_line_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(ref command) = self.command {
            args.push("--command".to_string());
            args.push(command.clone());
        }

        if self.is_source() {
            args.push("--source".to_string());
        } else {
            if self.architecture.os != Os::All {
                args.push("--os".to_string());
                args.push(self.architecture.os.to_string());
            }
            if self.architecture.cpu != Cpu::All {
                args.push("--cpu".to_string());
                args.push(self.architecture.cpu.to_string());
            }
        }

        if let Some(ref versions) = self.versions {
            args.push("--version".to_string());
            args.push(versions.to_string());
        }

        for (interface, range) in &self.extra_restrictions {
            args.push("--version-for".to_string());
            args.push(interface.clone());
            args.push(range.to_string());
        }

        args.push(self.interface_uri.to_string());
        args
    }

    /// Command line as a single shell-safe string
    pub fn to_command_line(&self) -> String {
        self.to_command_line_args()
            .iter()
            .map(|arg| shell_escape(arg))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parse tokens produced by [`Requirements::to_command_line_args`]
    pub fn from_command_line_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let mut command = None;
        let mut architecture = Architecture::default();
        let mut versions = None;
        let mut extra_restrictions = BTreeMap::new();
        let mut interface = None;

        let mut iter = args.iter().map(|arg| arg.as_ref());
        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next().map(str::to_string).ok_or_else(|| {
                    Error::ParseError(format!("Missing value for {}", flag))
                })
            };

            match arg {
                "--command" => command = Some(value(arg)?),
                "--os" => architecture.os = Os::parse(&value(arg)?),
                "--cpu" => architecture.cpu = Cpu::parse(&value(arg)?),
                "--source" => architecture.cpu = Cpu::Source,
                "--version" => versions = Some(VersionRange::parse(&value(arg)?)?),
                "--version-for" => {
                    let target = value(arg)?;
                    let range = VersionRange::parse(&value(arg)?)?;
                    extra_restrictions.insert(target, range);
                }
                flag if flag.starts_with("--") => {
                    return Err(Error::ParseError(format!("Unknown option '{}'", flag)));
                }
                positional => {
                    if interface.is_some() {
                        return Err(Error::ParseError(format!(
                            "Unexpected argument '{}'",
                            positional
                        )));
                    }
                    interface = Some(FeedUri::parse(positional)?);
                }
            }
        }

        let interface_uri = interface
            .ok_or_else(|| Error::ParseError("Missing interface URI".to_string()))?;
        Ok(Self {
            interface_uri,
            command,
            architecture,
            languages: Vec::new(),
            versions,
            extra_restrictions,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn shell_escape(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Serialize, Deserialize)]
struct RequirementsRepr {
    interface: FeedUri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    command: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    source: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    versions: Option<VersionRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    languages: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    extra_restrictions: BTreeMap<String, VersionRange>,
}

impl From<Requirements> for RequirementsRepr {
    fn from(requirements: Requirements) -> Self {
        let source = requirements.is_source();
        let Architecture { os, cpu } = requirements.architecture;
        Self {
            interface: requirements.interface_uri,
            command: requirements.command,
            source,
            os: (os != Os::All).then(|| os.to_string()),
            cpu: (cpu != Cpu::All && !source).then(|| cpu.to_string()),
            versions: requirements.versions,
            languages: requirements.languages,
            extra_restrictions: requirements.extra_restrictions,
        }
    }
}

impl TryFrom<RequirementsRepr> for Requirements {
    type Error = Error;

    fn try_from(repr: RequirementsRepr) -> Result<Self> {
        let mut architecture = Architecture::default();
        if let Some(ref os) = repr.os {
            architecture.os = Os::parse(os);
        }
        if repr.source {
            architecture.cpu = Cpu::Source;
        } else if let Some(ref cpu) = repr.cpu {
            architecture.cpu = Cpu::parse(cpu);
        }

        Ok(Self {
            interface_uri: repr.interface,
            command: repr.command,
            architecture,
            languages: repr.languages,
            versions: repr.versions,
            extra_restrictions: repr.extra_restrictions,
        })
    }
}

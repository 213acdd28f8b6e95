// src/model/feed.rs

//! Feed documents
//!
//! A feed describes the implementations available for one interface. Its
//! element tree nests groups of implementations; groups carry attributes
//! (architecture, version, stability, license, ...) that cascade down to
//! everything inside them.
//!
//! # Normalization
//!
//! [`Feed::normalize`] turns the tree into a flat list of leaf elements:
//!
//! 1. Each leaf inherits every cascading attribute it does not set itself
//!    from its nearest ancestor; list attributes (commands, dependencies,
//!    restrictions, bindings) accumulate.
//! 2. Legacy `main`/`self_test` shortcuts become `run`/`test` commands.
//! 3. Relative local paths and archive hrefs become absolute against the
//!    feed's own directory. Remote feeds may not use relative locations.
//!
//! # Wire format
//!
//! Feeds are JSON. A signed feed appends a trailer line
//! `-- Base64 Signature --` followed by base64-encoded OpenPGP signature
//! packets covering every byte before the trailer.

use crate::error::{Error, Result};
use crate::model::architecture::Architecture;
use crate::model::binding::Binding;
use crate::model::command::{COMMAND_RUN, COMMAND_TEST, Command};
use crate::model::dependency::{Dependency, Restriction};
use crate::model::digest::ManifestDigest;
use crate::model::feed_uri::FeedUri;
use crate::model::stability::Stability;
use crate::model::version::ImplementationVersion;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Line separating signed content from the signature block
pub const SIGNATURE_MARKER: &[u8] = b"-- Base64 Signature --\n";

/// Split signed feed data into `(content, signature block)`
///
/// The content keeps its trailing newline. Data without a trailer is
/// returned whole with no signature block.
pub fn split_signature(data: &[u8]) -> (&[u8], Option<&[u8]>) {
    let position = data
        .windows(SIGNATURE_MARKER.len())
        .rposition(|window| window == SIGNATURE_MARKER);

    match position {
        Some(pos) if pos > 0 && data[pos - 1] == b'\n' => {
            (&data[..pos], Some(&data[pos + SIGNATURE_MARKER.len()..]))
        }
        _ => (data, None),
    }
}

/// Attach an encoded signature block to feed content
pub fn append_signature(content: &[u8], encoded_signature: &str) -> Vec<u8> {
    let mut data = content.to_vec();
    if !data.ends_with(b"\n") {
        data.push(b'\n');
    }
    data.extend_from_slice(SIGNATURE_MARKER);
    data.extend_from_slice(encoded_signature.trim().as_bytes());
    data.push(b'\n');
    data
}

fn is_unset_arch(arch: &Architecture) -> bool {
    *arch == Architecture::default()
}

/// Attributes shared by groups and implementations
///
/// Scalars cascade from the nearest ancestor that sets them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<ImplementationVersion>,

    /// Suffix appended to the inherited version (e.g. `-pre`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_modifier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Stability::is_unset")]
    pub stability: Stability,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    /// Shortcut for a `run` command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    /// Shortcut for a `test` command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_test: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_dir: Option<String>,

    #[serde(default, rename = "arch", skip_serializing_if = "is_unset_arch")]
    pub architecture: Architecture,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub langs: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<Command>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restrictions: Vec<Restriction>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<Binding>,
}

impl ElementAttributes {
    /// Fill unset values from `parent` and accumulate its lists
    pub fn inherit_from(&mut self, parent: &ElementAttributes) {
        if self.version.is_none() {
            self.version = parent.version.clone();
        }
        if self.version_modifier.is_none() {
            self.version_modifier = parent.version_modifier.clone();
        }
        if self.released.is_none() {
            self.released = parent.released;
        }
        if self.main.is_none() {
            self.main = parent.main.clone();
        }
        if self.self_test.is_none() {
            self.self_test = parent.self_test.clone();
        }
        if self.doc_dir.is_none() {
            self.doc_dir = parent.doc_dir.clone();
        }
        if self.license.is_none() {
            self.license = parent.license.clone();
        }
        if self.stability.is_unset() {
            self.stability = parent.stability;
        }
        if self.langs.is_empty() {
            self.langs = parent.langs.clone();
        }
        if is_unset_arch(&self.architecture) {
            self.architecture = parent.architecture;
        }

        self.commands.extend(parent.commands.iter().cloned());
        self.dependencies.extend(parent.dependencies.iter().cloned());
        self.restrictions.extend(parent.restrictions.iter().cloned());
        self.bindings.extend(parent.bindings.iter().cloned());
    }

    /// Turn `main`/`self_test` into commands unless already present
    fn convert_legacy_commands(&mut self) {
        if let Some(ref main) = self.main {
            if self.get_command(COMMAND_RUN).is_none() {
                self.commands.push(Command::new(COMMAND_RUN, main.clone()));
            }
        }
        if let Some(ref self_test) = self.self_test {
            if self.get_command(COMMAND_TEST).is_none() {
                self.commands.push(Command::new(COMMAND_TEST, self_test.clone()));
            }
        }
    }

    pub fn get_command(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|command| command.name == name)
    }

    /// Fold `version_modifier` into `version`
    fn apply_version_modifier(&mut self) -> Result<()> {
        if let (Some(version), Some(modifier)) = (&self.version, &self.version_modifier) {
            self.version = Some(ImplementationVersion::parse(&format!("{}{}", version, modifier))?);
            self.version_modifier = None;
        }
        Ok(())
    }
}

/// An archive to download and extract
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Archive {
    pub href: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Sub-directory of the archive to extract
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<String>,
    #[serde(default)]
    pub start_offset: u64,
}

/// One step of a [`RetrievalMethod::Recipe`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeStep {
    Archive(Archive),
    Rename { source: String, dest: String },
    RemoveFile { path: String },
}

/// A way of obtaining an implementation's files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMethod {
    Archive(Archive),
    Recipe { steps: Vec<RecipeStep> },
}

impl RetrievalMethod {
    fn archives_mut(&mut self) -> Vec<&mut Archive> {
        match self {
            RetrievalMethod::Archive(archive) => vec![archive],
            RetrievalMethod::Recipe { steps } => steps
                .iter_mut()
                .filter_map(|step| match step {
                    RecipeStep::Archive(archive) => Some(archive),
                    _ => None,
                })
                .collect(),
        }
    }
}

/// A downloadable, runnable version of an interface
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Implementation {
    pub id: String,

    #[serde(flatten)]
    pub attributes: ElementAttributes,

    #[serde(default, skip_serializing_if = "ManifestDigest::is_empty")]
    pub manifest_digest: ManifestDigest,

    /// Directory holding an already-available implementation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub retrieval_methods: Vec<RetrievalMethod>,
}

impl Implementation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn version(&self) -> Option<&ImplementationVersion> {
        self.attributes.version.as_ref()
    }

    pub fn stability(&self) -> Stability {
        self.attributes.stability
    }

    pub fn architecture(&self) -> Architecture {
        self.attributes.architecture
    }

    pub fn commands(&self) -> &[Command] {
        &self.attributes.commands
    }

    pub fn get_command(&self, name: &str) -> Option<&Command> {
        self.attributes.get_command(name)
    }

    /// Whether the command is provided; an absent or empty name always is
    pub fn contains_command(&self, name: Option<&str>) -> bool {
        match name {
            None | Some("") => true,
            Some(name) => self.get_command(name).is_some(),
        }
    }

    fn normalize(&mut self, location: &FeedUri) -> Result<()> {
        self.attributes.convert_legacy_commands();
        self.attributes.apply_version_modifier()?;
        if self.attributes.stability.is_unset() {
            self.attributes.stability = Stability::Testing;
        }

        if self.local_path.is_none() && (self.id.starts_with('.') || self.id.starts_with('/')) {
            self.local_path = Some(self.id.clone());
        }
        if let Some(ref path) = self.local_path {
            self.local_path = Some(resolve_relative(path, location, &self.id)?);
        }

        self.manifest_digest.parse_id(&self.id);

        for method in &mut self.retrieval_methods {
            for archive in method.archives_mut() {
                archive.href = resolve_relative(&archive.href, location, &self.id)?;
            }
        }
        Ok(())
    }
}

/// Resolve a possibly relative location against a local feed
fn resolve_relative(target: &str, location: &FeedUri, id: &str) -> Result<String> {
    if target.contains("://") || Path::new(target).is_absolute() {
        return Ok(target.to_string());
    }

    let feed_dir = location
        .local_path()
        .and_then(|path| path.parent().map(|dir| dir.to_path_buf()))
        .ok_or_else(|| {
            Error::ParseError(format!(
                "Implementation '{}' uses relative location '{}' in remote feed {}",
                id, target, location
            ))
        })?;

    Ok(feed_dir.join(target).to_string_lossy().into_owned())
}

/// An implementation provided by a distribution's package manager
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PackageImplementation {
    pub package: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub distributions: Vec<String>,

    #[serde(flatten)]
    pub attributes: ElementAttributes,
}

/// A set of elements sharing cascading attributes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Group {
    #[serde(flatten)]
    pub attributes: ElementAttributes,

    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Implementation(Implementation),
    PackageImplementation(PackageImplementation),
    Group(Group),
}

fn flatten_into(
    elements: Vec<Element>,
    parent: Option<&ElementAttributes>,
    location: &FeedUri,
    out: &mut Vec<Element>,
) -> Result<()> {
    for element in elements {
        match element {
            Element::Group(mut group) => {
                if let Some(parent) = parent {
                    group.attributes.inherit_from(parent);
                }
                let children = std::mem::take(&mut group.elements);
                flatten_into(children, Some(&group.attributes), location, out)?;
            }
            Element::Implementation(mut implementation) => {
                if let Some(parent) = parent {
                    implementation.attributes.inherit_from(parent);
                }
                implementation.normalize(location)?;
                out.push(Element::Implementation(implementation));
            }
            Element::PackageImplementation(mut package) => {
                if let Some(parent) = parent {
                    package.attributes.inherit_from(parent);
                }
                package.attributes.convert_legacy_commands();
                out.push(Element::PackageImplementation(package));
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Icon {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Pointer to another feed providing implementations of the same interface
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeedReference {
    pub src: String,

    #[serde(default, skip_serializing_if = "is_unset_arch")]
    pub arch: Architecture,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub langs: Vec<String>,
}

impl FeedReference {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            ..Default::default()
        }
    }
}

/// A feed document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Feed {
    /// The feed's own URI; required for remote feeds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<FeedUri>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub icons: Vec<Icon>,

    /// Additional feeds for this interface
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feeds: Vec<FeedReference>,

    /// Interfaces this feed provides implementations for
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feed_for: Vec<String>,

    /// Interface superseding this one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<String>,

    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Feed {
    /// Parse feed data, ignoring any signature block
    pub fn load(data: &[u8]) -> Result<Self> {
        let (content, _) = split_signature(data);
        serde_json::from_slice(content)
            .map_err(|e| Error::ParseError(format!("Invalid feed document: {}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Flatten groups and resolve locations against `location`
    pub fn normalize(&mut self, location: &FeedUri) -> Result<()> {
        let elements = std::mem::take(&mut self.elements);
        let mut flattened = Vec::with_capacity(elements.len());
        flatten_into(elements, None, location, &mut flattened)?;
        self.elements = flattened;
        Ok(())
    }

    /// Implementations of a normalized feed
    pub fn implementations(&self) -> impl Iterator<Item = &Implementation> {
        self.elements.iter().filter_map(|element| match element {
            Element::Implementation(implementation) => Some(implementation),
            _ => None,
        })
    }

    pub fn package_implementations(&self) -> impl Iterator<Item = &PackageImplementation> {
        self.elements.iter().filter_map(|element| match element {
            Element::PackageImplementation(package) => Some(package),
            _ => None,
        })
    }

    /// Look up an implementation by ID
    pub fn get_implementation(&self, id: &str) -> Result<&Implementation> {
        self.implementations()
            .find(|implementation| implementation.id == id)
            .ok_or_else(|| {
                Error::NotFoundError(format!(
                    "Unable to find implementation '{}' in feed '{}'",
                    id, self.name
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::architecture::{Cpu, Os};

    fn local_location() -> FeedUri {
        FeedUri::parse("/srv/feeds/app.json").unwrap()
    }

    #[test]
    fn test_normalize_flattens_groups() {
        let mut first = Implementation::new("sha256new_FIRST");
        first.attributes.commands.push(Command::new(COMMAND_RUN, "main1"));
        let mut second = Implementation::new("sha256new_SECOND");
        second.attributes.commands.push(Command::new(COMMAND_RUN, "main2"));

        let group = Group {
            attributes: ElementAttributes {
                architecture: Architecture::new(Os::FreeBsd, Cpu::I586),
                stability: Stability::Developer,
                license: Some("GPL".to_string()),
                ..Default::default()
            },
            elements: vec![
                Element::Implementation(first),
                Element::Implementation(second),
            ],
        };

        let mut feed = Feed {
            name: "App".to_string(),
            elements: vec![Element::Group(group)],
            ..Default::default()
        };
        feed.normalize(&local_location()).unwrap();

        let implementations: Vec<&Implementation> = feed.implementations().collect();
        assert_eq!(implementations.len(), 2);
        for implementation in &implementations {
            assert_eq!(implementation.architecture(), Architecture::new(Os::FreeBsd, Cpu::I586));
            assert_eq!(implementation.stability(), Stability::Developer);
            assert_eq!(implementation.attributes.license.as_deref(), Some("GPL"));
        }
        assert_eq!(
            implementations[0].get_command(COMMAND_RUN).unwrap().path.as_deref(),
            Some("main1")
        );
        assert_eq!(
            implementations[1].get_command(COMMAND_RUN).unwrap().path.as_deref(),
            Some("main2")
        );
    }

    #[test]
    fn test_nested_groups_take_nearest_value() {
        let inner = Group {
            attributes: ElementAttributes {
                version: Some(ImplementationVersion::parse("2.0").unwrap()),
                ..Default::default()
            },
            elements: vec![Element::Implementation(Implementation::new("sha1=abc"))],
        };
        let outer = Group {
            attributes: ElementAttributes {
                version: Some(ImplementationVersion::parse("1.0").unwrap()),
                main: Some("bin/app".to_string()),
                ..Default::default()
            },
            elements: vec![Element::Group(inner)],
        };

        let mut feed = Feed {
            name: "App".to_string(),
            elements: vec![Element::Group(outer)],
            ..Default::default()
        };
        feed.normalize(&local_location()).unwrap();

        let implementation = feed.get_implementation("sha1=abc").unwrap();
        assert_eq!(implementation.version().unwrap().to_string(), "2.0");
        assert_eq!(implementation.stability(), Stability::Testing);
        assert_eq!(implementation.manifest_digest.sha1.as_deref(), Some("abc"));
        assert_eq!(
            implementation.get_command(COMMAND_RUN).unwrap().path.as_deref(),
            Some("bin/app")
        );
    }

    #[test]
    fn test_version_modifier() {
        let mut implementation = Implementation::new("sha1=abc");
        implementation.attributes.version = Some(ImplementationVersion::parse("1.0").unwrap());
        implementation.attributes.version_modifier = Some("-pre".to_string());

        let mut feed = Feed {
            name: "App".to_string(),
            elements: vec![Element::Implementation(implementation)],
            ..Default::default()
        };
        feed.normalize(&local_location()).unwrap();
        let implementation = feed.get_implementation("sha1=abc").unwrap();
        assert_eq!(implementation.version().unwrap().to_string(), "1.0-pre");
    }

    #[test]
    fn test_relative_paths() {
        let mut implementation = Implementation::new("./build");
        implementation
            .retrieval_methods
            .push(RetrievalMethod::Archive(Archive {
                href: "archive.tar.gz".to_string(),
                ..Default::default()
            }));

        let mut local = Feed {
            name: "App".to_string(),
            elements: vec![Element::Implementation(implementation.clone())],
            ..Default::default()
        };
        local.normalize(&local_location()).unwrap();
        let normalized = local.get_implementation("./build").unwrap();
        assert_eq!(normalized.local_path.as_deref(), Some("/srv/feeds/./build"));
        match &normalized.retrieval_methods[0] {
            RetrievalMethod::Archive(archive) => {
                assert_eq!(archive.href, "/srv/feeds/archive.tar.gz")
            }
            other => panic!("unexpected retrieval method {:?}", other),
        }

        let mut remote = Feed {
            name: "App".to_string(),
            elements: vec![Element::Implementation(implementation)],
            ..Default::default()
        };
        let remote_location = FeedUri::parse("http://example.com/app.json").unwrap();
        assert!(remote.normalize(&remote_location).is_err());
    }

    #[test]
    fn test_get_missing_implementation() {
        let feed = Feed {
            name: "Empty".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            feed.get_implementation("sha1=missing"),
            Err(Error::NotFoundError(_))
        ));
    }

    #[test]
    fn test_load_json_with_signature_block() {
        let json = br#"{
            "uri": "http://example.com/app.json",
            "name": "App",
            "elements": [
                {"group": {"arch": "Linux-x86_64", "elements": [
                    {"implementation": {"id": "sha256new_ABC", "version": "1.2", "main": "app"}}
                ]}},
                {"package_implementation": {"package": "app", "distributions": ["Debian"]}}
            ]
        }"#;
        let data = append_signature(json, "c2lnbmF0dXJl");
        let (content, signature) = split_signature(&data);
        assert_eq!(signature, Some(&b"c2lnbmF0dXJl\n"[..]));
        assert!(content.ends_with(b"}\n"));

        let mut feed = Feed::load(&data).unwrap();
        feed.normalize(feed.uri.clone().as_ref().unwrap()).unwrap();
        assert_eq!(feed.implementations().count(), 1);
        assert_eq!(feed.package_implementations().count(), 1);
        let implementation = feed.get_implementation("sha256new_ABC").unwrap();
        assert_eq!(implementation.architecture().to_string(), "Linux-x86_64");
    }

    #[test]
    fn test_split_without_signature() {
        let data = b"{\"name\": \"x\"}";
        let (content, signature) = split_signature(data);
        assert_eq!(content, data);
        assert!(signature.is_none());
    }
}

// src/model/dependency.rs

//! Dependencies and restrictions on other interfaces

use crate::model::architecture::Os;
use crate::model::binding::Binding;
use crate::model::version_range::{Constraint, VersionRange};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Limits which versions of another interface may be selected
///
/// A restriction never causes the interface to be selected by itself;
/// it only narrows the choice when something else requires it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Restriction {
    /// URI of the restricted interface
    pub interface: String,

    /// Acceptable version range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<VersionRange>,

    /// Additional bounds, all of which must hold
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,

    /// Only applies when running on this OS
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_os",
        deserialize_with = "deserialize_os"
    )]
    pub os: Option<Os>,

    /// Native package distributions this restriction accepts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub distributions: Vec<String>,
}

impl Restriction {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            ..Default::default()
        }
    }

    /// The version range combining `versions` with every constraint
    ///
    /// Returns `None` when the constraints leave no acceptable version.
    pub fn effective_versions(&self) -> Option<VersionRange> {
        let mut range = self.versions.clone().unwrap_or_default();
        for constraint in &self.constraints {
            range = range.intersect_constraint(constraint)?;
        }
        Some(range)
    }

    /// Whether this restriction is relevant on the given OS
    pub fn applies_to(&self, os: &Os) -> bool {
        match self.os {
            Some(ref required) => required.is_compatible(os),
            None => true,
        }
    }
}

/// How badly a dependency is needed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    /// Selection fails without it
    #[default]
    Essential,
    /// Selected when possible, skipped otherwise
    Recommended,
}

/// A required interface
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(flatten)]
    pub restriction: Restriction,

    #[serde(default)]
    pub importance: Importance,

    /// Context this dependency is used in, e.g. `testing`
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_context: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<Binding>,
}

impl Dependency {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            restriction: Restriction::new(interface),
            ..Default::default()
        }
    }

    pub fn interface(&self) -> &str {
        &self.restriction.interface
    }

    pub fn effective_versions(&self) -> Option<VersionRange> {
        self.restriction.effective_versions()
    }

    /// Whether this dependency must be resolved when running `command`
    ///
    /// Dependencies without a use context always count; `testing` ones
    /// only count for the `test` command.
    pub fn is_needed_for(&self, command: Option<&str>) -> bool {
        match self.use_context.as_deref() {
            None | Some("") => true,
            Some("testing") => command == Some(crate::model::command::COMMAND_TEST),
            Some(_) => false,
        }
    }

    /// Commands the dependency's executable bindings need, in order
    pub fn binding_commands(&self) -> Vec<&str> {
        let mut commands = Vec::new();
        for command in self.bindings.iter().filter_map(Binding::command) {
            if !commands.contains(&command) {
                commands.push(command);
            }
        }
        commands
    }
}

fn serialize_os<S: Serializer>(
    os: &Option<Os>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match os {
        Some(os) => serializer.serialize_str(os.as_str()),
        None => serializer.serialize_none(),
    }
}

fn deserialize_os<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<Os>, D::Error> {
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.map(|s| Os::parse(&s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::version::ImplementationVersion;

    fn v(s: &str) -> ImplementationVersion {
        ImplementationVersion::parse(s).unwrap()
    }

    #[test]
    fn test_effective_versions() {
        let mut dependency = Dependency::new("http://example.com/lib.json");
        dependency.restriction.versions = Some(VersionRange::parse("..!3").unwrap());
        dependency
            .restriction
            .constraints
            .push(Constraint::new(Some(v("1")), Some(v("2"))));

        let range = dependency.effective_versions().unwrap();
        assert_eq!(range.to_string(), "1..!2");
    }

    #[test]
    fn test_effective_versions_empty() {
        let mut restriction = Restriction::new("http://example.com/lib.json");
        restriction.versions = Some(VersionRange::parse("2..!3").unwrap());
        restriction
            .constraints
            .push(Constraint::new(Some(v("1")), Some(v("2"))));
        assert!(restriction.effective_versions().is_none());

        let unrestricted = Restriction::new("http://example.com/lib.json");
        assert!(unrestricted.effective_versions().unwrap().is_unrestricted());
    }

    #[test]
    fn test_use_context() {
        let mut dependency = Dependency::new("http://example.com/testlib.json");
        assert!(dependency.is_needed_for(Some("run")));

        dependency.use_context = Some("testing".to_string());
        assert!(!dependency.is_needed_for(Some("run")));
        assert!(dependency.is_needed_for(Some("test")));

        dependency.use_context = Some("docs".to_string());
        assert!(!dependency.is_needed_for(Some("test")));
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{
            "interface": "http://example.com/lib.json",
            "versions": "1.0..!2.0",
            "os": "Windows",
            "importance": "recommended",
            "use": "testing"
        }"#;
        let dependency: Dependency = serde_json::from_str(json).unwrap();
        assert_eq!(dependency.interface(), "http://example.com/lib.json");
        assert_eq!(dependency.importance, Importance::Recommended);
        assert_eq!(dependency.restriction.os, Some(Os::Windows));
        assert!(dependency.restriction.applies_to(&Os::Cygwin));
        assert!(!dependency.restriction.applies_to(&Os::Linux));
    }
}

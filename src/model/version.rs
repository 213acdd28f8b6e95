// src/model/version.rs

//! Implementation version numbers
//!
//! Versions are a dotted list of non-negative integers optionally followed
//! by hyphen-separated parts. Each part carries a modifier (`pre`, `rc`,
//! none, `post`) and an optional dotted list of its own:
//!
//! ```text
//! 1.2.3        plain release
//! 1.2-pre3     pre-release
//! 1.2-rc1      release candidate
//! 1.2-post1    post-release
//! 1.2-post1-pre  pre-release of a post-release
//! ```
//!
//! Ordering is total: `1.2-pre < 1.2-rc1 < 1.2 < 1.2-0 < 1.2-post`.
//! Versions containing `{name}` template variables are kept verbatim.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Dot-separated list of non-negative integers (`1.2.10`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DottedList(Vec<u64>);

impl DottedList {
    /// Parse a dotted list; the empty string yields an empty list
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(Self::default());
        }

        let decimals = s
            .split('.')
            .map(|d| {
                d.parse::<u64>().map_err(|_| {
                    Error::ParseError(format!("Invalid dotted list '{}' in version", s))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self(decimals))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn decimals(&self) -> &[u64] {
        &self.0
    }
}

impl fmt::Display for DottedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.0.iter().map(|d| d.to_string()).collect();
        write!(f, "{}", joined.join("."))
    }
}

/// Modifier at the start of an additional version part
///
/// Declaration order is rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum VersionModifier {
    Pre,
    Rc,
    #[default]
    None,
    Post,
}

impl VersionModifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::Rc => "rc",
            Self::None => "",
            Self::Post => "post",
        }
    }
}

/// One hyphen-separated part after the leading dotted list
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct VersionPart {
    pub modifier: VersionModifier,
    pub dotted: DottedList,
}

impl VersionPart {
    pub fn parse(s: &str) -> Result<Self> {
        let (modifier, rest) = if let Some(rest) = s.strip_prefix("pre") {
            (VersionModifier::Pre, rest)
        } else if let Some(rest) = s.strip_prefix("rc") {
            (VersionModifier::Rc, rest)
        } else if let Some(rest) = s.strip_prefix("post") {
            (VersionModifier::Post, rest)
        } else {
            (VersionModifier::None, s)
        };

        Ok(Self {
            modifier,
            dotted: DottedList::parse(rest)?,
        })
    }
}

impl fmt::Display for VersionPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.modifier.as_str(), self.dotted)
    }
}

/// A version of an implementation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImplementationVersion {
    first: DottedList,
    additional: Vec<VersionPart>,
    /// Verbatim text when the version still contains template variables
    template: Option<String>,
}

impl ImplementationVersion {
    /// Parse a version string
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::ParseError(
                "Version must start with a dotted list".to_string(),
            ));
        }

        if contains_template_variables(s) {
            return Ok(Self {
                first: DottedList::default(),
                additional: Vec::new(),
                template: Some(s.to_string()),
            });
        }

        let mut parts = s.split('-');
        let first_str = parts.next().unwrap_or_default();
        if first_str.is_empty() {
            return Err(Error::ParseError(format!(
                "Version '{}' must start with a dotted list",
                s
            )));
        }
        let first = DottedList::parse(first_str)?;
        let additional = parts.map(VersionPart::parse).collect::<Result<Vec<_>>>()?;

        Ok(Self {
            first,
            additional,
            template: None,
        })
    }

    /// True when the version still holds unresolved `{name}` placeholders
    pub fn contains_template_variables(&self) -> bool {
        self.template.is_some()
    }

    /// Leading dotted list (`1.2` in `1.2-rc3`)
    pub fn first_part(&self) -> &DottedList {
        &self.first
    }

    pub fn additional_parts(&self) -> &[VersionPart] {
        &self.additional
    }

    /// Compare two versions
    pub fn compare(&self, other: &Self) -> Ordering {
        match self.first.cmp(&other.first) {
            Ordering::Equal => {}
            ord => return ord,
        }

        let padding = VersionPart::default();
        let len = self.additional.len().max(other.additional.len());
        for i in 0..len {
            let left = self.additional.get(i).unwrap_or(&padding);
            let right = other.additional.get(i).unwrap_or(&padding);
            match left.cmp(right) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }

        // Keep Ord consistent with Eq: "1.2" and "1.2-" differ only in part count
        self.additional
            .len()
            .cmp(&other.additional.len())
            .then_with(|| self.template.cmp(&other.template))
    }
}

fn contains_template_variables(s: &str) -> bool {
    match s.find('{') {
        Some(open) => s[open..].contains('}'),
        None => false,
    }
}

impl fmt::Display for ImplementationVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref verbatim) = self.template {
            return write!(f, "{}", verbatim);
        }

        write!(f, "{}", self.first)?;
        for part in &self.additional {
            write!(f, "-{}", part)?;
        }
        Ok(())
    }
}

impl FromStr for ImplementationVersion {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ImplementationVersion::parse(s)
    }
}

impl Ord for ImplementationVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialOrd for ImplementationVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for ImplementationVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ImplementationVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ImplementationVersion::parse(&s).map_err(serde::de::Error::custom)
    }
}

// src/model/version_range.rs

//! Version ranges and bounding constraints
//!
//! A range is a `|`-separated union of parts:
//!
//! - `V` matches exactly `V`
//! - `A..` matches `A` and everything above
//! - `..!B` matches everything below `B` (exclusive)
//! - `A..!B` matches the half-open interval `[A, B)`
//! - `!V` matches everything except `V`
//!
//! An empty range places no restriction. Intersections that leave nothing
//! are reported as `None` rather than as an empty range, which would mean
//! the opposite.

use crate::error::{Error, Result};
use crate::model::version::ImplementationVersion;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Inclusive lower and exclusive upper bound on a version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Constraint {
    /// Lowest acceptable version (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<ImplementationVersion>,
    /// First unacceptable version (exclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<ImplementationVersion>,
}

impl Constraint {
    pub fn new(
        not_before: Option<ImplementationVersion>,
        before: Option<ImplementationVersion>,
    ) -> Self {
        Self { not_before, before }
    }

    /// The single range part equivalent to this constraint
    pub fn to_part(&self) -> VersionRangePart {
        VersionRangePart::Range {
            not_before: self.not_before.clone(),
            before: self.before.clone(),
        }
    }
}

/// One alternative in a [`VersionRange`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionRangePart {
    Exact(ImplementationVersion),
    Exclude(ImplementationVersion),
    Range {
        not_before: Option<ImplementationVersion>,
        before: Option<ImplementationVersion>,
    },
}

impl VersionRangePart {
    /// Parse a single part such as `1.0..!2.0`, `!1.5` or `3`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some((start, end)) = s.split_once("..") {
            let start = start.trim();
            let end = end.trim();

            let not_before = if start.is_empty() {
                None
            } else {
                Some(ImplementationVersion::parse(start)?)
            };

            let before = if end.is_empty() {
                None
            } else {
                match end.strip_prefix('!') {
                    Some(version) => Some(ImplementationVersion::parse(version.trim())?),
                    None => {
                        return Err(Error::ParseError(format!(
                            "Upper bound in version range '{}' must be exclusive (!)",
                            s
                        )));
                    }
                }
            };

            return Ok(Self::Range { not_before, before });
        }

        if let Some(version) = s.strip_prefix('!') {
            return Ok(Self::Exclude(ImplementationVersion::parse(version.trim())?));
        }

        Ok(Self::Exact(ImplementationVersion::parse(s)?))
    }

    /// Whether a version falls inside this part
    pub fn matches(&self, version: &ImplementationVersion) -> bool {
        match self {
            Self::Exact(v) => v == version,
            Self::Exclude(v) => v != version,
            Self::Range { not_before, before } => in_bounds(version, not_before, before),
        }
    }

    /// Intersect two parts; `None` when nothing representable remains
    ///
    /// An exclusion that falls strictly inside a range cannot be expressed in
    /// the range grammar, so that combination yields `None`.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        use VersionRangePart::*;

        match (self, other) {
            (Exact(v), other) | (other, Exact(v)) => other.matches(v).then(|| Exact(v.clone())),
            (Exclude(a), Exclude(b)) => (a == b).then(|| Exclude(a.clone())),
            (Exclude(v), Range { not_before, before })
            | (Range { not_before, before }, Exclude(v)) => {
                if in_bounds(v, not_before, before) {
                    None
                } else {
                    Some(Range {
                        not_before: not_before.clone(),
                        before: before.clone(),
                    })
                }
            }
            (
                Range {
                    not_before: start_a,
                    before: end_a,
                },
                Range {
                    not_before: start_b,
                    before: end_b,
                },
            ) => {
                let not_before = match (start_a, start_b) {
                    (Some(a), Some(b)) => Some(a.max(b).clone()),
                    (a, b) => a.clone().or_else(|| b.clone()),
                };
                let before = match (end_a, end_b) {
                    (Some(a), Some(b)) => Some(a.min(b).clone()),
                    (a, b) => a.clone().or_else(|| b.clone()),
                };

                if let (Some(start), Some(end)) = (&not_before, &before) {
                    if start >= end {
                        return None;
                    }
                }
                Some(Range { not_before, before })
            }
        }
    }
}

fn in_bounds(
    version: &ImplementationVersion,
    not_before: &Option<ImplementationVersion>,
    before: &Option<ImplementationVersion>,
) -> bool {
    if let Some(start) = not_before {
        if version < start {
            return false;
        }
    }
    if let Some(end) = before {
        if version >= end {
            return false;
        }
    }
    true
}

impl fmt::Display for VersionRangePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(v) => write!(f, "{}", v),
            Self::Exclude(v) => write!(f, "!{}", v),
            Self::Range { not_before, before } => {
                if let Some(start) = not_before {
                    write!(f, "{}", start)?;
                }
                write!(f, "..")?;
                if let Some(end) = before {
                    write!(f, "!{}", end)?;
                }
                Ok(())
            }
        }
    }
}

/// A union of version range parts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VersionRange {
    parts: Vec<VersionRangePart>,
}

impl VersionRange {
    /// Parse a `|`-separated range; whitespace around parts is ignored
    pub fn parse(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }

        let parts = s
            .split('|')
            .map(VersionRangePart::parse)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_parts(parts))
    }

    /// Build a range from parts, dropping duplicates
    pub fn from_parts(parts: Vec<VersionRangePart>) -> Self {
        let mut unique: Vec<VersionRangePart> = Vec::with_capacity(parts.len());
        for part in parts {
            if !unique.contains(&part) {
                unique.push(part);
            }
        }
        Self { parts: unique }
    }

    /// The range equivalent to a single constraint
    pub fn from_constraint(constraint: &Constraint) -> Self {
        Self {
            parts: vec![constraint.to_part()],
        }
    }

    pub fn parts(&self) -> &[VersionRangePart] {
        &self.parts
    }

    /// True when the range places no restriction at all
    pub fn is_unrestricted(&self) -> bool {
        self.parts.is_empty()
    }

    /// Whether any part accepts the version (always true for an empty range)
    pub fn matches(&self, version: &ImplementationVersion) -> bool {
        self.parts.is_empty() || self.parts.iter().any(|part| part.matches(version))
    }

    /// Narrow this range by a constraint
    ///
    /// Returns `None` when no part survives.
    pub fn intersect_constraint(&self, constraint: &Constraint) -> Option<VersionRange> {
        self.intersect(&VersionRange::from_constraint(constraint))
    }

    /// Intersect two ranges part by part
    ///
    /// Returns `None` when the result would admit no version.
    pub fn intersect(&self, other: &VersionRange) -> Option<VersionRange> {
        if self.parts.is_empty() {
            return Some(other.clone());
        }
        if other.parts.is_empty() {
            return Some(self.clone());
        }

        let parts: Vec<VersionRangePart> = self
            .parts
            .iter()
            .flat_map(|a| other.parts.iter().filter_map(move |b| a.intersect(b)))
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(Self::from_parts(parts))
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.parts.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", parts.join("|"))
    }
}

impl FromStr for VersionRange {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        VersionRange::parse(s)
    }
}

impl From<ImplementationVersion> for VersionRange {
    fn from(version: ImplementationVersion) -> Self {
        Self {
            parts: vec![VersionRangePart::Exact(version)],
        }
    }
}

impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        VersionRange::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> ImplementationVersion {
        ImplementationVersion::parse(s).unwrap()
    }

    fn constraint(not_before: &str, before: &str) -> Constraint {
        Constraint::new(Some(v(not_before)), Some(v(before)))
    }

    #[test]
    fn test_round_trip() {
        let range = VersionRange::parse("2.6..!3|3.2.2..").unwrap();
        assert_eq!(range.to_string(), "2.6..!3|3.2.2..");

        let spaced = VersionRange::parse("2.6..!3 | 3.2.2..").unwrap();
        assert_eq!(spaced.to_string(), "2.6..!3|3.2.2..");
        assert_eq!(range, spaced);
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(VersionRange::parse("..!3").unwrap().to_string(), "..!3");
        assert_eq!(VersionRange::parse("!1.5").unwrap().to_string(), "!1.5");
        assert_eq!(VersionRange::parse("1.0").unwrap().to_string(), "1.0");
        assert_eq!(VersionRange::parse("..").unwrap().to_string(), "..");
        assert!(VersionRange::parse("").unwrap().is_unrestricted());
    }

    #[test]
    fn test_parse_rejects_inclusive_upper_bound() {
        assert!(VersionRange::parse("1.0..2.0").is_err());
        assert!(VersionRange::parse("1.0..!x").is_err());
    }

    #[test]
    fn test_matches() {
        let range = VersionRange::parse("1.0..!2.0|!3|5").unwrap();
        assert!(range.matches(&v("1.5")));
        assert!(range.matches(&v("5")));
        // "!3" admits everything but 3
        assert!(range.matches(&v("4")));

        let narrow = VersionRange::parse("1.0..!2.0").unwrap();
        assert!(narrow.matches(&v("1.0")));
        assert!(!narrow.matches(&v("2.0")));
        assert!(!narrow.matches(&v("0.9")));
        assert!(VersionRange::default().matches(&v("42")));
    }

    #[test]
    fn test_intersect_constraint() {
        let range = VersionRange::parse("..!3").unwrap();
        let result = range.intersect_constraint(&constraint("1", "2")).unwrap();
        assert_eq!(result.to_string(), "1..!2");

        let disjoint = VersionRange::parse("2..!3").unwrap();
        assert!(disjoint.intersect_constraint(&constraint("1", "2")).is_none());
    }

    #[test]
    fn test_intersect_exact_and_exclude() {
        let c = constraint("1", "2");

        let inside = VersionRange::parse("1.5").unwrap();
        assert_eq!(inside.intersect_constraint(&c).unwrap().to_string(), "1.5");

        let outside = VersionRange::parse("2.5").unwrap();
        assert!(outside.intersect_constraint(&c).is_none());

        let excluded_elsewhere = VersionRange::parse("!3").unwrap();
        assert_eq!(
            excluded_elsewhere.intersect_constraint(&c).unwrap().to_string(),
            "1..!2"
        );

        // [1, 2) minus 1.5 has no representation
        let excluded_inside = VersionRange::parse("!1.5").unwrap();
        assert!(excluded_inside.intersect_constraint(&c).is_none());
    }

    #[test]
    fn test_intersect_unrestricted() {
        let empty = VersionRange::default();
        let result = empty.intersect_constraint(&constraint("1", "2")).unwrap();
        assert_eq!(result.to_string(), "1..!2");

        let open = Constraint::new(Some(v("1")), None);
        assert_eq!(empty.intersect_constraint(&open).unwrap().to_string(), "1..");
    }

    #[test]
    fn test_intersect_ranges() {
        let a = VersionRange::parse("1..!3|5..").unwrap();
        let b = VersionRange::parse("2..!6").unwrap();
        assert_eq!(a.intersect(&b).unwrap().to_string(), "2..!3|5..!6");
    }
}

// src/model/stability.rs

//! Stability ratings for implementations

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How much trust a feed author or user places in an implementation
///
/// Variants are declared from least to most trusted, so `Ord` ranks
/// `Insecure < Buggy < Developer < Testing < Stable < Packaged < Preferred`.
/// `Unset` sorts below everything and means "defer to the feed or policy".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    #[default]
    Unset,
    Insecure,
    Buggy,
    Developer,
    Testing,
    Stable,
    Packaged,
    Preferred,
}

impl Stability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Insecure => "insecure",
            Self::Buggy => "buggy",
            Self::Developer => "developer",
            Self::Testing => "testing",
            Self::Packaged => "packaged",
            Self::Stable => "stable",
            Self::Preferred => "preferred",
        }
    }

    pub fn is_unset(&self) -> bool {
        *self == Self::Unset
    }

    /// `self` unless unset, otherwise `fallback`
    pub fn or(self, fallback: Stability) -> Stability {
        if self.is_unset() { fallback } else { self }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Stability {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "unset" => Self::Unset,
            "insecure" => Self::Insecure,
            "buggy" => Self::Buggy,
            "developer" => Self::Developer,
            "testing" => Self::Testing,
            "packaged" => Self::Packaged,
            "stable" => Self::Stable,
            "preferred" => Self::Preferred,
            _ => return Err(Error::ParseError(format!("Unknown stability '{}'", s))),
        })
    }
}

// src/solver/candidate.rs

//! Implementations under consideration for one interface
//!
//! Each candidate is judged once, when it is built, against the target
//! architecture, languages, command and version range. The verdict and its
//! reason are kept for diagnostics when nothing suitable is found.

use crate::config::NetworkLevel;
use crate::model::{
    Architecture, Cpu, FeedUri, Implementation, ImplementationVersion, PackageImplementation,
    Stability, VersionRange,
};
use std::cmp::Ordering;
use std::fmt;

/// Why a candidate can or cannot be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateNote {
    Suitable,
    /// Source code where a binary is wanted
    SourceCode,
    IncompatibleArchitecture,
    WrongLanguage,
    VersionMismatch,
    Buggy,
    Insecure,
    MissingCommand(String),
    /// Offline and not in the implementation store
    NotCached,
    /// Provided by the distribution's package manager
    NativePackage,
}

impl fmt::Display for CandidateNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suitable => write!(f, "suitable"),
            Self::SourceCode => write!(f, "source code, not a binary"),
            Self::IncompatibleArchitecture => write!(f, "incompatible architecture"),
            Self::WrongLanguage => write!(f, "wrong language"),
            Self::VersionMismatch => write!(f, "version mismatch"),
            Self::Buggy => write!(f, "marked as buggy"),
            Self::Insecure => write!(f, "marked as insecure"),
            Self::MissingCommand(command) => write!(f, "has no '{}' command", command),
            Self::NotCached => write!(f, "not cached"),
            Self::NativePackage => write!(f, "native packages are not supported"),
        }
    }
}

/// What a candidate is judged against
#[derive(Debug, Clone)]
pub struct CandidateFilter<'a> {
    pub architecture: Architecture,
    pub languages: &'a [String],
    pub command: Option<&'a str>,
    pub versions: Option<&'a VersionRange>,
    pub network_use: NetworkLevel,
}

/// One implementation together with its verdict
#[derive(Debug, Clone)]
pub struct SelectionCandidate {
    pub feed: FeedUri,
    pub implementation: Implementation,
    pub user_stability: Stability,
    pub cached: bool,
    pub note: CandidateNote,
}

impl SelectionCandidate {
    pub fn new(
        feed: FeedUri,
        implementation: Implementation,
        user_stability: Stability,
        cached: bool,
        filter: &CandidateFilter<'_>,
    ) -> Self {
        let mut candidate = Self {
            feed,
            implementation,
            user_stability,
            cached,
            note: CandidateNote::Suitable,
        };
        candidate.note = candidate.check(filter);
        candidate
    }

    /// A native package; listed for diagnostics but never suitable
    pub fn native(feed: FeedUri, package: &PackageImplementation) -> Self {
        let mut implementation = Implementation::new(format!("package:{}", package.package));
        implementation.attributes = package.attributes.clone();
        Self {
            feed,
            implementation,
            user_stability: Stability::Unset,
            cached: false,
            note: CandidateNote::NativePackage,
        }
    }

    fn check(&self, filter: &CandidateFilter<'_>) -> CandidateNote {
        let architecture = self.implementation.architecture();
        let stability = self.effective_stability();

        if architecture.cpu == Cpu::Source && filter.architecture.cpu != Cpu::Source {
            CandidateNote::SourceCode
        } else if !architecture.is_compatible(&filter.architecture) {
            CandidateNote::IncompatibleArchitecture
        } else if !self.matches_languages(filter.languages) {
            CandidateNote::WrongLanguage
        } else if !self.matches_versions(filter.versions) {
            CandidateNote::VersionMismatch
        } else if stability == Stability::Buggy {
            CandidateNote::Buggy
        } else if stability == Stability::Insecure {
            CandidateNote::Insecure
        } else if !self.implementation.contains_command(filter.command) {
            CandidateNote::MissingCommand(filter.command.unwrap_or_default().to_string())
        } else if filter.network_use == NetworkLevel::Offline && !self.cached {
            CandidateNote::NotCached
        } else {
            CandidateNote::Suitable
        }
    }

    /// Implementations without declared languages suit everyone
    fn matches_languages(&self, wanted: &[String]) -> bool {
        let langs = &self.implementation.attributes.langs;
        wanted.is_empty()
            || langs.is_empty()
            || langs.iter().any(|lang| wanted.iter().any(|w| language_matches(lang, w)))
    }

    fn matches_versions(&self, versions: Option<&VersionRange>) -> bool {
        match (versions, self.implementation.version()) {
            (None, _) => true,
            (Some(range), _) if range.is_unrestricted() => true,
            (Some(range), Some(version)) => range.matches(version),
            (Some(_), None) => false,
        }
    }

    pub fn is_suitable(&self) -> bool {
        self.note == CandidateNote::Suitable
    }

    pub fn id(&self) -> &str {
        &self.implementation.id
    }

    pub fn version(&self) -> Option<&ImplementationVersion> {
        self.implementation.version()
    }

    /// The user's override when set, otherwise the feed's rating
    pub fn effective_stability(&self) -> Stability {
        self.user_stability.or(self.implementation.stability())
    }
}

impl fmt::Display for SelectionCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = self
            .version()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "?".to_string());
        write!(f, "{} ({}, {}): {}", self.id(), version, self.effective_stability(), self.note)
    }
}

/// `en` matches `en_GB` and the other way round
fn language_matches(offered: &str, wanted: &str) -> bool {
    let base = |lang: &str| lang.split(['_', '-']).next().unwrap_or_default().to_ascii_lowercase();
    offered.eq_ignore_ascii_case(wanted) || base(offered) == base(wanted)
}

/// Orders candidates from most to least preferable
#[derive(Debug, Clone, Copy)]
pub struct CandidateRanking {
    pub policy: Stability,
    pub network_use: NetworkLevel,
}

impl CandidateRanking {
    pub fn compare(&self, a: &SelectionCandidate, b: &SelectionCandidate) -> Ordering {
        let preferred = |c: &SelectionCandidate| c.effective_stability() == Stability::Preferred;
        let meets_policy = |c: &SelectionCandidate| c.effective_stability() >= self.policy;
        let full = self.network_use == NetworkLevel::Full;

        preferred(b)
            .cmp(&preferred(a))
            .then_with(|| if full { Ordering::Equal } else { b.cached.cmp(&a.cached) })
            .then_with(|| meets_policy(b).cmp(&meets_policy(a)))
            .then_with(|| b.version().cmp(&a.version()))
            .then_with(|| if full { b.cached.cmp(&a.cached) } else { Ordering::Equal })
            .then_with(|| a.id().cmp(b.id()))
    }

    pub fn sort(&self, candidates: &mut [SelectionCandidate]) {
        candidates.sort_by(|a, b| self.compare(a, b));
    }
}

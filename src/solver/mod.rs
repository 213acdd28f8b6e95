// src/solver/mod.rs

//! Choosing implementations for a set of requirements
//!
//! A solver turns `Requirements` into `Selections`: one implementation per
//! interface reachable from the root, chosen from the candidates the feeds
//! offer. `SimpleSolver` is the in-process strategy.

pub mod candidate;
pub mod simple;

pub use candidate::{CandidateFilter, CandidateNote, CandidateRanking, SelectionCandidate};
pub use simple::SimpleSolver;

use crate::error::Result;
use crate::model::{Requirements, Selections};

/// Strategy for resolving requirements
pub trait Solver {
    /// Select implementations; the flag reports whether any feed used was
    /// stale and should be refreshed
    fn solve(&self, requirements: &Requirements) -> Result<(Selections, bool)>;
}

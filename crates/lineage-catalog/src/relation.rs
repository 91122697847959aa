//! Directed dependency between two activities

use lineage_model::ActivityId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `downstream` depends on `upstream`
///
/// `upstream` produced (or produced a directory covering) something
/// `downstream` consumed. Relations are derived by the store, never created
/// by callers directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub downstream: ActivityId,
    pub upstream: ActivityId,
}

impl Relation {
    #[inline]
    #[must_use]
    pub fn new(downstream: ActivityId, upstream: ActivityId) -> Self {
        Self {
            downstream,
            upstream,
        }
    }

    /// Whether both endpoints are the same activity
    #[inline]
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.downstream == self.upstream
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.upstream, self.downstream)
    }
}

/// Traversal direction over relations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards activities that depend on the start
    Downstream,
    /// Towards activities the start depends on
    Upstream,
}

impl Direction {
    #[inline]
    #[must_use]
    pub fn reverse(self) -> Self {
        match self {
            Direction::Downstream => Direction::Upstream,
            Direction::Upstream => Direction::Downstream,
        }
    }
}

//! Overlap records.
//!
//! An overlap is the non-empty intersection of two intervals on different
//! resources. Records are derived values: every detection pass builds a
//! fresh set.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StepCategory;

/// Unordered pair of step categories, stored sorted.
///
/// `OverlapKind::new(Stamping, Setup)` equals `OverlapKind::new(Setup, Stamping)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OverlapKind {
    first: StepCategory,
    second: StepCategory,
}

impl OverlapKind {
    /// Creates a canonical kind from two categories in any order.
    pub fn new(a: StepCategory, b: StepCategory) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// Lower category of the pair.
    pub fn first(&self) -> &StepCategory {
        &self.first
    }

    /// Higher category of the pair.
    pub fn second(&self) -> &StepCategory {
        &self.second
    }

    /// Whether the kind involves the given category.
    pub fn involves(&self, category: &StepCategory) -> bool {
        &self.first == category || &self.second == category
    }
}

impl fmt::Display for OverlapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.first, self.second)
    }
}

/// A temporal intersection between intervals of two resources.
///
/// Oriented so that `resource_a < resource_b`; `interval_a` and `interval_b`
/// index into the respective timelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapRecord {
    /// Lexicographically smaller resource.
    pub resource_a: String,
    /// Lexicographically larger resource.
    pub resource_b: String,
    /// Step name on `resource_a`.
    pub step_name_a: String,
    /// Step name on `resource_b`.
    pub step_name_b: String,
    /// Canonical category pair.
    pub kind: OverlapKind,
    /// Interval position in `resource_a`'s timeline.
    pub interval_a: usize,
    /// Interval position in `resource_b`'s timeline.
    pub interval_b: usize,
    /// Intersection start (inclusive).
    pub overlap_start: f64,
    /// Intersection end (exclusive).
    pub overlap_end: f64,
}

impl OverlapRecord {
    /// Length of the intersection.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.overlap_end - self.overlap_start
    }

    /// Whether the record involves a resource.
    #[inline]
    pub fn touches(&self, resource_id: &str) -> bool {
        self.resource_a == resource_id || self.resource_b == resource_id
    }

    /// Whether two records describe the same interval pair.
    pub fn same_pair(&self, other: &Self) -> bool {
        self.resource_a == other.resource_a
            && self.resource_b == other.resource_b
            && self.interval_a == other.interval_a
            && self.interval_b == other.interval_b
    }
}

//! Category-pair filter for overlap detection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{OverlapKind, StepCategory};

/// The set of category pairs whose overlaps are of interest.
///
/// Passing no filter to a detector means "every non-idle pair". An empty
/// filter admits nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFilter {
    pairs: BTreeSet<OverlapKind>,
}

impl CategoryFilter {
    /// Creates an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// The weld line's operator conflict: set-up on one machine while
    /// stamping runs on another.
    pub fn setup_vs_stamping() -> Self {
        Self::new().with_pair(StepCategory::Setup, StepCategory::Stamping)
    }

    /// Admits overlaps between `a` and `b`, in either order.
    pub fn with_pair(mut self, a: StepCategory, b: StepCategory) -> Self {
        self.pairs.insert(OverlapKind::new(a, b));
        self
    }

    /// Whether an interval of this category can take part in any admitted pair.
    pub fn admits_category(&self, category: &StepCategory) -> bool {
        !category.is_idle() && self.pairs.iter().any(|k| k.involves(category))
    }

    /// Whether overlaps of this kind are reported.
    pub fn admits(&self, kind: &OverlapKind) -> bool {
        self.pairs.contains(kind)
    }

    /// Admitted pairs, sorted.
    pub fn pairs(&self) -> impl Iterator<Item = &OverlapKind> {
        self.pairs.iter()
    }

    /// Whether no pair is admitted.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<(StepCategory, StepCategory)> for CategoryFilter {
    fn from_iter<I: IntoIterator<Item = (StepCategory, StepCategory)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(a, b)| OverlapKind::new(a, b))
                .collect(),
        }
    }
}

//! Quadratic pairwise detector.
//!
//! # Algorithm
//!
//! 1. Group candidate intervals by resource.
//! 2. Enumerate every resource pair `(r1, r2)` with `r1 < r2`.
//! 3. Test every interval of `r1` against every interval of `r2`.
//!
//! Resource pairs are independent and are distributed across rayon
//! workers; partial results are concatenated and then sorted, so the
//! output does not depend on worker scheduling.
//!
//! # Complexity
//! O(n²) comparisons over the candidate set.

use rayon::prelude::*;
use tracing::debug;

use super::{candidates_by_resource, make_record, sort_records, CategoryFilter, OverlapDetector};
use crate::models::{OverlapRecord, Schedule};

/// Nested-loop baseline detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairwiseDetector;

impl OverlapDetector for PairwiseDetector {
    fn name(&self) -> &'static str {
        "pairwise"
    }

    fn detect(&self, schedule: &Schedule, filter: Option<&CategoryFilter>) -> Vec<OverlapRecord> {
        let groups = candidates_by_resource(schedule, filter);

        let pairs: Vec<(usize, usize)> = (0..groups.len())
            .flat_map(|r1| (r1 + 1..groups.len()).map(move |r2| (r1, r2)))
            .collect();

        let mut records: Vec<OverlapRecord> = pairs
            .par_iter()
            .flat_map_iter(|&(r1, r2)| {
                let (left, right) = (&groups[r1], &groups[r2]);
                left.iter().flat_map(move |a| {
                    right
                        .iter()
                        .filter_map(move |b| make_record(schedule, a, b, filter))
                })
            })
            .collect();

        sort_records(&mut records);
        debug!(
            detector = self.name(),
            resource_pairs = pairs.len(),
            overlaps = records.len(),
            "overlap pass complete"
        );
        records
    }
}

//! Sweep-line detector.
//!
//! # Algorithm
//!
//! 1. Merge all candidate intervals into one list sorted by start time.
//! 2. Sweep in that order, keeping the set of intervals still active at the
//!    sweep position.
//! 3. On reaching interval `x`, drop every active interval with
//!    `end <= x.start` (half-open: it can no longer intersect anything),
//!    then pair `x` with every remaining active interval.
//!
//! Intervals of one resource never intersect, so after step 3 the active
//! set holds at most one interval per resource: its size is bounded by the
//! number of resources, not by the number of intervals.
//!
//! # Complexity
//! O(n log n + n·r + k) for n candidates, r resources, k reported overlaps.
//!
//! # Reference
//! Preparata & Shamos (1985), "Computational Geometry", Ch. 8.8

use tracing::debug;

use super::{
    candidates_by_resource, make_record, sort_records, Candidate, CategoryFilter, OverlapDetector,
};
use crate::models::{OverlapRecord, Schedule};

/// Sorted-sweep detector. Produces the same records as
/// [`PairwiseDetector`](super::PairwiseDetector).
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepLineDetector;

impl OverlapDetector for SweepLineDetector {
    fn name(&self) -> &'static str {
        "sweep-line"
    }

    fn detect(&self, schedule: &Schedule, filter: Option<&CategoryFilter>) -> Vec<OverlapRecord> {
        let mut events: Vec<Candidate> = candidates_by_resource(schedule, filter)
            .into_iter()
            .flatten()
            .collect();
        events.sort_by(|x, y| {
            x.start
                .total_cmp(&y.start)
                .then_with(|| x.resource.cmp(&y.resource))
                .then_with(|| x.index.cmp(&y.index))
        });

        let mut active: Vec<Candidate> = Vec::with_capacity(schedule.resource_count());
        let mut records = Vec::new();

        for x in &events {
            active.retain(|a| a.end > x.start);
            records.extend(
                active
                    .iter()
                    .filter_map(|a| make_record(schedule, a, x, filter)),
            );
            active.push(*x);
        }

        sort_records(&mut records);
        debug!(
            detector = self.name(),
            candidates = events.len(),
            overlaps = records.len(),
            "overlap pass complete"
        );
        records
    }
}

//! Cross-resource overlap detection.
//!
//! Finds every non-empty intersection between intervals on different
//! resources, optionally restricted to chosen category pairs, and
//! classifies each by its canonical category pair.
//!
//! # Semantics
//!
//! Intervals are half-open: `[s1, e1)` and `[s2, e2)` intersect iff
//! `s1 < e2 && s2 < e1`. Back-to-back steps (`e1 == s2`) never overlap.
//! `Wait` intervals are never candidates.
//!
//! # Implementations
//!
//! | Detector | Complexity | Notes |
//! |----------|-----------|-------|
//! | [`PairwiseDetector`] | O(n²) | Baseline; resource pairs run in parallel |
//! | [`SweepLineDetector`] | O(n log n + k) | Default |
//!
//! Both return the identical record set in the same order (see
//! [`sort_records`]).
//!
//! # Reference
//! Preparata & Shamos (1985), "Computational Geometry", Ch. 8.8 (interval
//! intersection via plane sweep)

mod filter;
mod pairwise;
mod sweep;

pub use filter::CategoryFilter;
pub use pairwise::PairwiseDetector;
pub use sweep::SweepLineDetector;

use std::cmp::Ordering;
use std::fmt::Debug;

use crate::models::{OverlapKind, OverlapRecord, Schedule};

/// An overlap detection strategy.
pub trait OverlapDetector: Send + Sync + Debug {
    /// Detector name (e.g., "pairwise", "sweep-line").
    fn name(&self) -> &'static str;

    /// Detects overlaps across resources.
    ///
    /// Never fails; an empty schedule yields no records.
    fn detect(&self, schedule: &Schedule, filter: Option<&CategoryFilter>) -> Vec<OverlapRecord>;
}

/// Detects overlaps with the default (sweep-line) detector.
///
/// # Example
///
/// ```
/// use u_timeline::models::{ResourceConfig, Schedule, StepSpec};
/// use u_timeline::overlap::detect;
/// use u_timeline::timeline::generate;
///
/// let steps = vec![StepSpec::new("Setup", 10.0).unwrap()];
/// let mut schedule = Schedule::new();
/// schedule.add_timeline(generate(&ResourceConfig::new("A", steps.clone())).unwrap());
/// schedule.add_timeline(generate(&ResourceConfig::new("B", steps).with_start_offset(5.0)).unwrap());
///
/// let overlaps = detect(&schedule, None);
/// assert_eq!(overlaps.len(), 1);
/// assert_eq!((overlaps[0].overlap_start, overlaps[0].overlap_end), (5.0, 10.0));
/// ```
pub fn detect(schedule: &Schedule, filter: Option<&CategoryFilter>) -> Vec<OverlapRecord> {
    SweepLineDetector.detect(schedule, filter)
}

/// Reference to a candidate interval: timeline position + interval position.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate {
    /// Timeline position in the schedule.
    pub resource: usize,
    /// Interval position in that timeline.
    pub index: usize,
    /// Interval start.
    pub start: f64,
    /// Interval end.
    pub end: f64,
}

/// Candidate intervals grouped by timeline, in chronological order.
pub(crate) fn candidates_by_resource(
    schedule: &Schedule,
    filter: Option<&CategoryFilter>,
) -> Vec<Vec<Candidate>> {
    schedule
        .timelines
        .iter()
        .enumerate()
        .map(|(resource, timeline)| {
            timeline
                .intervals
                .iter()
                .enumerate()
                .filter(|(_, i)| match filter {
                    Some(f) => f.admits_category(&i.category),
                    None => !i.category.is_idle(),
                })
                .map(|(index, i)| Candidate {
                    resource,
                    index,
                    start: i.start,
                    end: i.end,
                })
                .collect()
        })
        .collect()
}

/// Builds the record for two candidates, if they form a reportable overlap.
///
/// Orientation is canonical (`resource_a < resource_b`), so the result does
/// not depend on argument order.
pub(crate) fn make_record(
    schedule: &Schedule,
    a: &Candidate,
    b: &Candidate,
    filter: Option<&CategoryFilter>,
) -> Option<OverlapRecord> {
    let (ta, tb) = (&schedule.timelines[a.resource], &schedule.timelines[b.resource]);
    if ta.resource_id == tb.resource_id {
        return None;
    }

    let (ia, ib) = (&ta.intervals[a.index], &tb.intervals[b.index]);
    if !ia.overlaps(ib) {
        return None;
    }

    let kind = OverlapKind::new(ia.category.clone(), ib.category.clone());
    if filter.is_some_and(|f| !f.admits(&kind)) {
        return None;
    }

    let ((ta, ia, pa), (tb, ib, pb)) = if ta.resource_id < tb.resource_id {
        ((ta, ia, a.index), (tb, ib, b.index))
    } else {
        ((tb, ib, b.index), (ta, ia, a.index))
    };

    Some(OverlapRecord {
        resource_a: ta.resource_id.clone(),
        resource_b: tb.resource_id.clone(),
        step_name_a: ia.step_name.clone(),
        step_name_b: ib.step_name.clone(),
        kind,
        interval_a: pa,
        interval_b: pb,
        overlap_start: ia.start.max(ib.start),
        overlap_end: ia.end.min(ib.end),
    })
}

/// Sorts records into the canonical output order.
///
/// Key: `(overlap_start, overlap_end, resource_a, resource_b, interval_a, interval_b)`.
pub fn sort_records(records: &mut [OverlapRecord]) {
    records.sort_by(compare_records);
}

fn compare_records(x: &OverlapRecord, y: &OverlapRecord) -> Ordering {
    x.overlap_start
        .total_cmp(&y.overlap_start)
        .then_with(|| x.overlap_end.total_cmp(&y.overlap_end))
        .then_with(|| x.resource_a.cmp(&y.resource_a))
        .then_with(|| x.resource_b.cmp(&y.resource_b))
        .then_with(|| x.interval_a.cmp(&y.interval_a))
        .then_with(|| x.interval_b.cmp(&y.interval_b))
}

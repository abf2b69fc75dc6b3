//! Timeline and schedule (solution) model.
//!
//! An [`Interval`] is the half-open span `[start, end)` during which one step
//! runs on one resource. A resource's intervals form its [`Timeline`];
//! timelines of all resources form a [`Schedule`].
//!
//! Intervals are only created by the timeline generator and are read-only
//! afterwards.

use serde::{Deserialize, Serialize};

use super::StepCategory;

/// One step execution on one resource.
///
/// `duration` is the configured step duration carried verbatim, so exports
/// reproduce the input value rather than `end - start` after rounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Resource that executes the step.
    pub resource_id: String,
    /// Unit number (1-based).
    pub unit_index: u32,
    /// Cycle number within the unit (1-based).
    pub cycle_index: u32,
    /// Step name.
    pub step_name: String,
    /// Step category, resolved at generation.
    pub category: StepCategory,
    /// Start time (inclusive).
    pub start: f64,
    /// End time (exclusive).
    pub end: f64,
    /// Configured step duration.
    pub duration: f64,
}

impl Interval {
    /// Whether two intervals intersect.
    ///
    /// Half-open semantics: touching endpoints do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether a time point falls within this interval.
    #[inline]
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }
}

/// The ordered intervals of one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Resource identifier.
    pub resource_id: String,
    /// Configured start offset.
    pub start_offset: f64,
    /// Intervals in chronological order.
    pub intervals: Vec<Interval>,
}

impl Timeline {
    /// Creates an empty timeline.
    pub fn new(resource_id: impl Into<String>, start_offset: f64) -> Self {
        Self {
            resource_id: resource_id.into(),
            start_offset,
            intervals: Vec::new(),
        }
    }

    /// End of the last interval, or the start offset if empty.
    pub fn end(&self) -> f64 {
        self.intervals
            .last()
            .map(|i| i.end)
            .unwrap_or(self.start_offset)
    }

    /// Total runtime: last end minus start offset.
    pub fn total_runtime(&self) -> f64 {
        self.end() - self.start_offset
    }

    /// Intervals of a given category.
    pub fn intervals_of<'a>(
        &'a self,
        category: &'a StepCategory,
    ) -> impl Iterator<Item = &'a Interval> + 'a {
        self.intervals.iter().filter(move |i| &i.category == category)
    }

    /// Number of intervals.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Whether the timeline has no intervals.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

/// Timelines of all resources, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Per-resource timelines.
    pub timelines: Vec<Timeline>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a timeline.
    pub fn add_timeline(&mut self, timeline: Timeline) {
        self.timelines.push(timeline);
    }

    /// Finds the timeline of a resource.
    pub fn timeline_for(&self, resource_id: &str) -> Option<&Timeline> {
        self.timelines.iter().find(|t| t.resource_id == resource_id)
    }

    /// All intervals across resources, timeline by timeline.
    pub fn intervals(&self) -> impl Iterator<Item = &Interval> {
        self.timelines.iter().flat_map(|t| t.intervals.iter())
    }

    /// Makespan: latest interval end across all timelines.
    pub fn makespan(&self) -> f64 {
        self.timelines
            .iter()
            .filter(|t| !t.is_empty())
            .map(Timeline::end)
            .fold(0.0, f64::max)
    }

    /// Number of timelines.
    pub fn resource_count(&self) -> usize {
        self.timelines.len()
    }

    /// Number of intervals across all timelines.
    pub fn interval_count(&self) -> usize {
        self.timelines.iter().map(Timeline::len).sum()
    }

    /// Whether no resources are scheduled.
    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }
}

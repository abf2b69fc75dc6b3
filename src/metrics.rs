//! Fleet metrics and utilization grade.
//!
//! Computes per-resource and fleet-wide indicators from a schedule and its
//! overlap records.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total runtime | Last interval end − start offset |
//! | Downtime | Slowest resource's runtime − own runtime |
//! | Overlap count | Records touching the resource |
//! | Overlap duration | Sum of those records' lengths |
//! | Utilization | (Σruntime − Σdowntime − Σoverlap) / Σruntime |
//!
//! A record counts fully toward both of its resources, but only once toward
//! the fleet overlap total.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::{OverlapKind, OverlapRecord, Schedule};

/// Per-resource indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSummary {
    /// Resource identifier.
    pub resource_id: String,
    /// Last interval end minus start offset.
    pub total_runtime: f64,
    /// Idle time relative to the slowest resource (≥ 0).
    pub downtime: f64,
    /// Records involving this resource.
    pub overlap_count: usize,
    /// Summed duration of those records.
    pub overlap_duration: f64,
}

/// Overlap totals for one category pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindTotal {
    /// Category pair.
    pub kind: OverlapKind,
    /// Number of records.
    pub count: usize,
    /// Summed overlap duration.
    pub duration: f64,
}

/// Letter bucket of a utilization percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Buckets a percentage. Lower bounds are inclusive.
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 90.0 {
            Self::A
        } else if percent >= 80.0 {
            Self::B
        } else if percent >= 70.0 {
            Self::C
        } else if percent >= 60.0 {
            Self::D
        } else {
            Self::F
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        };
        f.write_str(letter)
    }
}

/// Fleet utilization as a percentage and its grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtilizationGrade {
    /// Utilization in `[0, 100]`.
    pub percent: f64,
    /// Letter bucket for `percent`.
    pub grade: Grade,
}

impl UtilizationGrade {
    /// Grades a percentage, clamped to `[0, 100]`. NaN grades as 0%.
    pub fn from_percent(percent: f64) -> Self {
        let percent = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        Self {
            percent,
            grade: Grade::from_percent(percent),
        }
    }
}

/// Fleet-wide summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSummary {
    /// One entry per timeline, in schedule order.
    pub resources: Vec<ResourceSummary>,
    /// Sum of resource runtimes.
    pub total_runtime: f64,
    /// Sum of resource downtimes.
    pub total_downtime: f64,
    /// Distinct overlap duration (each record counted once).
    pub total_overlap_duration: f64,
    /// Number of records.
    pub overlap_count: usize,
    /// Totals per category pair, sorted by kind.
    pub by_kind: Vec<KindTotal>,
    /// Fleet utilization and grade.
    pub utilization: UtilizationGrade,
}

impl FleetSummary {
    /// Computes the summary. Pure: equal inputs give equal summaries.
    ///
    /// An empty schedule yields no resource entries and a 0% / F grade.
    pub fn calculate(schedule: &Schedule, overlaps: &[OverlapRecord]) -> Self {
        let runtimes: Vec<f64> = schedule
            .timelines
            .iter()
            .map(|t| t.total_runtime())
            .collect();
        let slowest = runtimes.iter().copied().fold(0.0, f64::max);

        let resources: Vec<ResourceSummary> = schedule
            .timelines
            .iter()
            .zip(&runtimes)
            .map(|(timeline, &runtime)| {
                let (overlap_count, overlap_duration) = overlaps
                    .iter()
                    .filter(|r| r.touches(&timeline.resource_id))
                    .fold((0, 0.0), |(n, d), r| (n + 1, d + r.duration()));
                ResourceSummary {
                    resource_id: timeline.resource_id.clone(),
                    total_runtime: runtime,
                    downtime: (slowest - runtime).max(0.0),
                    overlap_count,
                    overlap_duration,
                }
            })
            .collect();

        let mut kinds: BTreeMap<&OverlapKind, (usize, f64)> = BTreeMap::new();
        for r in overlaps {
            let entry = kinds.entry(&r.kind).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += r.duration();
        }
        let by_kind = kinds
            .into_iter()
            .map(|(kind, (count, duration))| KindTotal {
                kind: kind.clone(),
                count,
                duration,
            })
            .collect();

        let total_runtime: f64 = runtimes.iter().sum();
        let total_downtime: f64 = resources.iter().map(|r| r.downtime).sum();
        let total_overlap_duration: f64 = overlaps.iter().map(OverlapRecord::duration).sum();

        let utilization = if total_runtime > 0.0 {
            UtilizationGrade::from_percent(
                (total_runtime - total_downtime - total_overlap_duration) / total_runtime * 100.0,
            )
        } else {
            UtilizationGrade::from_percent(0.0)
        };

        Self {
            resources,
            total_runtime,
            total_downtime,
            total_overlap_duration,
            overlap_count: overlaps.len(),
            by_kind,
            utilization,
        }
    }

    /// Summary of one resource.
    pub fn resource(&self, resource_id: &str) -> Option<&ResourceSummary> {
        self.resources.iter().find(|r| r.resource_id == resource_id)
    }

    /// Whether the fleet meets a minimum grade.
    pub fn meets_grade(&self, minimum: Grade) -> bool {
        self.utilization.grade <= minimum
    }
}

/// Computes the fleet summary.
pub fn summarize(schedule: &Schedule, overlaps: &[OverlapRecord]) -> FleetSummary {
    FleetSummary::calculate(schedule, overlaps)
}

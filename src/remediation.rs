//! Greedy wait-time remediation.
//!
//! # Algorithm
//!
//! Each resource with overlaps gets a wait of
//! `min(cap, overlap_count × per_overlap_penalty)`, appended after every
//! cycle's final step. Resources without overlaps get no wait. The adjusted
//! configurations are then re-planned for comparison.
//!
//! This is a local heuristic. It never moves start offsets or reorders
//! steps, and it does not promise zero residual overlap.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::metrics::ResourceSummary;
use crate::models::ResourceConfig;

/// Wait suggestion parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaitPolicy {
    /// Upper bound on a suggested wait (minutes).
    #[serde(default = "default_cap_minutes")]
    pub cap_minutes: f64,
    /// Wait added per overlap (minutes).
    #[serde(default = "default_per_overlap_penalty")]
    pub per_overlap_penalty: f64,
}

fn default_cap_minutes() -> f64 {
    10.0
}

fn default_per_overlap_penalty() -> f64 {
    2.0
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            cap_minutes: default_cap_minutes(),
            per_overlap_penalty: default_per_overlap_penalty(),
        }
    }
}

impl WaitPolicy {
    /// Creates a policy.
    pub fn new(cap_minutes: f64, per_overlap_penalty: f64) -> Self {
        Self {
            cap_minutes,
            per_overlap_penalty,
        }
    }

    /// Wait for a single resource with `overlap_count` overlaps.
    pub fn wait_for(&self, overlap_count: usize) -> f64 {
        if overlap_count == 0 {
            return 0.0;
        }
        (overlap_count as f64 * self.per_overlap_penalty)
            .min(self.cap_minutes)
            .max(0.0)
    }

    /// Suggests a wait for every summarized resource.
    pub fn suggest_waits(&self, summaries: &[ResourceSummary]) -> BTreeMap<String, f64> {
        summaries
            .iter()
            .map(|s| (s.resource_id.clone(), self.wait_for(s.overlap_count)))
            .collect()
    }
}

/// Returns copies of `configs` with suggested waits applied.
///
/// Resources missing from `waits` keep their configuration.
pub fn apply_waits(configs: &[ResourceConfig], waits: &BTreeMap<String, f64>) -> Vec<ResourceConfig> {
    configs
        .iter()
        .map(|c| match waits.get(&c.id) {
            Some(&wait) => c.clone().with_wait_after_cycle(wait),
            None => c.clone(),
        })
        .collect()
}

/// Overlap counts of one resource before and after remediation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapDelta {
    /// Resource the wait applies to.
    pub resource_id: String,
    /// Wait appended after each cycle (minutes).
    pub wait: f64,
    /// Overlaps in the baseline plan.
    pub before: usize,
    /// Overlaps after the wait was applied.
    pub after: usize,
}

impl OverlapDelta {
    /// Whether the adjusted run did not increase this resource's overlaps.
    pub fn is_non_increasing(&self) -> bool {
        self.after <= self.before
    }
}

/// Pairs before/after summaries by resource ID.
pub fn compare(
    waits: &BTreeMap<String, f64>,
    before: &[ResourceSummary],
    after: &[ResourceSummary],
) -> Vec<OverlapDelta> {
    before
        .iter()
        .map(|b| OverlapDelta {
            resource_id: b.resource_id.clone(),
            wait: waits.get(&b.resource_id).copied().unwrap_or(0.0),
            before: b.overlap_count,
            after: after
                .iter()
                .find(|a| a.resource_id == b.resource_id)
                .map(|a| a.overlap_count)
                .unwrap_or(0),
        })
        .collect()
}

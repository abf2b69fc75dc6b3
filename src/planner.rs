//! End-to-end planning pipeline.
//!
//! # Algorithm
//!
//! 1. Generate every resource's timeline in parallel.
//! 2. Merge successful timelines into a [`Schedule`]; failed configs are
//!    reported in [`Plan::rejected`] and do not affect the others.
//! 3. Detect overlaps with the configured detector and filter.
//! 4. Summarize.
//!
//! Remediation suggests waits from the first plan's summaries, applies
//! them, and runs steps 1–4 again for comparison.
//!
//! The result of every run is an immutable [`Plan`] value; the planner
//! keeps no state between runs.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::TimelineError;
use crate::metrics::FleetSummary;
use crate::models::{OverlapRecord, ResourceConfig, Schedule};
use crate::overlap::{CategoryFilter, OverlapDetector, SweepLineDetector};
use crate::remediation::{apply_waits, compare, OverlapDelta, WaitPolicy};
use crate::timeline::generate_all;

/// A resource config that could not be turned into a timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedResource {
    /// Resource whose config was rejected.
    pub resource_id: String,
    /// Error message.
    pub reason: String,
}

/// Result of one generate → detect → summarize run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Timelines of accepted resources.
    pub schedule: Schedule,
    /// Detected overlaps, in canonical order.
    pub overlaps: Vec<OverlapRecord>,
    /// Fleet and per-resource indicators.
    pub summary: FleetSummary,
    /// Configs that produced no timeline.
    pub rejected: Vec<RejectedResource>,
}

impl Plan {
    /// Whether every configured resource produced a timeline.
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Overlap count of one resource (0 if unknown).
    pub fn overlap_count(&self, resource_id: &str) -> usize {
        self.summary
            .resource(resource_id)
            .map(|r| r.overlap_count)
            .unwrap_or(0)
    }
}

/// Baseline plan, suggested waits, adjusted plan, and per-resource deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remediation {
    /// Suggested wait per resource.
    pub waits: BTreeMap<String, f64>,
    /// Plan of the original configs.
    pub before: Plan,
    /// Plan with the waits applied.
    pub after: Plan,
    /// Per-resource overlap counts before and after.
    pub deltas: Vec<OverlapDelta>,
}

/// Runs the planning pipeline.
///
/// # Example
///
/// ```
/// use u_timeline::models::{ResourceConfig, StepSpec};
/// use u_timeline::planner::LinePlanner;
///
/// let steps = vec![
///     StepSpec::new("Setup", 10.0).unwrap(),
///     StepSpec::new("Work", 20.0).unwrap(),
/// ];
/// let configs = vec![
///     ResourceConfig::new("A", steps.clone()),
///     ResourceConfig::new("B", steps).with_start_offset(5.0),
/// ];
///
/// let plan = LinePlanner::new().plan(&configs);
/// assert_eq!(plan.overlaps.len(), 3);
/// assert_eq!(plan.summary.resource("A").unwrap().total_runtime, 30.0);
/// ```
#[derive(Debug, Clone)]
pub struct LinePlanner {
    detector: Arc<dyn OverlapDetector>,
    filter: Option<CategoryFilter>,
    policy: WaitPolicy,
}

impl LinePlanner {
    /// Creates a planner with the sweep-line detector, no filter, and the
    /// default wait policy.
    pub fn new() -> Self {
        Self {
            detector: Arc::new(SweepLineDetector),
            filter: None,
            policy: WaitPolicy::default(),
        }
    }

    /// Sets the overlap detector.
    pub fn with_detector<D: OverlapDetector + 'static>(mut self, detector: D) -> Self {
        self.detector = Arc::new(detector);
        self
    }

    /// Restricts detection to the filter's category pairs.
    pub fn with_filter(mut self, filter: CategoryFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sets the remediation policy.
    pub fn with_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Detector in use.
    pub fn detector(&self) -> &dyn OverlapDetector {
        self.detector.as_ref()
    }

    /// Runs generate → detect → summarize.
    ///
    /// Never fails: bad configs are rejected individually, and an empty
    /// input yields an empty plan graded 0% / F. The first config of an ID
    /// that generates a timeline wins; later ones with that ID are rejected.
    pub fn plan(&self, configs: &[ResourceConfig]) -> Plan {
        let mut schedule = Schedule::new();
        let mut rejected = Vec::new();
        let mut accepted: HashSet<&str> = HashSet::new();

        for (config, result) in configs.iter().zip(generate_all(configs)) {
            let result = result.and_then(|timeline| {
                if accepted.insert(config.id.as_str()) {
                    Ok(timeline)
                } else {
                    Err(TimelineError::invalid_config(&config.id, "duplicate resource id"))
                }
            });
            match result {
                Ok(timeline) => schedule.add_timeline(timeline),
                Err(err) => {
                    warn!(resource = %config.id, error = %err, "resource rejected");
                    rejected.push(RejectedResource {
                        resource_id: config.id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let overlaps = self.detector.detect(&schedule, self.filter.as_ref());
        let summary = FleetSummary::calculate(&schedule, &overlaps);

        info!(
            resources = schedule.resource_count(),
            rejected = rejected.len(),
            overlaps = overlaps.len(),
            utilization = summary.utilization.percent,
            grade = %summary.utilization.grade,
            "plan complete"
        );

        Plan {
            schedule,
            overlaps,
            summary,
            rejected,
        }
    }

    /// Suggests waits from `baseline` and re-plans `configs` with them.
    ///
    /// `baseline` should be the plan of the same `configs`.
    pub fn remediate(&self, configs: &[ResourceConfig], baseline: &Plan) -> Remediation {
        let waits = self.policy.suggest_waits(&baseline.summary.resources);
        let adjusted = apply_waits(configs, &waits);
        let after = self.plan(&adjusted);
        let deltas = compare(&waits, &baseline.summary.resources, &after.summary.resources);

        for d in deltas.iter().filter(|d| !d.is_non_increasing()) {
            warn!(
                resource = %d.resource_id,
                before = d.before,
                after = d.after,
                "wait increased overlaps"
            );
        }

        Remediation {
            waits,
            before: baseline.clone(),
            after,
            deltas,
        }
    }

    /// Plans `configs`, then remediates.
    pub fn plan_and_remediate(&self, configs: &[ResourceConfig]) -> Remediation {
        let baseline = self.plan(configs);
        self.remediate(configs, &baseline)
    }
}

impl Default for LinePlanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogKey, StepCatalog, WeldStepDurations};
    use crate::metrics::Grade;
    use crate::models::{StepCategory, StepSpec};
    use crate::overlap::PairwiseDetector;

    fn setup_work() -> Vec<StepSpec> {
        vec![
            StepSpec::new("Setup", 10.0).unwrap(),
            StepSpec::new("Work", 20.0).unwrap(),
        ]
    }

    fn setup_only() -> CategoryFilter {
        CategoryFilter::new().with_pair(StepCategory::Setup, StepCategory::Setup)
    }

    /// A repeats a short setup three times while B's one long setup covers
    /// all three.
    fn contended_line() -> Vec<ResourceConfig> {
        vec![
            ResourceConfig::new(
                "A",
                vec![
                    StepSpec::new("Setup", 5.0).unwrap(),
                    StepSpec::new("Work", 10.0).unwrap(),
                ],
            )
            .with_cycles_per_unit(3),
            ResourceConfig::new("B", vec![StepSpec::new("Setup", 38.0).unwrap()])
                .with_start_offset(2.0),
        ]
    }

    #[test]
    fn test_plan_two_machines() {
        let configs = vec![
            ResourceConfig::new("A", setup_work()),
            ResourceConfig::new("B", setup_work()).with_start_offset(5.0),
        ];
        let plan = LinePlanner::new().plan(&configs);
        assert!(plan.is_complete());
        assert_eq!(plan.schedule.resource_count(), 2);
        assert_eq!(plan.overlaps.len(), 3);
        assert_eq!(plan.overlap_count("A"), 3);
        assert_eq!(plan.summary.resource("B").unwrap().downtime, 0.0);
    }

    #[test]
    fn test_bad_resource_does_not_block_others() {
        let configs = vec![
            ResourceConfig::new("A", setup_work()),
            ResourceConfig::new("broken", Vec::new()),
            ResourceConfig::new("B", setup_work()).with_start_offset(5.0),
        ];
        let plan = LinePlanner::new().plan(&configs);
        assert_eq!(plan.schedule.resource_count(), 2);
        assert_eq!(plan.rejected.len(), 1);
        assert_eq!(plan.rejected[0].resource_id, "broken");
        assert!(plan.rejected[0].reason.contains("empty"));
        assert!(!plan.is_complete());
        assert_eq!(plan.overlaps.len(), 3);
    }

    #[test]
    fn test_duplicate_resource_rejected() {
        let configs = vec![
            ResourceConfig::new("A", setup_work()),
            ResourceConfig::new("A", setup_work()).with_start_offset(5.0),
        ];
        let plan = LinePlanner::new().plan(&configs);
        assert_eq!(plan.schedule.resource_count(), 1);
        assert_eq!(plan.schedule.timelines[0].start_offset, 0.0);
        assert!(plan.rejected[0].reason.contains("duplicate"));
        assert!(plan.overlaps.is_empty());
    }

    #[test]
    fn test_invalid_first_occurrence_does_not_shadow_valid_one() {
        let configs = vec![
            ResourceConfig::new("A", Vec::new()),
            ResourceConfig::new("A", setup_work()).with_start_offset(5.0),
            ResourceConfig::new("A", setup_work()),
        ];
        let plan = LinePlanner::new().plan(&configs);
        assert_eq!(plan.schedule.resource_count(), 1);
        assert_eq!(plan.schedule.timelines[0].start_offset, 5.0);

        let reasons: Vec<&str> = plan.rejected.iter().map(|r| r.reason.as_str()).collect();
        assert_eq!(reasons.len(), 2);
        assert!(reasons[0].contains("empty"));
        assert!(reasons[1].contains("duplicate"));
    }

    #[test]
    fn test_user_idle_step_is_work() {
        let configs = vec![
            ResourceConfig::new("A", vec![StepSpec::new("Idle", 10.0).unwrap()]),
            ResourceConfig::new("B", vec![StepSpec::new("Work", 10.0).unwrap()])
                .with_start_offset(5.0),
        ];
        let plan = LinePlanner::new().plan(&configs);
        assert_eq!(plan.overlaps.len(), 1);
        let record = &plan.overlaps[0];
        assert_eq!((record.overlap_start, record.overlap_end), (5.0, 10.0));
        assert_eq!(record.step_name_a, "Idle");
        assert_eq!(record.kind.to_string(), "Idle vs Work");
    }

    #[test]
    fn test_overflowing_resource_is_rejected() {
        let configs = vec![
            ResourceConfig::new("A", setup_work()),
            ResourceConfig::new("huge", vec![StepSpec::new("Work", f64::MAX / 1.5).unwrap()])
                .with_units(3),
        ];
        let plan = LinePlanner::new().plan(&configs);
        assert_eq!(plan.schedule.resource_count(), 1);
        assert_eq!(plan.rejected[0].resource_id, "huge");
        assert!(plan
            .schedule
            .intervals()
            .all(|i| i.end.is_finite() && i.end > i.start));
        assert_eq!(plan.summary.utilization.percent, 100.0);
    }

    #[test]
    fn test_empty_input() {
        let plan = LinePlanner::new().plan(&[]);
        assert!(plan.schedule.is_empty());
        assert!(plan.overlaps.is_empty());
        assert!(plan.summary.resources.is_empty());
        assert_eq!(plan.summary.utilization.grade, Grade::F);
    }

    #[test]
    fn test_detectors_give_same_plan() {
        let configs = vec![
            ResourceConfig::new("A", setup_work()).with_units(3),
            ResourceConfig::new("B", setup_work()).with_start_offset(5.0).with_units(2),
            ResourceConfig::new("C", setup_work()).with_start_offset(17.0),
        ];
        let sweep = LinePlanner::new().plan(&configs);
        let pairwise = LinePlanner::new()
            .with_detector(PairwiseDetector)
            .plan(&configs);
        assert_eq!(sweep, pairwise);
    }

    #[test]
    fn test_lookup_miss_substitutes_fallback_and_continues() {
        let durations = WeldStepDurations::default();
        let catalog = StepCatalog::weld_reference(durations).unwrap();

        let keys = [CatalogKey::new(16, 7), CatalogKey::new(99, 99)];
        let configs: Vec<ResourceConfig> = keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let outcome = catalog.lookup_or(*key, durations.fallback_steps().unwrap());
                ResourceConfig::weld_machine(i + 1, outcome.into_steps())
            })
            .collect();

        assert!(matches!(
            catalog.lookup(CatalogKey::new(99, 99)),
            Err(TimelineError::LookupMiss { .. })
        ));

        let plan = LinePlanner::new()
            .with_filter(CategoryFilter::setup_vs_stamping())
            .plan(&configs);
        assert!(plan.is_complete());

        let fallback = plan.schedule.timeline_for("Machine 2").unwrap();
        assert_eq!(fallback.intervals[1].step_name, "Weld start");
        assert_eq!(fallback.intervals[1].duration, 10.0);
        assert_eq!(fallback.intervals[3].duration, 10.0);
        // 3 elbows × 2 welds × (5 + 10 + 3 + 10)
        assert_eq!(fallback.total_runtime(), 168.0);
    }

    #[test]
    fn test_remediation_wait_and_regression() {
        let configs = contended_line();
        let planner = LinePlanner::new().with_filter(setup_only());

        let baseline = planner.plan(&configs);
        assert_eq!(baseline.overlap_count("A"), 3);
        assert_eq!(baseline.overlap_count("B"), 3);

        let remediation = planner.remediate(&configs, &baseline);
        assert_eq!(remediation.waits["A"], 6.0);
        assert_eq!(remediation.waits["B"], 6.0);

        // A's setups move to [0,5), [21,26), [42,47); B still covers [2,40)
        assert_eq!(remediation.after.overlap_count("A"), 2);
        for delta in &remediation.deltas {
            assert!(delta.is_non_increasing(), "{delta:?}");
        }
        assert_eq!(remediation.before, baseline);
    }

    #[test]
    fn test_remediation_without_overlaps_is_noop() {
        let configs = vec![
            ResourceConfig::new("A", setup_work()),
            ResourceConfig::new("B", setup_work()).with_start_offset(30.0),
        ];
        let remediation = LinePlanner::new().plan_and_remediate(&configs);
        assert!(remediation.waits.values().all(|&w| w == 0.0));
        assert_eq!(remediation.before.schedule, remediation.after.schedule);
    }

    #[test]
    fn test_plan_serializes() {
        let configs = vec![
            ResourceConfig::new("A", setup_work()),
            ResourceConfig::new("B", setup_work()).with_start_offset(5.0),
        ];
        let plan = LinePlanner::new().plan(&configs);
        let json = serde_json::to_value(&plan).unwrap();
        let first = &json["schedule"]["timelines"][0]["intervals"][0];
        for field in [
            "resource_id",
            "unit_index",
            "cycle_index",
            "step_name",
            "start",
            "end",
            "duration",
        ] {
            assert!(first.get(field).is_some(), "missing {field}");
        }
        assert_eq!(json["summary"]["utilization"]["grade"], "F");
    }
}

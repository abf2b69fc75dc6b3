//! Resource configuration model.
//!
//! A resource is a machine that repeats one step sequence: once per cycle,
//! `cycles_per_unit` cycles per unit of work, `unit_count` units in total.
//! In the weld line, a unit is an elbow and a cycle is one weld on it.

use serde::{Deserialize, Serialize};

use super::StepSpec;
use crate::error::{TimelineError, TimelineResult};
use crate::validation::config_issues;

/// Stagger between default machine start offsets.
pub const DEFAULT_START_STAGGER: f64 = 5.0;

/// Configuration for one resource's timeline.
///
/// Built with the builder methods, then checked by [`ResourceConfig::validate`]
/// before any interval is generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Unique resource identifier.
    pub id: String,
    /// Time at which the first step starts (≥ 0).
    pub start_offset: f64,
    /// Number of units processed (≥ 1).
    pub unit_count: u32,
    /// Cycles per unit (≥ 1).
    pub cycles_per_unit: u32,
    /// Step sequence of one cycle (non-empty).
    pub steps: Vec<StepSpec>,
    /// Idle time appended after every cycle (≥ 0). Set by remediation.
    #[serde(default)]
    pub wait_after_cycle: f64,
}

impl ResourceConfig {
    /// Creates a config with one unit, one cycle, starting at 0.
    pub fn new(id: impl Into<String>, steps: Vec<StepSpec>) -> Self {
        Self {
            id: id.into(),
            start_offset: 0.0,
            unit_count: 1,
            cycles_per_unit: 1,
            steps,
            wait_after_cycle: 0.0,
        }
    }

    /// Creates the `number`-th weld machine with the default staggered start,
    /// three elbows and two welds per elbow.
    pub fn weld_machine(number: usize, steps: Vec<StepSpec>) -> Self {
        let stagger = number.saturating_sub(1) as f64 * DEFAULT_START_STAGGER;
        Self::new(format!("Machine {number}"), steps)
            .with_start_offset(stagger)
            .with_units(3)
            .with_cycles_per_unit(2)
    }

    /// Sets the start offset.
    pub fn with_start_offset(mut self, start_offset: f64) -> Self {
        self.start_offset = start_offset;
        self
    }

    /// Sets the number of units.
    pub fn with_units(mut self, unit_count: u32) -> Self {
        self.unit_count = unit_count;
        self
    }

    /// Sets the number of cycles per unit.
    pub fn with_cycles_per_unit(mut self, cycles_per_unit: u32) -> Self {
        self.cycles_per_unit = cycles_per_unit;
        self
    }

    /// Sets the idle time appended after each cycle.
    pub fn with_wait_after_cycle(mut self, wait: f64) -> Self {
        self.wait_after_cycle = wait;
        self
    }

    /// Duration of one cycle's steps, excluding any wait.
    pub fn cycle_duration(&self) -> f64 {
        self.steps.iter().map(StepSpec::duration).sum()
    }

    /// Total number of cycles across all units.
    pub fn total_cycles(&self) -> u64 {
        u64::from(self.unit_count) * u64::from(self.cycles_per_unit)
    }

    /// Checks the structural invariants, including that the timeline ends
    /// at a finite time.
    ///
    /// # Errors
    /// [`TimelineError::InvalidConfig`] naming the first violated rule.
    pub fn validate(&self) -> TimelineResult<()> {
        match config_issues(self).into_iter().next() {
            Some(issue) => Err(TimelineError::invalid_config(&self.id, issue.message)),
            None => Ok(()),
        }
    }
}

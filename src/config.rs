//! Plan configuration file support.
//!
//! A plan file describes the line-wide step durations, the overlap pairs
//! of interest, the remediation policy, and the machines:
//!
//! ```toml
//! detector = "sweep-line"
//! overlap_pairs = [["Set up", "Stamping"]]
//!
//! [policy]
//! cap_minutes = 10
//! per_overlap_penalty = 2
//!
//! [steps]
//! setup = 5
//! stamping = 3
//!
//! [[machines]]
//! pipe_size = 16
//! dr = 7
//!
//! [[machines]]
//! id = "Press 2"
//! start_offset = 12
//! units = 4
//! cycles_per_unit = 1
//! steps = [{ name = "Load", duration = 2, category = "Setup" }, { name = "Press", duration = 6 }]
//! ```
//!
//! Values are read from the TOML file, then overridden by environment
//! variables prefixed with `U_TIMELINE_` (nested keys separated by `__`,
//! e.g. `U_TIMELINE_POLICY__CAP_MINUTES=4`).

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::catalog::{CatalogKey, StepCatalog, WeldStepDurations};
use crate::error::TimelineResult;
use crate::models::{ResourceConfig, StepCategory, StepSpec};
use crate::overlap::{CategoryFilter, PairwiseDetector, SweepLineDetector};
use crate::planner::LinePlanner;
use crate::remediation::WaitPolicy;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "U_TIMELINE_";

/// Which overlap detector to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectorChoice {
    /// [`SweepLineDetector`].
    #[default]
    SweepLine,
    /// [`PairwiseDetector`].
    Pairwise,
}

/// Top-level plan configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Overlap detector to run.
    #[serde(default)]
    pub detector: DetectorChoice,
    /// Category-name pairs to report. Empty = every pair.
    #[serde(default)]
    pub overlap_pairs: Vec<(String, String)>,
    /// Remediation policy.
    #[serde(default)]
    pub policy: WaitPolicy,
    /// Line-wide set-up and stamping durations.
    #[serde(default)]
    pub steps: WeldStepDurations,
    /// Machines, in line order.
    #[serde(default)]
    pub machines: Vec<MachineConfig>,
}

/// One machine entry.
///
/// Steps come from `steps` when given, otherwise from the catalog entry
/// for (`pipe_size`, `dr`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Defaults to `Machine <n>`.
    #[serde(default)]
    pub id: Option<String>,
    /// Defaults to `(n - 1) × 5`.
    #[serde(default)]
    pub start_offset: Option<f64>,
    /// Units (elbows) processed.
    #[serde(default = "default_units")]
    pub units: u32,
    /// Cycles (welds) per unit.
    #[serde(default = "default_cycles_per_unit")]
    pub cycles_per_unit: u32,
    /// Pipe size half of the catalog key.
    #[serde(default)]
    pub pipe_size: Option<u32>,
    /// DR half of the catalog key.
    #[serde(default)]
    pub dr: Option<u32>,
    /// Explicit step sequence; overrides the catalog.
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

fn default_units() -> u32 {
    3
}

fn default_cycles_per_unit() -> u32 {
    2
}

/// A machine that ran on fallback steps because its key was not cataloged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackUse {
    /// Machine that received the fallback.
    pub resource_id: String,
    /// Key missing from the catalog.
    pub key: CatalogKey,
}

/// Resource configs resolved from a plan file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMachines {
    /// One config per machine entry, in file order.
    pub configs: Vec<ResourceConfig>,
    /// Machines resolved with fallback steps.
    pub fallbacks: Vec<FallbackUse>,
}

impl PlanConfig {
    /// Layered configuration source: defaults, then `path`, then environment.
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(PlanConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads a plan file.
    ///
    /// # Errors
    /// [`TimelineError::Config`](crate::TimelineError::Config) if the file or
    /// environment does not match the expected shape, including invalid
    /// step durations.
    pub fn load(path: impl AsRef<Path>) -> TimelineResult<Self> {
        Ok(Self::figment(path).extract()?)
    }

    /// Filter built from `overlap_pairs`; `None` when no pairs are listed.
    pub fn filter(&self) -> Option<CategoryFilter> {
        if self.overlap_pairs.is_empty() {
            return None;
        }
        Some(
            self.overlap_pairs
                .iter()
                .map(|(a, b)| (StepCategory::from_name(a), StepCategory::from_name(b)))
                .collect(),
        )
    }

    /// Reference weld catalog for the configured line-wide durations.
    pub fn catalog(&self) -> TimelineResult<StepCatalog> {
        StepCatalog::weld_reference(self.steps)
    }

    /// Planner configured with this file's detector, filter, and policy.
    pub fn planner(&self) -> LinePlanner {
        let planner = match self.detector {
            DetectorChoice::SweepLine => LinePlanner::new().with_detector(SweepLineDetector),
            DetectorChoice::Pairwise => LinePlanner::new().with_detector(PairwiseDetector),
        };
        let planner = planner.with_policy(self.policy);
        match self.filter() {
            Some(filter) => planner.with_filter(filter),
            None => planner,
        }
    }

    /// Turns machine entries into resource configs.
    ///
    /// Catalog misses fall back to the default weld-start/cooling pair and
    /// are listed in [`ResolvedMachines::fallbacks`]. A machine with neither
    /// steps nor a complete key gets an empty step sequence, which the
    /// planner rejects for that machine alone.
    ///
    /// # Errors
    /// [`TimelineError::InvalidDuration`](crate::TimelineError::InvalidDuration)
    /// if the line-wide durations are not positive.
    pub fn resource_configs(&self, catalog: &StepCatalog) -> TimelineResult<ResolvedMachines> {
        let fallback = self.steps.fallback_steps()?;
        let mut configs = Vec::with_capacity(self.machines.len());
        let mut fallbacks = Vec::new();

        for (i, machine) in self.machines.iter().enumerate() {
            let number = i + 1;
            let id = machine
                .id
                .clone()
                .unwrap_or_else(|| format!("Machine {number}"));

            let steps = match (machine.steps.is_empty(), machine.pipe_size, machine.dr) {
                (false, _, _) => machine.steps.clone(),
                (true, Some(pipe_size), Some(dr)) => {
                    let key = CatalogKey::new(pipe_size, dr);
                    let outcome = catalog.lookup_or(key, fallback.clone());
                    if outcome.is_miss() {
                        fallbacks.push(FallbackUse {
                            resource_id: id.clone(),
                            key,
                        });
                    }
                    outcome.into_steps()
                }
                _ => Vec::new(),
            };

            let mut config = ResourceConfig::weld_machine(number, steps)
                .with_units(machine.units)
                .with_cycles_per_unit(machine.cycles_per_unit);
            config.id = id;
            if let Some(offset) = machine.start_offset {
                config = config.with_start_offset(offset);
            }
            configs.push(config);
        }

        Ok(ResolvedMachines { configs, fallbacks })
    }
}

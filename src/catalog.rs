//! Step catalog: process parameters → step sequence.
//!
//! A catalog is static data injected into the pipeline. A lookup miss is a
//! designated, recoverable outcome: the caller supplies fallback steps and
//! the run continues.
//!
//! # Weld reference table
//!
//! [`StepCatalog::weld_reference`] builds the elbow-weld table keyed by
//! (pipe size, DR). Each entry expands to `Set up, Weld start, Stamping,
//! Cooling`, where set-up and stamping come from line-wide settings and
//! weld start / cooling come from the table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

use crate::error::{TimelineError, TimelineResult};
use crate::models::StepSpec;

/// Weld start used when a (pipe size, DR) pair is not in the table.
pub const FALLBACK_WELD_START: f64 = 10.0;
/// Cooling used when a (pipe size, DR) pair is not in the table.
pub const FALLBACK_COOLING: f64 = 10.0;

/// (pipe size, DR, weld start, cooling), minutes.
const WELD_TABLE: [(u32, u32, f64, f64); 20] = [
    (16, 7, 13.3, 24.0),
    (16, 9, 37.24, 20.0),
    (16, 11, 9.31, 16.0),
    (16, 13, 6.65, 13.0),
    (18, 7, 1.33, 27.0),
    (18, 9, 11.97, 22.0),
    (18, 11, 9.31, 20.0),
    (18, 13, 7.98, 15.0),
    (20, 7, 15.96, 30.0),
    (20, 9, 13.3, 24.0),
    (20, 11, 10.64, 20.0),
    (20, 13, 9.31, 16.0),
    (24, 7, 19.95, 36.0),
    (24, 9, 15.96, 29.0),
    (24, 11, 13.3, 24.0),
    (24, 13, 10.64, 20.0),
    (30, 7, 19.95, 32.0),
    (30, 9, 15.96, 30.0),
    (30, 11, 13.3, 24.0),
    (30, 17, 10.64, 19.0),
];

/// Process-parameter key: a pair of physical dimensions.
///
/// For the weld line, `primary` is the pipe size and `secondary` the DR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CatalogKey {
    /// First dimension (pipe size on the weld line).
    pub primary: u32,
    /// Second dimension (DR on the weld line).
    pub secondary: u32,
}

impl CatalogKey {
    /// Creates a key.
    pub fn new(primary: u32, secondary: u32) -> Self {
        Self { primary, secondary }
    }
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.primary, self.secondary)
    }
}

/// Line-wide durations shared by every weld machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeldStepDurations {
    /// Set-up duration.
    pub setup: f64,
    /// Stamping duration.
    pub stamping: f64,
}

impl Default for WeldStepDurations {
    fn default() -> Self {
        Self {
            setup: 5.0,
            stamping: 3.0,
        }
    }
}

impl WeldStepDurations {
    /// Builds one weld cycle: `Set up, Weld start, Stamping, Cooling`.
    pub fn steps(&self, weld_start: f64, cooling: f64) -> TimelineResult<Vec<StepSpec>> {
        Ok(vec![
            StepSpec::new("Set up", self.setup)?,
            StepSpec::new("Weld start", weld_start)?,
            StepSpec::new("Stamping", self.stamping)?,
            StepSpec::new("Cooling", cooling)?,
        ])
    }

    /// Weld cycle with the fallback weld-start and cooling durations.
    pub fn fallback_steps(&self) -> TimelineResult<Vec<StepSpec>> {
        self.steps(FALLBACK_WELD_START, FALLBACK_COOLING)
    }
}

/// Outcome of a lookup that never fails.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogLookup {
    /// Entry found.
    Hit(Vec<StepSpec>),
    /// No entry; carries the caller's fallback.
    Miss {
        /// Key that had no entry.
        key: CatalogKey,
        /// Steps supplied by the caller.
        fallback: Vec<StepSpec>,
    },
}

impl CatalogLookup {
    /// The steps to use, whether found or substituted.
    pub fn steps(&self) -> &[StepSpec] {
        match self {
            Self::Hit(steps) => steps,
            Self::Miss { fallback, .. } => fallback,
        }
    }

    /// Consumes the outcome, returning the steps to use.
    pub fn into_steps(self) -> Vec<StepSpec> {
        match self {
            Self::Hit(steps) => steps,
            Self::Miss { fallback, .. } => fallback,
        }
    }

    /// Whether the fallback was substituted.
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss { .. })
    }
}

/// Static mapping from [`CatalogKey`] to a step sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepCatalog {
    entries: BTreeMap<CatalogKey, Vec<StepSpec>>,
}

impl StepCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the elbow-weld reference catalog.
    ///
    /// # Errors
    /// [`TimelineError::InvalidDuration`] if a line-wide duration is not positive.
    pub fn weld_reference(durations: WeldStepDurations) -> TimelineResult<Self> {
        let mut catalog = Self::new();
        for (pipe_size, dr, weld_start, cooling) in WELD_TABLE {
            catalog.insert(
                CatalogKey::new(pipe_size, dr),
                durations.steps(weld_start, cooling)?,
            );
        }
        Ok(catalog)
    }

    /// Adds an entry.
    pub fn with_entry(mut self, key: CatalogKey, steps: Vec<StepSpec>) -> Self {
        self.insert(key, steps);
        self
    }

    /// Inserts or replaces an entry.
    pub fn insert(&mut self, key: CatalogKey, steps: Vec<StepSpec>) {
        self.entries.insert(key, steps);
    }

    /// Looks up the step sequence for `key`.
    ///
    /// # Errors
    /// [`TimelineError::LookupMiss`] if there is no entry.
    pub fn lookup(&self, key: CatalogKey) -> TimelineResult<&[StepSpec]> {
        self.entries
            .get(&key)
            .map(Vec::as_slice)
            .ok_or(TimelineError::LookupMiss { key })
    }

    /// Looks up `key`, substituting `fallback` on a miss.
    pub fn lookup_or(&self, key: CatalogKey, fallback: Vec<StepSpec>) -> CatalogLookup {
        match self.lookup(key) {
            Ok(steps) => CatalogLookup::Hit(steps.to_vec()),
            Err(_) => {
                warn!(%key, "no catalog entry, using fallback steps");
                CatalogLookup::Miss { key, fallback }
            }
        }
    }

    /// Known keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = CatalogKey> + '_ {
        self.entries.keys().copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StepCategory;

    fn reference() -> StepCatalog {
        StepCatalog::weld_reference(WeldStepDurations::default()).unwrap()
    }

    #[test]
    fn test_weld_reference_entries() {
        let catalog = reference();
        assert_eq!(catalog.len(), 20);

        let steps = catalog.lookup(CatalogKey::new(16, 9)).unwrap();
        let names: Vec<&str> = steps.iter().map(StepSpec::name).collect();
        assert_eq!(names, vec!["Set up", "Weld start", "Stamping", "Cooling"]);
        assert!((steps[0].duration() - 5.0).abs() < 1e-10);
        assert!((steps[1].duration() - 37.24).abs() < 1e-10);
        assert!((steps[2].duration() - 3.0).abs() < 1e-10);
        assert!((steps[3].duration() - 20.0).abs() < 1e-10);
        assert_eq!(steps[2].category(), &StepCategory::Stamping);
    }

    #[test]
    fn test_lookup_miss() {
        let catalog = reference();
        let err = catalog.lookup(CatalogKey::new(99, 99)).unwrap_err();
        assert!(matches!(
            err,
            TimelineError::LookupMiss { key } if key == CatalogKey::new(99, 99)
        ));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_lookup_or_substitutes_fallback() {
        let catalog = reference();
        let durations = WeldStepDurations::default();
        let outcome = catalog.lookup_or(
            CatalogKey::new(99, 99),
            durations.fallback_steps().unwrap(),
        );
        assert!(outcome.is_miss());
        assert!((outcome.steps()[1].duration() - FALLBACK_WELD_START).abs() < 1e-10);
        assert!((outcome.steps()[3].duration() - FALLBACK_COOLING).abs() < 1e-10);

        let hit = catalog.lookup_or(CatalogKey::new(30, 17), Vec::new());
        assert!(!hit.is_miss());
        assert_eq!(hit.into_steps().len(), 4);
    }

    #[test]
    fn test_reference_rejects_bad_line_durations() {
        let bad = WeldStepDurations {
            setup: 0.0,
            stamping: 3.0,
        };
        assert!(StepCatalog::weld_reference(bad).is_err());
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = StepCatalog::new().with_entry(
            CatalogKey::new(1, 2),
            vec![StepSpec::new("Work", 4.0).unwrap()],
        );
        assert_eq!(catalog.keys().collect::<Vec<_>>(), vec![CatalogKey::new(1, 2)]);
        assert!(!catalog.is_empty());
        assert!(StepCatalog::new().is_empty());
    }
}

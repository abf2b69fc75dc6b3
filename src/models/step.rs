//! Step model.
//!
//! A step is one named, fixed-duration piece of work inside a production
//! cycle. Its category is resolved once from the name when the step is
//! built, so classification never has to re-inspect names later.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{TimelineError, TimelineResult};

/// Step classification used for overlap filtering and reporting.
///
/// Categories order by declaration, which gives overlap kinds a stable
/// canonical form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StepCategory {
    /// Operator-bound preparation (fixturing, alignment).
    Setup,
    /// Weld start / heating phase.
    Weld,
    /// Operator-bound stamping.
    Stamping,
    /// Cooling under pressure.
    Cooling,
    /// Idle time inserted by remediation. Never takes part in overlap
    /// detection, and never resolved from a step name.
    Wait,
    /// Domain-specific category, keyed by the step name.
    Custom(String),
}

impl StepCategory {
    /// Resolves a category from a step name.
    ///
    /// Matching ignores case, spaces, hyphens, and underscores, so
    /// "Set up", "setup" and "SET_UP" all resolve to [`StepCategory::Setup`].
    /// Unknown names become [`StepCategory::Custom`] with the trimmed name.
    /// A user step named "Wait" or "Idle" is still work and resolves to
    /// `Custom`; only [`StepCategory::Wait`] set explicitly is skipped.
    pub fn from_name(name: &str) -> Self {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "setup" => Self::Setup,
            "weld" | "weldstart" => Self::Weld,
            "stamp" | "stamping" => Self::Stamping,
            "cool" | "cooling" => Self::Cooling,
            _ => Self::Custom(name.trim().to_string()),
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        match self {
            Self::Setup => "Set up",
            Self::Weld => "Weld start",
            Self::Stamping => "Stamping",
            Self::Cooling => "Cooling",
            Self::Wait => "Wait",
            Self::Custom(name) => name,
        }
    }

    /// Whether intervals of this category can overlap with anything.
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Wait)
    }
}

impl fmt::Display for StepCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named step with a strictly positive duration.
///
/// Durations are in plan time units (minutes throughout the weld catalog).
/// The only way to obtain a `StepSpec` is through a validating constructor,
/// including deserialization, so zero-width intervals can never reach the
/// overlap detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StepSpecDef")]
pub struct StepSpec {
    name: String,
    category: StepCategory,
    duration: f64,
}

#[derive(Deserialize)]
struct StepSpecDef {
    name: String,
    duration: f64,
    #[serde(default)]
    category: Option<StepCategory>,
}

impl TryFrom<StepSpecDef> for StepSpec {
    type Error = TimelineError;

    fn try_from(def: StepSpecDef) -> TimelineResult<Self> {
        let spec = Self::new(def.name, def.duration)?;
        Ok(match def.category {
            Some(category) => spec.with_category(category),
            None => spec,
        })
    }
}

impl StepSpec {
    /// Creates a step, resolving its category from the name.
    ///
    /// # Errors
    /// [`TimelineError::InvalidDuration`] if `duration` is not a finite
    /// positive number.
    pub fn new(name: impl Into<String>, duration: f64) -> TimelineResult<Self> {
        let name = name.into();
        if !(duration.is_finite() && duration > 0.0) {
            return Err(TimelineError::InvalidDuration {
                step: name,
                duration,
            });
        }
        let category = StepCategory::from_name(&name);
        Ok(Self {
            name,
            category,
            duration,
        })
    }

    /// Overrides the resolved category.
    pub fn with_category(mut self, category: StepCategory) -> Self {
        self.category = category;
        self
    }

    /// Idle step appended by remediation.
    pub(crate) fn wait(duration: f64) -> TimelineResult<Self> {
        Ok(Self::new("Wait", duration)?.with_category(StepCategory::Wait))
    }

    /// Step name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Step category.
    pub fn category(&self) -> &StepCategory {
        &self.category
    }

    /// Step duration.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_name() {
        assert_eq!(StepCategory::from_name("Set up"), StepCategory::Setup);
        assert_eq!(StepCategory::from_name("setup"), StepCategory::Setup);
        assert_eq!(StepCategory::from_name("SET_UP"), StepCategory::Setup);
        assert_eq!(StepCategory::from_name("Weld start"), StepCategory::Weld);
        assert_eq!(StepCategory::from_name("Stamping"), StepCategory::Stamping);
        assert_eq!(StepCategory::from_name("Cooling"), StepCategory::Cooling);
        assert_eq!(
            StepCategory::from_name(" Work "),
            StepCategory::Custom("Work".into())
        );
    }

    #[test]
    fn test_wait_is_never_resolved_from_name() {
        for name in ["Wait", "wait", "Idle", "IDLE"] {
            let category = StepCategory::from_name(name);
            assert_eq!(category, StepCategory::Custom(name.into()));
            assert!(!category.is_idle());
        }
        let inserted = StepSpec::wait(6.0).unwrap();
        assert_eq!(inserted.name(), "Wait");
        assert!(inserted.category().is_idle());
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(StepCategory::Setup.to_string(), "Set up");
        assert_eq!(StepCategory::Custom("Deburr".into()).label(), "Deburr");
        assert!(StepCategory::Wait.is_idle());
        assert!(!StepCategory::Stamping.is_idle());
    }

    #[test]
    fn test_step_spec_valid() {
        let s = StepSpec::new("Set up", 5.0).unwrap();
        assert_eq!(s.name(), "Set up");
        assert_eq!(s.category(), &StepCategory::Setup);
        assert!((s.duration() - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_step_spec_rejects_non_positive() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = StepSpec::new("Set up", bad).unwrap_err();
            assert!(matches!(err, TimelineError::InvalidDuration { .. }));
        }
    }

    #[test]
    fn test_step_spec_category_override() {
        let s = StepSpec::new("Changeover", 4.0)
            .unwrap()
            .with_category(StepCategory::Setup);
        assert_eq!(s.category(), &StepCategory::Setup);
        assert_eq!(s.name(), "Changeover");
    }

    #[test]
    fn test_step_spec_deserialize_validates() {
        let ok: StepSpec = serde_json::from_str(r#"{"name":"Stamping","duration":3}"#).unwrap();
        assert_eq!(ok.category(), &StepCategory::Stamping);

        let bad = serde_json::from_str::<StepSpec>(r#"{"name":"Stamping","duration":0}"#);
        assert!(bad.is_err());

        let tagged: StepSpec = serde_json::from_str(
            r#"{"name":"Load","duration":2,"category":"Setup"}"#,
        )
        .unwrap();
        assert_eq!(tagged.category(), &StepCategory::Setup);
    }
}

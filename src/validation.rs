//! Resource configuration checks.
//!
//! The rules for a single config live here; [`ResourceConfig::validate`]
//! reports the first one that fails, and [`validate_configs`] reports every
//! issue of a whole batch at once:
//! - Duplicate resource IDs
//! - Negative or non-finite start offsets and waits
//! - Zero unit or cycle counts
//! - Empty step sequences
//! - Timelines whose end is not a finite time

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::ResourceConfig;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Offending resource.
    pub resource_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Two configs share the same resource ID.
    DuplicateId,
    /// Start offset is negative or not finite.
    InvalidOffset,
    /// Unit count or cycles per unit is zero.
    InvalidCount,
    /// The step sequence is empty.
    EmptySteps,
    /// Wait is negative or not finite.
    InvalidWait,
    /// The last interval would end beyond the largest finite time.
    UnboundedHorizon,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, resource_id: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            resource_id: resource_id.to_string(),
            message: message.into(),
        }
    }
}

/// Every rule a single config breaks, in check order.
pub(crate) fn config_issues(c: &ResourceConfig) -> Vec<ValidationError> {
    let mut issues = Vec::new();

    let offset_ok = c.start_offset.is_finite() && c.start_offset >= 0.0;
    if !offset_ok {
        issues.push(ValidationError::new(
            ValidationErrorKind::InvalidOffset,
            &c.id,
            format!("start offset must be a non-negative number, got {}", c.start_offset),
        ));
    }
    if c.unit_count == 0 {
        issues.push(ValidationError::new(
            ValidationErrorKind::InvalidCount,
            &c.id,
            "unit count must be at least 1",
        ));
    }
    if c.cycles_per_unit == 0 {
        issues.push(ValidationError::new(
            ValidationErrorKind::InvalidCount,
            &c.id,
            "cycles per unit must be at least 1",
        ));
    }
    if c.steps.is_empty() {
        issues.push(ValidationError::new(
            ValidationErrorKind::EmptySteps,
            &c.id,
            "step sequence is empty",
        ));
    }
    let wait_ok = c.wait_after_cycle.is_finite() && c.wait_after_cycle >= 0.0;
    if !wait_ok {
        issues.push(ValidationError::new(
            ValidationErrorKind::InvalidWait,
            &c.id,
            format!("wait must be a non-negative number, got {}", c.wait_after_cycle),
        ));
    }

    if issues.is_empty() {
        let horizon = c.start_offset
            + c.total_cycles() as f64 * (c.cycle_duration() + c.wait_after_cycle);
        if !horizon.is_finite() {
            issues.push(ValidationError::new(
                ValidationErrorKind::UnboundedHorizon,
                &c.id,
                "timeline end exceeds the largest representable time",
            ));
        }
    }

    issues
}

/// Validates a batch of configs.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with every detected issue.
pub fn validate_configs(configs: &[ResourceConfig]) -> ValidationResult {
    let mut errors = Vec::new();

    for index in duplicate_indices(configs) {
        errors.push(ValidationError::new(
            ValidationErrorKind::DuplicateId,
            &configs[index].id,
            format!("duplicate resource id '{}'", configs[index].id),
        ));
    }

    for c in configs {
        errors.extend(config_issues(c));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Positions of configs whose ID already appeared earlier in the slice.
///
/// The first occurrence of an ID is kept; later ones are reported.
pub fn duplicate_indices(configs: &[ResourceConfig]) -> Vec<usize> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for (i, c) in configs.iter().enumerate() {
        if !seen.insert(c.id.as_str()) {
            duplicates.push(i);
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StepSpec;

    fn steps() -> Vec<StepSpec> {
        vec![StepSpec::new("Set up", 5.0).unwrap()]
    }

    #[test]
    fn test_valid_batch() {
        let configs = vec![
            ResourceConfig::new("M1", steps()),
            ResourceConfig::new("M2", steps()).with_start_offset(5.0),
        ];
        assert!(validate_configs(&configs).is_ok());
        assert!(validate_configs(&[]).is_ok());
    }

    #[test]
    fn test_duplicate_id() {
        let configs = vec![
            ResourceConfig::new("M1", steps()),
            ResourceConfig::new("M2", steps()),
            ResourceConfig::new("M1", steps()),
        ];
        assert_eq!(duplicate_indices(&configs), vec![2]);

        let errors = validate_configs(&configs).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateId);
        assert_eq!(errors[0].resource_id, "M1");
    }

    #[test]
    fn test_multiple_errors() {
        let configs = vec![
            ResourceConfig::new("empty", Vec::new()),
            ResourceConfig::new("zero", steps()).with_units(0),
            ResourceConfig::new("late", steps())
                .with_start_offset(-5.0)
                .with_wait_after_cycle(-1.0),
        ];
        let errors = validate_configs(&configs).unwrap_err();
        let kinds: Vec<ValidationErrorKind> = errors.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ValidationErrorKind::EmptySteps,
                ValidationErrorKind::InvalidCount,
                ValidationErrorKind::InvalidOffset,
                ValidationErrorKind::InvalidWait,
            ]
        );
    }

    #[test]
    fn test_unbounded_horizon() {
        let huge = vec![StepSpec::new("Work", f64::MAX / 1.5).unwrap()];
        let config = ResourceConfig::new("M1", huge).with_units(3);
        let errors = validate_configs(&[config.clone()]).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::UnboundedHorizon);

        // Same rules back the single-config check.
        assert!(config.validate().is_err());
        assert!(config.with_units(1).validate().is_ok());
    }

    #[test]
    fn test_single_config_reports_first_issue() {
        let config = ResourceConfig::new("M1", Vec::new()).with_units(0);
        let issues = config_issues(&config);
        assert_eq!(issues.len(), 2);
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration for resource 'M1': unit count must be at least 1"
        );
    }
}

//! Timeline generation.
//!
//! # Algorithm
//!
//! A single fold over `unit × cycle × step` with a cursor `t` starting at
//! the resource's start offset. Every step emits `[t, t + duration)` and
//! advances `t`, so intervals are gap-free and never concurrent on one
//! resource. When a wait is configured, a `Wait` interval follows each
//! cycle's final step.
//!
//! # Complexity
//! O(u * c * s) per resource. Resources are independent and are generated
//! in parallel by [`generate_all`].

use rayon::prelude::*;
use tracing::debug;

use crate::error::{TimelineError, TimelineResult};
use crate::models::{Interval, ResourceConfig, StepSpec, Timeline};

/// Generates the timeline of one resource.
///
/// # Errors
/// [`TimelineError::InvalidConfig`] if the config fails validation, or if a
/// step is too short to advance the clock at its start time; nothing is
/// returned in either case.
///
/// # Example
///
/// ```
/// use u_timeline::models::{ResourceConfig, StepSpec};
/// use u_timeline::timeline::generate;
///
/// let steps = vec![
///     StepSpec::new("Setup", 10.0).unwrap(),
///     StepSpec::new("Work", 20.0).unwrap(),
/// ];
/// let timeline = generate(&ResourceConfig::new("A", steps).with_units(2)).unwrap();
/// assert_eq!(timeline.len(), 4);
/// assert_eq!(timeline.total_runtime(), 60.0);
/// ```
pub fn generate(config: &ResourceConfig) -> TimelineResult<Timeline> {
    config.validate()?;

    let wait = if config.wait_after_cycle > 0.0 {
        Some(StepSpec::wait(config.wait_after_cycle)?)
    } else {
        None
    };

    let per_cycle = config.steps.len() + usize::from(wait.is_some());
    let capacity = usize::try_from(config.total_cycles())
        .unwrap_or(usize::MAX)
        .saturating_mul(per_cycle);

    let mut timeline = Timeline::new(&config.id, config.start_offset);
    timeline.intervals.reserve(capacity.min(1 << 16));

    let mut t = config.start_offset;
    for unit_index in 1..=config.unit_count {
        for cycle_index in 1..=config.cycles_per_unit {
            for step in config.steps.iter().chain(wait.iter()) {
                let end = t + step.duration();
                if end <= t {
                    return Err(TimelineError::invalid_config(
                        &config.id,
                        format!("step '{}' does not advance time at {t}", step.name()),
                    ));
                }
                timeline.intervals.push(Interval {
                    resource_id: config.id.clone(),
                    unit_index,
                    cycle_index,
                    step_name: step.name().to_string(),
                    category: step.category().clone(),
                    start: t,
                    end,
                    duration: step.duration(),
                });
                t = end;
            }
        }
    }

    debug!(
        resource = %config.id,
        intervals = timeline.len(),
        runtime = timeline.total_runtime(),
        "generated timeline"
    );
    Ok(timeline)
}

/// Generates every resource's timeline in parallel.
///
/// Results keep input order. A failing config yields an `Err` in its slot
/// without affecting the others.
pub fn generate_all(configs: &[ResourceConfig]) -> Vec<TimelineResult<Timeline>> {
    configs.par_iter().map(generate).collect()
}

//! Per-resource step timelines and cross-resource overlap analysis.
//!
//! Each resource (a machine, a station) runs a fixed step sequence for a
//! number of units and cycles from its own start offset. This crate lays
//! those sequences out on a shared clock, finds every interval where two
//! resources are busy at once, summarizes utilization, and suggests waits
//! that reduce contention.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `StepSpec`, `ResourceConfig`, `Interval`,
//!   `Timeline`, `Schedule`, `OverlapRecord`
//! - **`catalog`**: Process-parameter → step-sequence lookup with fallback
//! - **`timeline`**: Timeline generation
//! - **`overlap`**: Pairwise and sweep-line overlap detection, category filters
//! - **`metrics`**: Runtime, downtime, overlap totals, utilization grade
//! - **`remediation`**: Greedy wait suggestion
//! - **`planner`**: End-to-end pipeline
//! - **`config`**: Plan file loading
//! - **`validation`**: Batch config checks
//!
//! # Conventions
//!
//! Times are minutes as `f64`. Intervals are half-open `[start, end)`, so
//! intervals that only touch at a boundary never overlap.

pub mod catalog;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod overlap;
pub mod planner;
pub mod remediation;
pub mod timeline;
pub mod validation;

pub use error::{TimelineError, TimelineResult};

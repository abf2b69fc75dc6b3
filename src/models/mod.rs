//! Timeline domain models.
//!
//! Plain value types shared by every stage of the pipeline. None of them
//! hold back-references or shared mutable state.
//!
//! # Domain Mappings
//!
//! | u-timeline | Weld line | Packaging line |
//! |------------|-----------|----------------|
//! | ResourceConfig | Welding machine | Filler |
//! | unit | Elbow | Pallet |
//! | cycle | Weld on the elbow | Case |
//! | StepSpec | Set up / Weld start / Stamping / Cooling | Load / Fill / Seal |

mod overlap;
mod resource;
mod schedule;
mod step;

pub use overlap::{OverlapKind, OverlapRecord};
pub use resource::{ResourceConfig, DEFAULT_START_STAGGER};
pub use schedule::{Interval, Schedule, Timeline};
pub use step::{StepCategory, StepSpec};

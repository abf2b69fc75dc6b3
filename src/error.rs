//! Error types for timeline construction and plan loading.
//!
//! Only construction can fail. Once a [`Schedule`](crate::models::Schedule)
//! exists, overlap detection and aggregation are total functions.

use thiserror::Error;

use crate::catalog::CatalogKey;

/// Result type for timeline operations.
pub type TimelineResult<T> = Result<T, TimelineError>;

/// Errors raised while building step specs, resource configs, or plans.
#[derive(Error, Debug)]
pub enum TimelineError {
    /// A step duration was zero, negative, or not finite.
    #[error("step '{step}' has invalid duration {duration}; durations must be positive")]
    InvalidDuration { step: String, duration: f64 },

    /// A resource configuration is structurally unusable.
    #[error("invalid configuration for resource '{resource_id}': {reason}")]
    InvalidConfig { resource_id: String, reason: String },

    /// No catalog entry exists for the given process parameters.
    ///
    /// Recoverable: callers substitute fallback steps and continue.
    #[error("no catalog entry for {key}")]
    LookupMiss { key: CatalogKey },

    /// The plan file or environment could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl TimelineError {
    pub(crate) fn invalid_config(resource_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            resource_id: resource_id.into(),
            reason: reason.into(),
        }
    }

    /// Whether processing can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::LookupMiss { .. })
    }
}

impl From<figment::Error> for TimelineError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

//! Error classification for the positioning engine
//!
//! Only faults are represented here. A request without receivers yields a
//! [`Prediction`](crate::api::Prediction) with absent coordinates, and
//! inconsistent range circles are absorbed by the intersection policy.

use crate::algorithms::projection::UtmZone;
use crate::ranging::{RangeError, SourceError};
use crate::utils::config::ConfigError;
use thiserror::Error;

/// Result type for positioning operations
pub type PositioningResult<T> = Result<T, PositioningError>;

/// Errors surfaced by the positioning engine
#[derive(Debug, Error)]
pub enum PositioningError {
    /// Malformed input such as a negative radius or an out-of-range coordinate
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Two planar points projected into different zones were combined
    #[error("Planar zone mismatch: expected zone {expected}, found {found}")]
    ZoneMismatch { expected: UtmZone, found: UtmZone },

    /// The injected range estimator failed; never retried here
    #[error("Range estimator unavailable: {0}")]
    RangeEstimatorUnavailable(#[from] RangeError),

    /// The observation source failed while loading receivers for a device
    #[error("Directory service unavailable: {0}")]
    DirectoryUnavailable(#[from] SourceError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PositioningError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        PositioningError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Whether the failure came from an external collaborator
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            PositioningError::RangeEstimatorUnavailable(_) | PositioningError::DirectoryUnavailable(_)
        )
    }
}

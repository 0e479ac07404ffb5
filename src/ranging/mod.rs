//! Collaborator seams: range estimation and observation lookup

pub mod error;
pub mod estimator;
pub mod source;

pub use error::{RangeError, RecoveryStrategy, SourceError};
pub use estimator::{PathLossModel, PathLossRangeEstimator, RangeEstimator};
pub use source::{InMemoryDirectory, ObservationSource};

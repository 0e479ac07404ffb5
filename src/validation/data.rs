//! Input validation for receiver observations and range estimates

use crate::core::{GeoPoint, RangeEstimate, ReceiverObservation};
use crate::validation::error::{PositioningError, PositioningResult};
use std::collections::HashSet;
use tracing::warn;

/// Check that a point carries finite, in-range geographic coordinates
pub fn validate_location(point: &GeoPoint) -> PositioningResult<()> {
    if !point.lat.is_finite() || !point.lon.is_finite() {
        return Err(PositioningError::invalid(format!("non-finite coordinate {:?}", point)));
    }
    if !(-90.0..=90.0).contains(&point.lat) {
        return Err(PositioningError::invalid(format!("latitude {} outside [-90, 90]", point.lat)));
    }
    if !(-180.0..=180.0).contains(&point.lon) {
        return Err(PositioningError::invalid(format!("longitude {} outside [-180, 180]", point.lon)));
    }
    Ok(())
}

/// Validates receiver data before it reaches the geometry
#[derive(Debug, Clone, Default)]
pub struct DataValidator;

impl DataValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_observation(&self, observation: &ReceiverObservation) -> PositioningResult<()> {
        validate_location(&observation.location).map_err(|e| match e {
            PositioningError::InvalidInput { reason } => {
                PositioningError::invalid(format!("receiver {}: {}", observation.id, reason))
            }
            other => other,
        })?;

        let features = &observation.features;
        for (name, value) in [
            ("rssi", features.rssi),
            ("snr", features.snr),
            ("frequency", features.frequency),
        ] {
            if !value.is_finite() {
                return Err(PositioningError::invalid(format!(
                    "receiver {}: {} is not finite",
                    observation.id, name
                )));
            }
        }

        Ok(())
    }

    /// Validate a batch; duplicate receiver ids are reported but accepted
    pub fn validate_observations(&self, observations: &[ReceiverObservation]) -> PositioningResult<()> {
        let mut seen = HashSet::new();
        for observation in observations {
            self.validate_observation(observation)?;
            if !seen.insert(observation.id.as_str()) {
                warn!(receiver = %observation.id, "duplicate receiver in observation set");
            }
        }
        Ok(())
    }

    /// A range must be a finite, non-negative distance
    pub fn validate_range(&self, range: &RangeEstimate) -> PositioningResult<()> {
        if !range.distance_m.is_finite() || range.distance_m < 0.0 {
            return Err(PositioningError::invalid(format!(
                "receiver {}: range {} must be finite and non-negative",
                range.receiver.id, range.distance_m
            )));
        }
        Ok(())
    }
}

//! Range estimation capability consumed by the engine

use crate::core::SignalFeatures;
use crate::ranging::RangeError;
use serde::{Deserialize, Serialize};

/// Turns the signal report of one receiver into a distance estimate (m).
///
/// The engine calls this once per receiver per request and never retries.
/// Any `Fn(&SignalFeatures) -> Result<f64, RangeError>` closure qualifies.
pub trait RangeEstimator: Send + Sync {
    fn estimate_range(&self, features: &SignalFeatures) -> Result<f64, RangeError>;
}

impl<F> RangeEstimator for F
where
    F: Fn(&SignalFeatures) -> Result<f64, RangeError> + Send + Sync,
{
    fn estimate_range(&self, features: &SignalFeatures) -> Result<f64, RangeError> {
        self(features)
    }
}

/// Log-distance path-loss model parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathLossModel {
    /// RSSI at the reference distance (dBm)
    pub reference_rssi_dbm: f64,
    /// Reference distance (m)
    pub reference_distance_m: f64,
    /// Path-loss exponent (2.0 free space, higher in clutter)
    pub path_loss_exponent: f64,
    /// Upper bound on any returned range (m)
    pub max_range_m: f64,
}

impl Default for PathLossModel {
    fn default() -> Self {
        Self {
            reference_rssi_dbm: -40.0,
            reference_distance_m: 1.0,
            path_loss_exponent: 2.7,
            max_range_m: 50_000.0,
        }
    }
}

/// Range estimator based on the log-distance path-loss model:
/// `d = d0 * 10^((rssi_d0 - rssi) / (10 * n))`
#[derive(Debug, Clone, Default)]
pub struct PathLossRangeEstimator {
    model: PathLossModel,
}

impl PathLossRangeEstimator {
    pub fn new(model: PathLossModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &PathLossModel {
        &self.model
    }
}

impl RangeEstimator for PathLossRangeEstimator {
    fn estimate_range(&self, features: &SignalFeatures) -> Result<f64, RangeError> {
        if !features.rssi.is_finite() {
            return Err(RangeError::InvalidFeatures {
                parameter: "rssi".to_string(),
                value: features.rssi.to_string(),
            });
        }
        if self.model.path_loss_exponent <= 0.0 || self.model.reference_distance_m <= 0.0 {
            return Err(RangeError::ModelUnavailable {
                details: format!("degenerate path-loss parameters {:?}", self.model),
            });
        }

        let exponent =
            (self.model.reference_rssi_dbm - features.rssi) / (10.0 * self.model.path_loss_exponent);
        let distance = self.model.reference_distance_m * 10.0_f64.powf(exponent);

        if !distance.is_finite() {
            return Err(RangeError::InvalidRange { distance_m: distance });
        }
        Ok(distance.min(self.model.max_range_m))
    }
}

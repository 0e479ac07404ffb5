//! Request-facing types: the prediction result and model selection

use crate::core::GeoPoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Positioning models, from most to least receivers required
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositioningModel {
    /// Location of the first-ranked receiver
    NearestNeighbor,
    /// Geodesic midpoint of the two first-ranked receivers
    Midpoint,
    /// Range-circle intersection over three receivers
    Trilateration,
}

impl PositioningModel {
    /// Receivers needed before this model can run
    pub fn min_receivers(&self) -> usize {
        match self {
            PositioningModel::NearestNeighbor => 1,
            PositioningModel::Midpoint => 2,
            PositioningModel::Trilateration => 3,
        }
    }

    /// The next model down when receivers are missing
    pub fn reduced(&self) -> Option<PositioningModel> {
        match self {
            PositioningModel::Trilateration => Some(PositioningModel::Midpoint),
            PositioningModel::Midpoint => Some(PositioningModel::NearestNeighbor),
            PositioningModel::NearestNeighbor => None,
        }
    }
}

impl fmt::Display for PositioningModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PositioningModel::NearestNeighbor => "nearest-neighbor",
            PositioningModel::Midpoint => "midpoint",
            PositioningModel::Trilateration => "trilateration",
        };
        f.write_str(name)
    }
}

/// Position prediction for one device.
///
/// `lat`/`lng` are absent when no position could be derived, for example when
/// no receiver heard the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub device_id: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub confidence: Option<f64>,
    /// Model that produced the coordinates
    pub model: Option<PositioningModel>,
}

impl Prediction {
    pub fn located(device_id: impl Into<String>, position: GeoPoint, model: PositioningModel) -> Self {
        Self {
            device_id: device_id.into(),
            lat: Some(position.lat),
            lng: Some(position.lon),
            confidence: None,
            model: Some(model),
        }
    }

    /// Prediction carrying no coordinates
    pub fn unlocated(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            lat: None,
            lng: None,
            confidence: None,
            model: None,
        }
    }

    pub fn position(&self) -> Option<GeoPoint> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        }
    }

    pub fn is_located(&self) -> bool {
        self.position().is_some()
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.position(), self.model) {
            (Some(p), Some(model)) => write!(f, "{}: {} via {}", self.device_id, p, model),
            (Some(p), None) => write!(f, "{}: {}", self.device_id, p),
            (None, _) => write!(f, "{}: no position", self.device_id),
        }
    }
}

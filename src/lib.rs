//! Hotspot Trilateration
//!
//! Position estimation for LoRa devices from the receivers ("hotspots") that
//! heard an uplink. Signal reports are turned into range circles by an
//! injected [`RangeEstimator`](ranging::RangeEstimator), the circles are
//! intersected on a UTM plane, and a decision procedure reduces the
//! intersection points to one position. With fewer than three receivers the
//! engine falls back to the midpoint and nearest-neighbor models.

pub mod core;
pub mod algorithms;
pub mod ranging;
pub mod validation;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use core::{DataRate, GeoPoint, RangeEstimate, ReceiverObservation, SignalFeatures};
pub use algorithms::{
    ClassifiedIntersections, CircleIntersector, IntersectionClassifier, IntersectionResult, PositionEstimator,
    SignalOrdering, UtmProjector, UtmZone,
};
pub use ranging::{ObservationSource, PathLossRangeEstimator, RangeError, RangeEstimator, SourceError};
pub use validation::{PositioningError, PositioningResult};
pub use utils::{ConfigurationManager, EngineConfig};
pub use api::{PositioningEngine, PositioningModel, Prediction};

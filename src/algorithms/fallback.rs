//! Reduced models used when there are too few receivers to trilaterate

use crate::algorithms::geodesic;
use crate::core::{GeoPoint, ReceiverObservation};
use crate::validation::error::{PositioningError, PositioningResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Order in which receivers are ranked by RSSI
///
/// `Ascending` puts the most negative RSSI first. With dBm values that is the
/// weakest receiver; `Descending` ranks the strongest receiver first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalOrdering {
    #[default]
    Ascending,
    Descending,
}

impl SignalOrdering {
    pub fn compare(&self, a: &ReceiverObservation, b: &ReceiverObservation) -> Ordering {
        let ord = a.features.rssi.total_cmp(&b.features.rssi);
        match self {
            SignalOrdering::Ascending => ord,
            SignalOrdering::Descending => ord.reverse(),
        }
    }
}

/// Receivers ranked by signal, ties keeping input order
pub fn order_receivers(observations: &[ReceiverObservation], ordering: SignalOrdering) -> Vec<&ReceiverObservation> {
    let mut ranked: Vec<&ReceiverObservation> = observations.iter().collect();
    ranked.sort_by(|a, b| ordering.compare(a, b));
    ranked
}

/// Location of the first-ranked receiver, if any
pub fn nearest_neighbor(observations: &[ReceiverObservation], ordering: SignalOrdering) -> Option<GeoPoint> {
    observations
        .iter()
        .min_by(|a, b| ordering.compare(a, b))
        .map(|obs| obs.location)
}

/// Geodesic midpoint of the two first-ranked receivers
pub fn midpoint_model(observations: &[ReceiverObservation], ordering: SignalOrdering) -> PositioningResult<GeoPoint> {
    match order_receivers(observations, ordering).as_slice() {
        [first, second, ..] => Ok(geodesic::midpoint(&first.location, &second.location)),
        _ => Err(PositioningError::invalid(format!(
            "midpoint model needs at least 2 receivers, got {}",
            observations.len()
        ))),
    }
}

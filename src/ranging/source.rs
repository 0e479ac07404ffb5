//! Directory service seam: where receiver observations for a device come from

use crate::core::ReceiverObservation;
use crate::ranging::SourceError;
use std::collections::HashMap;

/// Provider of the receivers that heard a device's latest uplink
pub trait ObservationSource {
    /// Observations for `device_id`, fetched once per request
    fn observations(&self, device_id: &str) -> Result<Vec<ReceiverObservation>, SourceError>;
}

/// Observation source backed by a map, for tests and offline runs
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    devices: HashMap<String, Vec<ReceiverObservation>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the observations for a device, returning the ones it replaced
    pub fn insert(
        &mut self,
        device_id: impl Into<String>,
        observations: Vec<ReceiverObservation>,
    ) -> Option<Vec<ReceiverObservation>> {
        self.devices.insert(device_id.into(), observations)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl ObservationSource for InMemoryDirectory {
    fn observations(&self, device_id: &str) -> Result<Vec<ReceiverObservation>, SourceError> {
        self.devices
            .get(device_id)
            .cloned()
            .ok_or_else(|| SourceError::DeviceNotFound {
                device_id: device_id.to_string(),
            })
    }
}

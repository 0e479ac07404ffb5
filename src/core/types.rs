//! Core data types for the positioning system

use crate::validation::error::PositioningError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// LoRa data rate, e.g. `SF9BW125`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRate {
    /// Spreading factor (7-12)
    pub spreading_factor: u8,
    /// Channel bandwidth (kHz)
    pub bandwidth_khz: u16,
}

impl FromStr for DataRate {
    type Err = PositioningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PositioningError::InvalidInput {
            reason: format!("malformed data rate '{}'", s),
        };

        let upper = s.trim().to_ascii_uppercase();
        let rest = upper.strip_prefix("SF").ok_or_else(invalid)?;
        let (sf, bw) = rest.split_once("BW").ok_or_else(invalid)?;
        let spreading_factor: u8 = sf.parse().map_err(|_| invalid())?;
        let bandwidth_khz: u16 = bw.parse().map_err(|_| invalid())?;

        if !(7..=12).contains(&spreading_factor) {
            return Err(PositioningError::InvalidInput {
                reason: format!("spreading factor {} outside 7..=12", spreading_factor),
            });
        }

        Ok(Self {
            spreading_factor,
            bandwidth_khz,
        })
    }
}

impl fmt::Display for DataRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SF{}BW{}", self.spreading_factor, self.bandwidth_khz)
    }
}

/// Signal report of one receiver for one uplink
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalFeatures {
    /// Received signal strength (dBm)
    pub rssi: f64,
    /// Signal-to-noise ratio (dB)
    pub snr: f64,
    pub spreading_factor: u8,
    /// Carrier frequency (MHz)
    pub frequency: f64,
}

impl SignalFeatures {
    pub fn new(rssi: f64, snr: f64, spreading_factor: u8, frequency: f64) -> Self {
        Self {
            rssi,
            snr,
            spreading_factor,
            frequency,
        }
    }

    /// Build features from a raw report carrying a data-rate string
    pub fn from_report(rssi: f64, snr: f64, datarate: &str, frequency: f64) -> Result<Self, PositioningError> {
        let rate: DataRate = datarate.parse()?;
        Ok(Self::new(rssi, snr, rate.spreading_factor, frequency))
    }
}

/// A receiver ("hotspot") that overheard the transmission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiverObservation {
    pub id: String,
    pub location: GeoPoint,
    pub features: SignalFeatures,
}

impl ReceiverObservation {
    pub fn new(id: impl Into<String>, location: GeoPoint, features: SignalFeatures) -> Self {
        Self {
            id: id.into(),
            location,
            features,
        }
    }
}

/// Estimated distance between the device and one receiver
#[derive(Debug, Clone, PartialEq)]
pub struct RangeEstimate {
    pub receiver: ReceiverObservation,
    pub distance_m: f64,
}

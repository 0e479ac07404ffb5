//! Failure types for the external collaborators

use thiserror::Error;

/// Failure of the injected range estimator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeError {
    /// Model could not be loaded or did not respond
    #[error("Range model unavailable: {details}")]
    ModelUnavailable { details: String },
    /// Features outside what the model accepts
    #[error("Invalid signal features: {parameter} = {value}")]
    InvalidFeatures { parameter: String, value: String },
    /// Model produced a distance that is not a usable range
    #[error("Range model returned unusable distance {distance_m}")]
    InvalidRange { distance_m: f64 },
    /// Model backend did not answer in time
    #[error("Range model timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u32 },
}

/// Failure of the observation source (directory service)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// No record of the requested device
    #[error("Device {device_id} not found")]
    DeviceNotFound { device_id: String },
    /// Backend did not answer in time
    #[error("Directory timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u32 },
    /// Backend answered with something unusable
    #[error("Directory unavailable: {details}")]
    Unavailable { details: String },
}

/// Recovery hint for callers that own retry policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecoveryStrategy {
    /// Retry the request immediately
    Retry,
    /// Wait and then retry
    RetryWithDelay { delay_ms: u32 },
    /// Drop this request and continue with the next
    Skip,
    /// Fail permanently
    Fail,
}

impl RangeError {
    /// Recommended recovery for this error
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            RangeError::ModelUnavailable { .. } => RecoveryStrategy::RetryWithDelay { delay_ms: 1000 },
            RangeError::InvalidFeatures { .. } => RecoveryStrategy::Skip,
            RangeError::InvalidRange { .. } => RecoveryStrategy::Skip,
            RangeError::Timeout { .. } => RecoveryStrategy::Retry,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        !matches!(self.recovery_strategy(), RecoveryStrategy::Fail | RecoveryStrategy::Skip)
    }
}

impl SourceError {
    /// Recommended recovery for this error
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            SourceError::DeviceNotFound { .. } => RecoveryStrategy::Fail,
            SourceError::Timeout { .. } => RecoveryStrategy::RetryWithDelay { delay_ms: 500 },
            SourceError::Unavailable { .. } => RecoveryStrategy::RetryWithDelay { delay_ms: 2000 },
        }
    }

    pub fn is_recoverable(&self) -> bool {
        !matches!(self.recovery_strategy(), RecoveryStrategy::Fail | RecoveryStrategy::Skip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_error_display() {
        let err = RangeError::InvalidFeatures {
            parameter: "rssi".to_string(),
            value: "NaN".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid signal features: rssi = NaN");

        let err = RangeError::Timeout { timeout_ms: 250 };
        assert_eq!(err.to_string(), "Range model timeout after 250ms");
    }

    #[test]
    fn test_recovery_hints() {
        assert!(RangeError::Timeout { timeout_ms: 10 }.is_recoverable());
        assert!(!RangeError::InvalidRange { distance_m: -1.0 }.is_recoverable());

        let missing = SourceError::DeviceNotFound {
            device_id: "dev-1".to_string(),
        };
        assert_eq!(missing.recovery_strategy(), RecoveryStrategy::Fail);
        assert!(!missing.is_recoverable());
        assert!(SourceError::Timeout { timeout_ms: 100 }.is_recoverable());
    }
}

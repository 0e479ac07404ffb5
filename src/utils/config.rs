use crate::algorithms::fallback::SignalOrdering;
use crate::api::types::PositioningModel;
use crate::core::{DEFAULT_MERGE_TOLERANCE_M, DEFAULT_TANGENT_EPSILON_M};
use crate::ranging::PathLossModel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Tolerances above this merge points that are clearly distinct
const MERGE_TOLERANCE_WARN_M: f64 = 500.0;

/// Positioning engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Preferred model; reduced models take over when receivers are missing
    pub model: PositioningModel,
    /// Distance below which two candidate points are merged (meters)
    pub merge_tolerance_m: f64,
    /// How receivers are ranked by RSSI for the reduced models
    pub signal_ordering: SignalOrdering,
    /// Half-chord length below which two circles count as tangent (meters)
    pub tangent_epsilon_m: f64,
    /// Parameters of the reference range estimator
    #[serde(default)]
    pub path_loss: PathLossModel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: PositioningModel::Trilateration,
            merge_tolerance_m: DEFAULT_MERGE_TOLERANCE_M,
            signal_ordering: SignalOrdering::Ascending,
            tangent_epsilon_m: DEFAULT_TANGENT_EPSILON_M,
            path_loss: PathLossModel::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Invalid parameter value
    #[error("Invalid parameter {parameter} = {value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Configuration file I/O error
    #[error("I/O error: {message}")]
    IoError { message: String },
    /// JSON serialization/deserialization error
    #[error("Serialization error: {message}")]
    SerializationError { message: String },
}

/// Configuration validation result
#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ConfigError>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn into_result(self) -> Result<(), ConfigError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Loads, validates and adjusts the engine configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigurationManager {
    config: EngineConfig,
    config_file_path: Option<String>,
    is_modified: bool,
}

impl ConfigurationManager {
    /// Create a new configuration manager with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration manager and load from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    pub fn get_config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the whole configuration after validation
    pub fn update_config(&mut self, config: EngineConfig) -> Result<(), ConfigError> {
        Self::validate_config(&config).into_result()?;
        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;

        let config: EngineConfig = serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
            message: format!("Failed to parse config file '{}': {}", path_str, e),
        })?;

        Self::validate_config(&config).into_result()?;

        self.config = config;
        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = serde_json::to_string_pretty(&self.config).map_err(|e| ConfigError::SerializationError {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write config file '{}': {}", path_str, e),
        })?;

        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save to the currently loaded file path
    pub fn save(&mut self) -> Result<(), ConfigError> {
        match self.config_file_path.clone() {
            Some(path) => self.save_to_file(path),
            None => Err(ConfigError::IoError {
                message: "No file path set for saving configuration".to_string(),
            }),
        }
    }

    /// Check if configuration has been modified since last load or save
    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    // Runtime parameter adjustment

    /// Update the merge tolerance, returning the previous value
    pub fn set_merge_tolerance(&mut self, tolerance_m: f64) -> Result<f64, ConfigError> {
        check_merge_tolerance(tolerance_m)?;

        let old_value = self.config.merge_tolerance_m;
        self.config.merge_tolerance_m = tolerance_m;
        self.is_modified = true;
        Ok(old_value)
    }

    /// Update the tangent threshold, returning the previous value
    pub fn set_tangent_epsilon(&mut self, epsilon_m: f64) -> Result<f64, ConfigError> {
        check_tangent_epsilon(epsilon_m)?;

        let old_value = self.config.tangent_epsilon_m;
        self.config.tangent_epsilon_m = epsilon_m;
        self.is_modified = true;
        Ok(old_value)
    }

    /// Select the preferred model, returning the previous one
    pub fn set_model(&mut self, model: PositioningModel) -> PositioningModel {
        self.is_modified = true;
        std::mem::replace(&mut self.config.model, model)
    }

    /// Select the RSSI ranking, returning the previous one
    pub fn set_signal_ordering(&mut self, ordering: SignalOrdering) -> SignalOrdering {
        self.is_modified = true;
        std::mem::replace(&mut self.config.signal_ordering, ordering)
    }

    /// Validate a configuration without applying it
    pub fn validate_config(config: &EngineConfig) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if let Err(e) = check_merge_tolerance(config.merge_tolerance_m) {
            errors.push(e);
        } else if config.merge_tolerance_m > MERGE_TOLERANCE_WARN_M {
            warnings.push(format!(
                "Merge tolerance of {} m may merge distinct intersection points",
                config.merge_tolerance_m
            ));
        }

        if let Err(e) = check_tangent_epsilon(config.tangent_epsilon_m) {
            errors.push(e);
        }

        let path_loss = &config.path_loss;
        if !(path_loss.path_loss_exponent.is_finite() && path_loss.path_loss_exponent > 0.0) {
            errors.push(invalid(
                "path_loss.path_loss_exponent",
                path_loss.path_loss_exponent,
                "Path-loss exponent must be positive",
            ));
        }
        if !(path_loss.reference_distance_m.is_finite() && path_loss.reference_distance_m > 0.0) {
            errors.push(invalid(
                "path_loss.reference_distance_m",
                path_loss.reference_distance_m,
                "Reference distance must be positive",
            ));
        }
        if !(path_loss.max_range_m > 0.0) {
            errors.push(invalid(
                "path_loss.max_range_m",
                path_loss.max_range_m,
                "Maximum range must be positive",
            ));
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

fn invalid(parameter: &str, value: f64, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn check_merge_tolerance(tolerance_m: f64) -> Result<(), ConfigError> {
    if !tolerance_m.is_finite() || tolerance_m <= 0.0 {
        return Err(invalid(
            "merge_tolerance_m",
            tolerance_m,
            "Merge tolerance must be a positive distance",
        ));
    }
    Ok(())
}

fn check_tangent_epsilon(epsilon_m: f64) -> Result<(), ConfigError> {
    if !epsilon_m.is_finite() || epsilon_m < 0.0 {
        return Err(invalid(
            "tangent_epsilon_m",
            epsilon_m,
            "Tangent threshold must be finite and non-negative",
        ));
    }
    Ok(())
}

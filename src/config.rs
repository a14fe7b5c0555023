//! Trainer configuration parameters
//!
//! All tunable parameters for the control loop.  Defaults reproduce the
//! reference trainer; a JSON file can override any subset of them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::shared::{ActuatorTarget, SensorReading};

/// Core trainer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    // --- Producer ---
    /// Delay between producer ticks while streaming (milliseconds)
    pub tick_interval_ms: u64,
    /// Sensor reading held by the shared state at startup
    pub initial_reading: i64,
    /// Increment applied by the step sensor on every tick
    pub reading_step: i64,

    // --- Decision ---
    /// A reading divisible by this value counts as a detection
    pub detection_modulus: i64,
    /// Actuator target published on detection
    pub hold_target: [i32; 3],
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2000,
            initial_reading: 0,
            reading_step: 2,
            detection_modulus: 10,
            hold_target: [0, 0, 0],
        }
    }
}

impl TrainerConfig {
    /// Read and validate a JSON config file.  Missing fields keep their defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError,
        })?;
        Self::from_json(&raw)
    }

    /// Parse and validate a JSON document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "tick_interval_ms must be greater than zero",
            ));
        }
        if self.detection_modulus <= 0 {
            return Err(ConfigError::ValidationFailed(
                "detection_modulus must be positive",
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }

    pub fn initial_reading(&self) -> SensorReading {
        SensorReading(self.initial_reading)
    }

    pub fn hold_target(&self) -> ActuatorTarget {
        ActuatorTarget(self.hold_target)
    }
}

/// Errors from loading or validating a [`TrainerConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The config file does not exist.
    NotFound,
    /// The file is not a valid config document.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error while reading the file.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}

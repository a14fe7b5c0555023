//! Placeholder "person detected" rule.
//!
//! A reading divisible by the modulus counts as a detection and maps to the
//! configured hold target.  Every other reading produces no target.  This is
//! not a model of detection, only the trigger the trainer uses today.

use crate::app::ports::DecisionRule;
use crate::config::ConfigError;
use crate::shared::{ActuatorTarget, SensorReading};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionRule {
    modulus: i64,
    target: ActuatorTarget,
}

impl DetectionRule {
    /// Fails with [`ConfigError::ValidationFailed`] unless `modulus` is
    /// positive.
    pub fn new(modulus: i64, target: ActuatorTarget) -> Result<Self, ConfigError> {
        if modulus <= 0 {
            return Err(ConfigError::ValidationFailed(
                "detection_modulus must be positive",
            ));
        }
        Ok(Self { modulus, target })
    }

    pub fn is_detection(&self, reading: SensorReading) -> bool {
        reading.0.rem_euclid(self.modulus) == 0
    }
}

impl DecisionRule for DetectionRule {
    fn decide(&self, reading: SensorReading) -> anyhow::Result<Option<ActuatorTarget>> {
        Ok(self.is_detection(reading).then_some(self.target))
    }
}

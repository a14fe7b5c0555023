//! Step sensor: the stand-in camera.
//!
//! Each read adds a fixed step to the previous reading.  Overflow is a
//! read failure rather than a silent wrap, so the producer stops instead of
//! streaming nonsense.

use anyhow::anyhow;

use crate::app::ports::SensorTransform;
use crate::shared::SensorReading;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSensor {
    step: i64,
}

impl StepSensor {
    pub fn new(step: i64) -> Self {
        Self { step }
    }

    pub fn step(&self) -> i64 {
        self.step
    }
}

impl SensorTransform for StepSensor {
    fn next_reading(&mut self, previous: SensorReading) -> anyhow::Result<SensorReading> {
        previous
            .0
            .checked_add(self.step)
            .map(SensorReading)
            .ok_or_else(|| anyhow!("reading overflow: {} + {}", previous, self.step))
    }
}

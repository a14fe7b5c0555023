//! Recording and gated collaborators for integration tests.
//!
//! `GatedSensor` lets a test release producer ticks one at a time;
//! `RecordingDriver` keeps every target it was asked to apply.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use trainer::app::ports::{ActuatorDriver, SensorTransform};
use trainer::shared::{ActuatorTarget, SensorReading};

// ── GatedSensor ───────────────────────────────────────────────

/// Step sensor that waits for one permit per reading.
pub struct GatedSensor {
    step: i64,
    permits: Receiver<()>,
}

impl GatedSensor {
    pub fn new(step: i64) -> (Self, Sender<()>) {
        let (tx, rx) = channel();
        (Self { step, permits: rx }, tx)
    }
}

impl SensorTransform for GatedSensor {
    fn next_reading(&mut self, previous: SensorReading) -> anyhow::Result<SensorReading> {
        self.permits
            .recv()
            .map_err(|_| anyhow::anyhow!("permit sender dropped"))?;
        Ok(SensorReading(previous.0 + self.step))
    }
}

// ── RecordingDriver ───────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingDriver {
    calls: Arc<Mutex<Vec<ActuatorTarget>>>,
    fail_with: Option<&'static str>,
}

#[allow(dead_code)]
impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A driver whose every apply fails with `reason`.
    pub fn failing(reason: &'static str) -> Self {
        Self {
            fail_with: Some(reason),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ActuatorTarget> {
        self.calls.lock().unwrap().clone()
    }
}

impl ActuatorDriver for RecordingDriver {
    fn apply(&mut self, target: ActuatorTarget) -> anyhow::Result<()> {
        if let Some(reason) = self.fail_with {
            anyhow::bail!(reason);
        }
        self.calls.lock().unwrap().push(target);
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────

/// Poll `cond` until it holds or two seconds pass.
pub fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    cond()
}

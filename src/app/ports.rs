//! Port traits: the boundary between the control-loop core and its
//! injected collaborators.
//!
//! ```text
//!   SensorTransform ──▶ Producer ──▶ SharedState ──▶ Decider (DecisionRule)
//!                                         │
//!                                         └────────▶ Actuator (ActuatorDriver)
//! ```
//!
//! The core never knows what a reading means or how a motor is driven; it
//! calls these traits.  Each port has a blanket impl for plain closures so
//! tests and small embedders can pass a lambda.
//!
//! Collaborator errors are [`anyhow::Error`].  The core wraps them in
//! [`Error::Collaborator`](crate::error::Error::Collaborator) together with
//! the stage that failed.

use crate::shared::{ActuatorTarget, SensorReading};

// ───────────────────────────────────────────────────────────────
// Sensor transform (driven by the producer thread)
// ───────────────────────────────────────────────────────────────

/// Derives the next sensor reading from the previous one.
///
/// Owned by the producer worker and called only from its thread.
pub trait SensorTransform: Send {
    fn next_reading(&mut self, previous: SensorReading) -> anyhow::Result<SensorReading>;
}

impl<F> SensorTransform for F
where
    F: FnMut(SensorReading) -> anyhow::Result<SensorReading> + Send,
{
    fn next_reading(&mut self, previous: SensorReading) -> anyhow::Result<SensorReading> {
        self(previous)
    }
}

// ───────────────────────────────────────────────────────────────
// Decision rule (sensor channel listener)
// ───────────────────────────────────────────────────────────────

/// Maps a reading to an actuator target.  `Ok(None)` means the reading
/// does not call for a new target and nothing is published.
pub trait DecisionRule: Send + Sync {
    fn decide(&self, reading: SensorReading) -> anyhow::Result<Option<ActuatorTarget>>;
}

impl<F> DecisionRule for F
where
    F: Fn(SensorReading) -> anyhow::Result<Option<ActuatorTarget>> + Send + Sync,
{
    fn decide(&self, reading: SensorReading) -> anyhow::Result<Option<ActuatorTarget>> {
        self(reading)
    }
}

// ───────────────────────────────────────────────────────────────
// Actuator driver (actuator channel listener)
// ───────────────────────────────────────────────────────────────

/// Applies a target to the physical actuator.
///
/// Retry and timeout behaviour belong to the driver.  A driver that blocks
/// blocks the publishing thread (normally the producer).
pub trait ActuatorDriver: Send {
    fn apply(&mut self, target: ActuatorTarget) -> anyhow::Result<()>;
}

impl<F> ActuatorDriver for F
where
    F: FnMut(ActuatorTarget) -> anyhow::Result<()> + Send,
{
    fn apply(&mut self, target: ActuatorTarget) -> anyhow::Result<()> {
        self(target)
    }
}

// ───────────────────────────────────────────────────────────────
// Producer control (driven by the command console)
// ───────────────────────────────────────────────────────────────

/// Start/stop surface of the producer, as seen by a controller.
pub trait ProducerControl {
    /// Begin streaming.  Returns `false` if already streaming.
    fn start(&self) -> bool;

    /// Stop streaming.  Returns `false` if already idle.
    fn stop(&self) -> bool;

    fn is_streaming(&self) -> bool;
}

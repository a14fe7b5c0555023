//! Log-based motor driver.
//!
//! Implements [`ActuatorDriver`] by writing every target to the log.  Used
//! when no motor board is connected; a real link implements the same trait
//! (see [`SerialMotorLink`](crate::drivers::SerialMotorLink)).

use log::info;

use crate::app::ports::ActuatorDriver;
use crate::shared::ActuatorTarget;

/// Driver that logs every target it is asked to apply.
#[derive(Debug, Default)]
pub struct LogMotorDriver {
    last: Option<ActuatorTarget>,
}

impl LogMotorDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<ActuatorTarget> {
        self.last
    }
}

impl ActuatorDriver for LogMotorDriver {
    fn apply(&mut self, target: ActuatorTarget) -> anyhow::Result<()> {
        info!("MOTOR | moved motors to {}", target);
        self.last = Some(target);
        Ok(())
    }
}

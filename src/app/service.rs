//! Trainer service: wires the control loop together.
//!
//! [`Trainer`] builds the shared state, spawns the producer and attaches
//! the decider and actuator, all from one [`TrainerConfig`] and three
//! injected collaborators.
//!
//! ```text
//!  SensorTransform ──▶ ┌──────────────────────────────┐
//!                      │ Trainer                      │
//!     DecisionRule ──▶ │ SharedState · Producer       │ ◀── Console (start/stop)
//!                      │ Decider · Actuator           │
//!   ActuatorDriver ◀── └──────────────────────────────┘
//! ```

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use log::info;

use super::actuator::Actuator;
use super::console::Console;
use super::decider::Decider;
use super::ports::{ActuatorDriver, DecisionRule, SensorTransform};
use super::producer::{Producer, ProducerHandle};
use crate::config::TrainerConfig;
use crate::control::DetectionRule;
use crate::error::Result;
use crate::sensors::StepSensor;
use crate::shared::SharedState;

pub struct Trainer {
    state: Arc<SharedState>,
    producer: Producer,
    decider: Decider,
    actuator: Actuator,
}

impl Trainer {
    /// Build the loop with arbitrary collaborators.  The producer starts idle.
    pub fn new<T, R, D>(config: &TrainerConfig, transform: T, rule: R, driver: D) -> Result<Self>
    where
        T: SensorTransform + 'static,
        R: DecisionRule + 'static,
        D: ActuatorDriver + 'static,
    {
        config.validate()?;

        let state = SharedState::shared(config.initial_reading(), config.hold_target());
        let producer = Producer::spawn(Arc::clone(&state), transform, config.tick_interval())?;
        let decider = Decider::attach(&state, rule);
        let actuator = Actuator::attach(&state, driver);

        info!(
            "Trainer ready (reading={}, target={}, interval={}ms)",
            state.sensor_reading(),
            state.actuator_target(),
            config.tick_interval_ms
        );

        Ok(Self {
            state,
            producer,
            decider,
            actuator,
        })
    }

    /// Build the loop with the step sensor and the modulo detection rule.
    pub fn with_reference_collaborators<D>(config: &TrainerConfig, driver: D) -> Result<Self>
    where
        D: ActuatorDriver + 'static,
    {
        let rule = DetectionRule::new(config.detection_modulus, config.hold_target())?;
        Self::new(config, StepSensor::new(config.reading_step), rule, driver)
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    pub fn producer(&self) -> &Producer {
        &self.producer
    }

    pub fn producer_handle(&self) -> ProducerHandle {
        self.producer.handle()
    }

    pub fn decider(&self) -> &Decider {
        &self.decider
    }

    pub fn actuator(&self) -> &Actuator {
        &self.actuator
    }

    /// Run the operator console on the calling thread until `input` ends.
    pub fn run_console(&self, input: impl BufRead, output: &mut impl Write) -> io::Result<usize> {
        Console::new(&self.producer).run(input, output)
    }

    /// Stop the producer worker and wait for it.
    pub fn shutdown(mut self) {
        self.producer.shutdown();
        info!(
            "Trainer stopped (ticks={}, decisions={}, applied={})",
            self.producer.stats().ticks,
            self.decider.fired(),
            self.actuator.applied()
        );
    }
}

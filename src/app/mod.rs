//! Application core: the control loop and its boundary.
//!
//! The producer, decider and actuator talk only through
//! [`SharedState`](crate::shared::SharedState).  Everything they do not own
//! (reading transform, decision rule, motor driver) comes in through the
//! **port traits** in [`ports`], so the whole loop is testable with
//! closures and in-memory sinks.

pub mod actuator;
pub mod commands;
pub mod console;
pub mod decider;
pub mod ports;
pub mod producer;
pub mod service;

pub use actuator::Actuator;
pub use commands::TrainerCommand;
pub use console::{Console, LineOutcome};
pub use decider::Decider;
pub use producer::{Producer, ProducerHandle, ProducerStats, StreamMode};
pub use service::Trainer;

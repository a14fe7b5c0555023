//! Actuator drivers.

pub mod motor_link;

pub use motor_link::{MotorFrame, SerialMotorLink};

//! Adapters: concrete implementations of the port traits for the host binary.
//!
//! | Adapter     | Implements     | Connects to        |
//! |-------------|----------------|--------------------|
//! | `log_motor` | ActuatorDriver | Log output         |
//!
//! The serial motor link lives with the drivers in
//! [`drivers::motor_link`](crate::drivers::motor_link).

pub mod log_motor;

pub use log_motor::LogMotorDriver;

//! Trainer control-loop library.
//!
//! A background producer streams sensor readings into a shared state hub;
//! a decider reacts to qualifying readings with an actuator target; an
//! actuator hands each target to a motor driver.  All reactions run
//! synchronously on the producer thread.  See [`shared`] for the dispatch
//! contract and [`app::producer`] for the start/stop state machine.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod sensors;
pub mod shared;

pub use error::{Error, Result};

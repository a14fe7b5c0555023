//! Reference sensor transforms.
//!
//! Real perception lives outside this crate; these transforms implement
//! [`SensorTransform`](crate::app::ports::SensorTransform) well enough to
//! run the loop end to end.

pub mod step;

pub use step::StepSensor;

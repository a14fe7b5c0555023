//! Reference decision rules.

pub mod detection;

pub use detection::DetectionRule;

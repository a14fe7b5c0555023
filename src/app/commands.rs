//! Inbound operator commands.
//!
//! One command per console line.  Parsing trims surrounding whitespace and
//! is otherwise exact: `Start`, `go` or an empty line are all unknown.

use core::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerCommand {
    /// Begin streaming sensor readings.
    Start,
    /// Stop streaming.
    Stop,
}

impl TrainerCommand {
    pub const START: &'static str = "start";
    pub const STOP: &'static str = "stop";
}

impl FromStr for TrainerCommand {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        match line.trim() {
            Self::START => Ok(Self::Start),
            Self::STOP => Ok(Self::Stop),
            other => Err(Error::InvalidCommand(other.to_string())),
        }
    }
}

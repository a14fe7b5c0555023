//! Line-oriented operator console.
//!
//! Reads one command per line on the calling thread until EOF and forwards
//! it to a [`ProducerControl`].  Unknown input is reported on the output
//! stream and never changes producer state.

use std::io::{self, BufRead, Write};

use log::{info, warn};

use super::commands::TrainerCommand;
use super::ports::ProducerControl;

pub struct Console<'a, C: ProducerControl> {
    control: &'a C,
}

/// Outcome of one console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Applied(TrainerCommand),
    Unknown,
}

impl<'a, C: ProducerControl> Console<'a, C> {
    pub fn new(control: &'a C) -> Self {
        Self { control }
    }

    /// Process lines from `input` until EOF.  Returns the number of lines
    /// handled.  Only I/O errors on the streams end the loop early; a line
    /// that is not UTF-8 is decoded lossily and reported as unknown.
    pub fn run(&self, mut input: impl BufRead, output: &mut impl Write) -> io::Result<usize> {
        let mut handled = 0;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            self.process_line(&String::from_utf8_lossy(&buf), output)?;
            handled += 1;
        }
        Ok(handled)
    }

    pub fn process_line(&self, line: &str, output: &mut impl Write) -> io::Result<LineOutcome> {
        match line.parse::<TrainerCommand>() {
            Ok(TrainerCommand::Start) => {
                writeln!(output, "Starting the trainer.")?;
                if !self.control.start() {
                    info!("Console: start ignored, already streaming");
                }
                Ok(LineOutcome::Applied(TrainerCommand::Start))
            }
            Ok(TrainerCommand::Stop) => {
                writeln!(output, "Stopping the trainer.")?;
                if !self.control.stop() {
                    info!("Console: stop ignored, already idle");
                }
                Ok(LineOutcome::Applied(TrainerCommand::Stop))
            }
            Err(e) => {
                warn!("Console: {}", e);
                writeln!(output, "Unknown command: {}", line.trim())?;
                Ok(LineOutcome::Unknown)
            }
        }
    }
}

//! Serial motor link.
//!
//! Encodes each actuator target as a [`MotorFrame`] with postcard and COBS
//! framing (a `0x00` byte terminates every frame) and writes it to any byte
//! sink: a serial device opened as a file, a TCP stream, or a `Vec<u8>` in
//! tests.  The board on the other end decodes with `postcard::from_bytes_cobs`.
//!
//! The link does no retries.  A failed write surfaces as a driver error and
//! the producer stops, matching the manual restart model.

use std::io::Write;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::app::ports::ActuatorDriver;
use crate::shared::ActuatorTarget;

/// Wire frame sent to the motor board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorFrame {
    /// Monotonic frame counter, wrapping.  Lets the board spot drops.
    pub seq: u32,
    pub components: [i32; 3],
}

impl MotorFrame {
    pub fn encode(&self) -> anyhow::Result<Vec<u8>> {
        postcard::to_allocvec_cobs(self).context("encode motor frame")
    }

    /// Decode one COBS frame in place.  `buf` must include the trailing `0x00`.
    pub fn decode(buf: &mut [u8]) -> anyhow::Result<Self> {
        postcard::from_bytes_cobs(buf).context("decode motor frame")
    }
}

pub struct SerialMotorLink<W: Write> {
    port: W,
    next_seq: u32,
}

impl<W: Write> SerialMotorLink<W> {
    pub fn new(port: W) -> Self {
        Self { port, next_seq: 0 }
    }

    /// Frames written so far.
    pub fn frames_sent(&self) -> u32 {
        self.next_seq
    }

    pub fn into_inner(self) -> W {
        self.port
    }
}

impl<W: Write + Send> ActuatorDriver for SerialMotorLink<W> {
    fn apply(&mut self, target: ActuatorTarget) -> anyhow::Result<()> {
        let frame = MotorFrame {
            seq: self.next_seq,
            components: target.0,
        };
        let bytes = frame.encode()?;
        self.port
            .write_all(&bytes)
            .and_then(|()| self.port.flush())
            .with_context(|| format!("write motor frame #{}", frame.seq))?;
        self.next_seq = self.next_seq.wrapping_add(1);
        log::debug!("MotorLink: sent frame #{} {}", frame.seq, target);
        Ok(())
    }
}

//! Unified error types for the trainer.
//!
//! A single `Error` enum that every subsystem converts into, so the producer
//! tick and the console loop handle failures uniformly.  Collaborator
//! failures (transform, decision, driver) arrive as [`anyhow::Error`] since
//! those functions are supplied by the embedder.

use core::fmt;

use crate::config::ConfigError;
use crate::shared::Channel;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the trainer funnels into this type.
#[derive(Debug)]
pub enum Error {
    /// An injected collaborator returned an error.
    Collaborator {
        stage: Stage,
        source: anyhow::Error,
    },
    /// A listener aborted the fan-out of a publish.
    ///
    /// `position` is the zero-based registration slot of the failing
    /// listener within the snapshot taken for that publish.
    Listener {
        channel: Channel,
        position: usize,
        source: Box<Error>,
    },
    /// A listener tried to publish on the channel it is being notified on.
    ReentrantPublish(Channel),
    /// A collaborator panicked while the producer was ticking.
    Panicked(String),
    /// Console input that is not a known command.
    InvalidCommand(String),
    /// The producer worker thread could not be spawned.
    Spawn(std::io::Error),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

/// Which injected collaborator failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SensorTransform,
    Decision,
    ActuatorApply,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SensorTransform => write!(f, "sensor transform"),
            Self::Decision => write!(f, "decision rule"),
            Self::ActuatorApply => write!(f, "actuator driver"),
        }
    }
}

impl Error {
    /// Wrap a collaborator failure for the given stage.
    pub fn collaborator(stage: Stage, source: anyhow::Error) -> Self {
        Self::Collaborator { stage, source }
    }

    /// Whether this error was raised by a listener or an injected collaborator.
    pub fn is_listener_failure(&self) -> bool {
        matches!(
            self,
            Self::Collaborator { .. } | Self::Listener { .. } | Self::Panicked(_)
        )
    }

    /// The innermost error of a chain of listener failures.
    pub fn root(&self) -> &Error {
        let mut current = self;
        while let Self::Listener { source, .. } = current {
            current = source.as_ref();
        }
        current
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collaborator { stage, source } => write!(f, "{stage} failed: {source}"),
            Self::Listener {
                channel,
                position,
                source,
            } => write!(f, "{channel} listener #{position} failed: {source}"),
            Self::ReentrantPublish(channel) => {
                write!(f, "re-entrant publish on the {channel} channel")
            }
            Self::Panicked(msg) => write!(f, "collaborator panicked: {msg}"),
            Self::InvalidCommand(cmd) => write!(f, "unknown command: {cmd}"),
            Self::Spawn(e) => write!(f, "spawn: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Collaborator { source, .. } => Some(&**source),
            Self::Listener { source, .. } => Some(&**source),
            Self::Spawn(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

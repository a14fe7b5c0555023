//! Shared state: the event hub between producer, decider and actuator.
//!
//! ```text
//!  Producer thread
//!       │ publish_sensor_reading(v)
//!       ▼
//!  ┌──────────────────────────────────────────────┐
//!  │ SharedState                                  │
//!  │  sensor   : value · fan-out lock · listeners │──▶ Decider (inline)
//!  │  actuator : value · fan-out lock · listeners │──▶ Actuator (inline)
//!  └──────────────────────────────────────────────┘
//! ```
//!
//! ## Dispatch contract
//!
//! Fan-out is **synchronous and on the publishing thread**.  A publish
//! returns only after every listener of that channel has run, so the
//! producer thread executes the whole reaction chain (decision, then
//! actuation) before it starts its next tick.  There is no queue between a
//! publish and its listeners.
//!
//! - Publishes to one channel are serialised: the fan-out lock is held from
//!   the value write until the last listener returns.
//! - Every listener of a publish reads back the value written by that
//!   publish.
//! - The listener list is snapshotted when fan-out begins.  A listener
//!   registered during a fan-out first runs on the *next* publish.
//! - The first failing listener aborts the fan-out and its error is returned
//!   to the publisher.
//! - A listener that blocks, blocks the publisher with it.  There is no
//!   timeout.
//! - A listener must not publish to the channel it is being notified on;
//!   that is rejected with [`Error::ReentrantPublish`].  Publishing to the
//!   *other* channel is the normal decider path.

pub mod registry;

use core::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use log::debug;
use serde::{Deserialize, Serialize};

pub use registry::{Listener, ListenerId, ListenerRegistry};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Values and channels
// ---------------------------------------------------------------------------

/// Latest perception output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SensorReading(pub i64);

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Latest desired actuator state: three motor command components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ActuatorTarget(pub [i32; 3]);

impl ActuatorTarget {
    /// All motors stopped.
    pub const HOLD: Self = Self([0, 0, 0]);
}

impl fmt::Display for ActuatorTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "({a}, {b}, {c})")
    }
}

/// The two event categories of the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Sensor,
    Actuator,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor => write!(f, "sensor"),
            Self::Actuator => write!(f, "actuator"),
        }
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Holds the latest sensor reading and actuator target and notifies the
/// listeners of each channel when a new value is published.
///
/// Created once at startup and handed to every component as an
/// `Arc<SharedState>`.
pub struct SharedState {
    sensor: Slot<SensorReading>,
    actuator: Slot<ActuatorTarget>,
}

impl SharedState {
    pub fn new(reading: SensorReading, target: ActuatorTarget) -> Self {
        Self {
            sensor: Slot::new(Channel::Sensor, reading),
            actuator: Slot::new(Channel::Actuator, target),
        }
    }

    /// Convenience constructor returning the shared handle.
    pub fn shared(reading: SensorReading, target: ActuatorTarget) -> Arc<Self> {
        Arc::new(Self::new(reading, target))
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn sensor_reading(&self) -> SensorReading {
        self.sensor.get()
    }

    pub fn actuator_target(&self) -> ActuatorTarget {
        self.actuator.get()
    }

    // ── Publish ───────────────────────────────────────────────

    /// Replace the sensor reading, then run every sensor listener in
    /// registration order on the calling thread.
    pub fn publish_sensor_reading(&self, reading: SensorReading) -> Result<()> {
        self.sensor.publish(reading)
    }

    /// Replace the actuator target, then run every actuator listener in
    /// registration order on the calling thread.
    pub fn publish_actuator_target(&self, target: ActuatorTarget) -> Result<()> {
        self.actuator.publish(target)
    }

    // ── Registration ──────────────────────────────────────────

    pub fn register_sensor_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.sensor.listeners.register(Arc::new(listener))
    }

    pub fn register_actuator_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.actuator.listeners.register(Arc::new(listener))
    }

    /// Register an already-shared listener handle on `channel`.
    pub fn register_listener(&self, channel: Channel, listener: Listener) -> ListenerId {
        self.registry(channel).register(listener)
    }

    /// Remove a listener.  Takes effect from the next publish on its channel.
    pub fn unregister_listener(&self, id: ListenerId) -> bool {
        self.registry(id.channel()).unregister(id)
    }

    pub fn listener_count(&self, channel: Channel) -> usize {
        self.registry(channel).len()
    }

    fn registry(&self, channel: Channel) -> &ListenerRegistry {
        match channel {
            Channel::Sensor => &self.sensor.listeners,
            Channel::Actuator => &self.actuator.listeners,
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(SensorReading::default(), ActuatorTarget::HOLD)
    }
}

// ---------------------------------------------------------------------------
// Slot: one channel's value, publish lock and registry
// ---------------------------------------------------------------------------

struct Slot<T> {
    channel: Channel,
    value: Mutex<T>,
    /// Held for the whole publish: value write plus fan-out.
    fanout: Mutex<()>,
    /// Thread currently running this channel's fan-out, if any.
    publisher: Mutex<Option<ThreadId>>,
    listeners: ListenerRegistry,
}

impl<T: Copy + fmt::Display> Slot<T> {
    fn new(channel: Channel, initial: T) -> Self {
        Self {
            channel,
            value: Mutex::new(initial),
            fanout: Mutex::new(()),
            publisher: Mutex::new(None),
            listeners: ListenerRegistry::new(channel),
        }
    }

    fn get(&self) -> T {
        *relock(&self.value)
    }

    fn publish(&self, value: T) -> Result<()> {
        let me = thread::current().id();
        if *relock(&self.publisher) == Some(me) {
            return Err(Error::ReentrantPublish(self.channel));
        }

        let _turn = relock(&self.fanout);
        let _owner = PublisherMark::set(&self.publisher, me);

        *relock(&self.value) = value;
        let snapshot = self.listeners.snapshot();
        debug!(
            "{} publish {} -> {} listener(s)",
            self.channel,
            value,
            snapshot.len()
        );

        for (position, listener) in snapshot.iter().enumerate() {
            listener().map_err(|source| Error::Listener {
                channel: self.channel,
                position,
                source: Box::new(source),
            })?;
        }
        Ok(())
    }
}

/// Records the fan-out thread and clears it on every exit path, including
/// unwinding out of a panicking listener.
struct PublisherMark<'a> {
    slot: &'a Mutex<Option<ThreadId>>,
}

impl<'a> PublisherMark<'a> {
    fn set(slot: &'a Mutex<Option<ThreadId>>, id: ThreadId) -> Self {
        *relock(slot) = Some(id);
        Self { slot }
    }
}

impl Drop for PublisherMark<'_> {
    fn drop(&mut self) {
        *relock(self.slot) = None;
    }
}

/// Lock, recovering from poison.  Every guarded value here is replaced
/// whole, so a panic elsewhere cannot leave it torn.
fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

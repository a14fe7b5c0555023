//! Background sensor producer.
//!
//! A single worker thread, spawned at construction, lives until the
//! [`Producer`] is shut down or dropped.  Its state machine:
//!
//! ```text
//!            start()
//!   ┌──────┐ ───────▶ ┌───────────┐
//!   │ Idle │          │ Streaming │ ── every tick_interval: transform + publish
//!   └──────┘ ◀─────── └───────────┘
//!            stop() / failed tick
//! ```
//!
//! While idle the worker parks on a condvar and wakes only when the mode
//! changes.  While streaming it sleeps on the same condvar with a timeout,
//! so a `stop()` landing mid-sleep cancels the pending tick.  A reaction
//! chain that is already running is never interrupted.
//!
//! The whole reaction chain (decider, actuator) runs on the worker thread
//! inside `publish_sensor_reading`.  A listener that never returns stalls
//! the producer indefinitely.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, error, info};

use super::ports::{ProducerControl, SensorTransform};
use crate::error::{Error, Result, Stage};
use crate::shared::{SensorReading, SharedState};

/// Worker thread name.
const WORKER_NAME: &str = "producer";

/// Worker stack size.  Listener chains run on this stack.
const WORKER_STACK_KB: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    Idle,
    Streaming,
}

/// Counters exposed for supervision and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerStats {
    /// Ticks whose publish and reaction chain completed.
    pub ticks: u64,
    /// Ticks that failed in the transform or in a listener.
    pub failures: u64,
    /// Worker loop iterations, idle or not.
    pub cycles: u64,
}

struct Gate {
    mode: StreamMode,
    /// Bumped on every mode change.
    generation: u64,
    shutdown: bool,
}

struct Inner {
    gate: Mutex<Gate>,
    wake: Condvar,
    ticks: AtomicU64,
    failures: AtomicU64,
    cycles: AtomicU64,
    last_failure: Mutex<Option<String>>,
}

impl Inner {
    fn lock_gate(&self) -> MutexGuard<'_, Gate> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switch mode; returns `true` if it changed.
    fn set_mode(&self, mode: StreamMode) -> bool {
        let mut gate = self.lock_gate();
        if gate.mode == mode {
            return false;
        }
        gate.mode = mode;
        gate.generation = gate.generation.wrapping_add(1);
        self.wake.notify_all();
        true
    }

    /// Drop back to `Idle` after a failed tick, unless the mode changed
    /// since `generation` was taken.  Returns `true` if it switched.
    fn idle_after_failure(&self, generation: u64) -> bool {
        let mut gate = self.lock_gate();
        if gate.generation != generation || gate.mode == StreamMode::Idle {
            return false;
        }
        gate.mode = StreamMode::Idle;
        gate.generation = gate.generation.wrapping_add(1);
        self.wake.notify_all();
        true
    }
}

// ───────────────────────────────────────────────────────────────
// ProducerHandle
// ───────────────────────────────────────────────────────────────

/// Cloneable control handle onto a running producer.
#[derive(Clone)]
pub struct ProducerHandle {
    inner: Arc<Inner>,
}

impl ProducerHandle {
    pub fn mode(&self) -> StreamMode {
        self.inner.lock_gate().mode
    }

    pub fn stats(&self) -> ProducerStats {
        ProducerStats {
            ticks: self.inner.ticks.load(Ordering::Acquire),
            failures: self.inner.failures.load(Ordering::Acquire),
            cycles: self.inner.cycles.load(Ordering::Acquire),
        }
    }

    /// Message of the most recent failed tick.
    pub fn last_failure(&self) -> Option<String> {
        self.inner
            .last_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProducerControl for ProducerHandle {
    fn start(&self) -> bool {
        let changed = self.inner.set_mode(StreamMode::Streaming);
        if changed {
            info!("Producer: streaming");
        }
        changed
    }

    fn stop(&self) -> bool {
        let changed = self.inner.set_mode(StreamMode::Idle);
        if changed {
            info!("Producer: idle");
        }
        changed
    }

    fn is_streaming(&self) -> bool {
        self.mode() == StreamMode::Streaming
    }
}

// ───────────────────────────────────────────────────────────────
// Producer
// ───────────────────────────────────────────────────────────────

/// Owns the worker thread.  Dropping it shuts the worker down.
pub struct Producer {
    handle: ProducerHandle,
    worker: Option<JoinHandle<()>>,
}

impl Producer {
    /// Spawn the worker in the `Idle` state.
    pub fn spawn<T>(state: Arc<SharedState>, transform: T, interval: Duration) -> Result<Self>
    where
        T: SensorTransform + 'static,
    {
        let inner = Arc::new(Inner {
            gate: Mutex::new(Gate {
                mode: StreamMode::Idle,
                generation: 0,
                shutdown: false,
            }),
            wake: Condvar::new(),
            ticks: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            cycles: AtomicU64::new(0),
            last_failure: Mutex::new(None),
        });

        let worker_inner = Arc::clone(&inner);
        let worker = std::thread::Builder::new()
            .name(WORKER_NAME.into())
            .stack_size(WORKER_STACK_KB * 1024)
            .spawn(move || run(&worker_inner, &state, transform, interval))
            .map_err(Error::Spawn)?;

        info!(
            "Spawned '{}' (interval={}ms, stack={}KB)",
            WORKER_NAME,
            interval.as_millis(),
            WORKER_STACK_KB
        );

        Ok(Self {
            handle: ProducerHandle { inner },
            worker: Some(worker),
        })
    }

    pub fn handle(&self) -> ProducerHandle {
        self.handle.clone()
    }

    pub fn mode(&self) -> StreamMode {
        self.handle.mode()
    }

    pub fn stats(&self) -> ProducerStats {
        self.handle.stats()
    }

    pub fn last_failure(&self) -> Option<String> {
        self.handle.last_failure()
    }

    /// Stop the worker and wait for it to exit.  An in-flight reaction chain
    /// finishes first.
    pub fn shutdown(&mut self) {
        {
            let mut gate = self.handle.inner.lock_gate();
            gate.shutdown = true;
            self.handle.inner.wake.notify_all();
        }
        if let Some(worker) = self.worker.take() {
            if worker.thread().id() == std::thread::current().id() {
                // Dropped from inside a listener; the loop exits on its own.
                return;
            }
            if worker.join().is_err() {
                error!("Producer: worker panicked outside a tick");
            }
        }
    }
}

impl ProducerControl for Producer {
    fn start(&self) -> bool {
        self.handle.start()
    }

    fn stop(&self) -> bool {
        self.handle.stop()
    }

    fn is_streaming(&self) -> bool {
        self.handle.is_streaming()
    }
}

impl Drop for Producer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ───────────────────────────────────────────────────────────────
// Worker loop
// ───────────────────────────────────────────────────────────────

fn run<T: SensorTransform>(
    inner: &Inner,
    state: &SharedState,
    mut transform: T,
    interval: Duration,
) {
    loop {
        inner.cycles.fetch_add(1, Ordering::AcqRel);

        // Park while idle.
        let gate = inner
            .wake
            .wait_while(inner.lock_gate(), |g| g.mode == StreamMode::Idle && !g.shutdown)
            .unwrap_or_else(PoisonError::into_inner);
        if gate.shutdown {
            break;
        }

        // Cadence sleep; any mode change ends it early.
        let (gate, _) = inner
            .wake
            .wait_timeout_while(gate, interval, |g| {
                g.mode == StreamMode::Streaming && !g.shutdown
            })
            .unwrap_or_else(PoisonError::into_inner);
        if gate.shutdown {
            break;
        }
        if gate.mode == StreamMode::Idle {
            continue;
        }
        let generation = gate.generation;
        drop(gate);

        match guarded_tick(state, &mut transform) {
            Ok(reading) => {
                inner.ticks.fetch_add(1, Ordering::AcqRel);
                debug!("Producer: tick complete, reading={}", reading);
            }
            Err(e) => {
                inner.failures.fetch_add(1, Ordering::AcqRel);
                error!("Producer: tick failed: {}", e);
                *inner
                    .last_failure
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(e.to_string());
                // Restart is an explicit operator action.  A stop or start
                // issued during the failing tick wins.
                if inner.idle_after_failure(generation) {
                    info!("Producer: idle after failure");
                }
            }
        }
    }
    debug!("Producer: worker exiting");
}

/// One tick, with collaborator panics turned into [`Error::Panicked`].
fn guarded_tick<T: SensorTransform>(
    state: &SharedState,
    transform: &mut T,
) -> Result<SensorReading> {
    panic::catch_unwind(AssertUnwindSafe(|| tick(state, transform)))
        .unwrap_or_else(|payload| Err(Error::Panicked(panic_message(payload.as_ref()))))
}

fn tick<T: SensorTransform>(state: &SharedState, transform: &mut T) -> Result<SensorReading> {
    let previous = state.sensor_reading();
    let next = transform
        .next_reading(previous)
        .map_err(|source| Error::collaborator(Stage::SensorTransform, source))?;
    debug!("Producer: new reading {}", next);
    state.publish_sensor_reading(next)?;
    Ok(next)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

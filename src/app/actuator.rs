//! Actuator: hands the latest target to the injected driver.
//!
//! Attached as an actuator-channel listener.  The driver sits behind a
//! mutex because listeners are shared (`Fn + Sync`) while drivers mutate
//! their own state; publishes on the actuator channel are already
//! serialised, so the lock is never contended by the hub itself.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use log::debug;

use super::ports::ActuatorDriver;
use crate::error::{Error, Stage};
use crate::shared::{ListenerId, SharedState};

pub struct Actuator {
    listener: ListenerId,
    applied: Arc<AtomicU64>,
}

impl Actuator {
    /// Register `driver` on the actuator channel of `state`.
    pub fn attach<D>(state: &Arc<SharedState>, driver: D) -> Self
    where
        D: ActuatorDriver + 'static,
    {
        let hub: Weak<SharedState> = Arc::downgrade(state);
        let driver = Mutex::new(driver);
        let applied = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&applied);

        let listener = state.register_actuator_listener(move || {
            let Some(state) = hub.upgrade() else {
                return Ok(());
            };
            let target = state.actuator_target();
            debug!("Actuator: applying {}", target);

            driver
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .apply(target)
                .map_err(|source| Error::collaborator(Stage::ActuatorApply, source))?;
            counter.fetch_add(1, Ordering::AcqRel);
            Ok(())
        });

        Self { listener, applied }
    }

    /// Number of targets the driver accepted.
    pub fn applied(&self) -> u64 {
        self.applied.load(Ordering::Acquire)
    }

    pub fn listener_id(&self) -> ListenerId {
        self.listener
    }

    /// Unregister from `state`.  Returns `false` if already detached.
    pub fn detach(&self, state: &SharedState) -> bool {
        state.unregister_listener(self.listener)
    }
}

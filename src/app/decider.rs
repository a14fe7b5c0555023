//! Decider: turns qualifying sensor readings into actuator targets.
//!
//! Attached as a sensor-channel listener.  Runs inline on whichever thread
//! published the reading and, when its rule fires, publishes on the
//! actuator channel from that same thread.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use log::debug;

use super::ports::DecisionRule;
use crate::error::{Error, Stage};
use crate::shared::{ListenerId, SharedState};

pub struct Decider {
    listener: ListenerId,
    fired: Arc<AtomicU64>,
}

impl Decider {
    /// Register `rule` on the sensor channel of `state`.
    pub fn attach<R>(state: &Arc<SharedState>, rule: R) -> Self
    where
        R: DecisionRule + 'static,
    {
        // Weak: the registry lives inside the state, a strong handle would
        // keep the state alive forever.
        let hub: Weak<SharedState> = Arc::downgrade(state);
        let fired = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&fired);

        let listener = state.register_sensor_listener(move || {
            let Some(state) = hub.upgrade() else {
                return Ok(());
            };
            let reading = state.sensor_reading();
            debug!("Decider: received reading {}", reading);

            let decision = rule
                .decide(reading)
                .map_err(|source| Error::collaborator(Stage::Decision, source))?;
            if let Some(target) = decision {
                counter.fetch_add(1, Ordering::AcqRel);
                debug!("Decider: reading {} -> target {}", reading, target);
                state.publish_actuator_target(target)?;
            }
            Ok(())
        });

        Self { listener, fired }
    }

    /// Number of targets published so far.
    pub fn fired(&self) -> u64 {
        self.fired.load(Ordering::Acquire)
    }

    pub fn listener_id(&self) -> ListenerId {
        self.listener
    }

    /// Unregister from `state`.  Returns `false` if already detached.
    pub fn detach(&self, state: &SharedState) -> bool {
        state.unregister_listener(self.listener)
    }
}

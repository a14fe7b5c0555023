//! Per-channel listener registry.
//!
//! An ordered list of zero-argument callbacks.  Fan-out never iterates the
//! live list: [`ListenerRegistry::snapshot`] clones the `Arc` handles under
//! the lock and the caller invokes them after the lock is released, so a
//! listener may register or unregister listeners without deadlocking and
//! without changing the in-flight fan-out.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::Channel;
use crate::error::Result;

/// A registered callback.  Listeners take no arguments; they read the
/// current value back through the [`SharedState`](super::SharedState)
/// accessors.
pub type Listener = Arc<dyn Fn() -> Result<()> + Send + Sync>;

/// Handle returned by registration, used to unregister later.
///
/// Carries its channel so a handle from one registry can never remove an
/// entry from the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId {
    channel: Channel,
    seq: u64,
}

impl ListenerId {
    pub fn channel(&self) -> Channel {
        self.channel
    }
}

pub struct ListenerRegistry {
    channel: Channel,
    inner: Mutex<Entries>,
}

struct Entries {
    next_seq: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl ListenerRegistry {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            inner: Mutex::new(Entries {
                next_seq: 0,
                listeners: Vec::new(),
            }),
        }
    }

    /// Append a listener.  Duplicates are allowed and each copy is invoked.
    pub fn register(&self, listener: Listener) -> ListenerId {
        let mut entries = self.lock();
        let id = ListenerId {
            channel: self.channel,
            seq: entries.next_seq,
        };
        entries.next_seq += 1;
        entries.listeners.push((id, listener));
        id
    }

    /// Remove a listener.  Returns `false` if the id is unknown or belongs to
    /// another channel.
    pub fn unregister(&self, id: ListenerId) -> bool {
        if id.channel != self.channel {
            return false;
        }
        let mut entries = self.lock();
        let before = entries.listeners.len();
        entries.listeners.retain(|(entry, _)| *entry != id);
        entries.listeners.len() != before
    }

    /// Listeners in registration order, as of now.
    pub fn snapshot(&self) -> Vec<Listener> {
        self.lock()
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        // Entries are only mutated by push/retain, never left half-written.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

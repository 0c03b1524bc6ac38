//! # Event Buffer
//!
//! Shared map from arrival timestamp (milliseconds since epoch) to [`SecretEvent`].
//!
//! The watch task inserts and the poll loop iterates and removes. The lock is held
//! for single map operations only, so a drain never blocks the watch for the
//! duration of downstream processing.
//!
//! Keys are a best-effort ordering proxy: two events arriving in the same
//! millisecond share a key and the later one replaces the earlier one.

use crate::event::SecretEvent;
use crate::observability;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Thread-safe buffer of pending Secret events keyed by arrival time
#[derive(Debug, Default)]
pub struct EventBuffer {
    entries: Mutex<BTreeMap<i64, SecretEvent>>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the map half-written, so a
    // poisoned lock is safe to keep using.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<i64, SecretEvent>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert an event under the current wall-clock time in milliseconds
    ///
    /// Returns the key the event was stored under.
    pub fn insert(&self, event: SecretEvent) -> i64 {
        let timestamp = chrono::Utc::now().timestamp_millis();
        self.insert_at(timestamp, event);
        timestamp
    }

    /// Insert an event under an explicit key
    ///
    /// Returns the event that was displaced if the key was already taken.
    pub fn insert_at(&self, timestamp: i64, event: SecretEvent) -> Option<SecretEvent> {
        let (replaced, size) = {
            let mut entries = self.lock();
            let replaced = entries.insert(timestamp, event);
            (replaced, entries.len())
        };

        if let Some(ref previous) = replaced {
            debug!(
                timestamp,
                action = %previous.action(),
                "buffer.overwrite: event replaced by a later event with the same timestamp"
            );
            observability::metrics::increment_buffer_overwrites();
        }
        observability::metrics::set_buffer_size(size);
        replaced
    }

    /// Current value stored under `timestamp`, if any
    pub fn get(&self, timestamp: i64) -> Option<SecretEvent> {
        self.lock().get(&timestamp).cloned()
    }

    /// Remove and return the event stored under `timestamp`
    pub fn remove(&self, timestamp: i64) -> Option<SecretEvent> {
        let (removed, size) = {
            let mut entries = self.lock();
            let removed = entries.remove(&timestamp);
            (removed, entries.len())
        };
        observability::metrics::set_buffer_size(size);
        removed
    }

    /// Keys present at the time of the call, in iteration order
    pub fn keys(&self) -> Vec<i64> {
        self.lock().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every pending event
    pub fn clear(&self) {
        self.lock().clear();
        observability::metrics::set_buffer_size(0);
    }
}

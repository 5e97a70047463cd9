//! Per-instrument admission gate.
//!
//! The venue has no compare-and-set, so two signals for one instrument would
//! race on leverage and entry. Executions holding the same instrument's
//! guard run one at a time; different instruments do not contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::shared::Instrument;

type LockMap = HashMap<Instrument, Arc<AsyncMutex<()>>>;

/// Map of instrument to async lock.
///
/// An entry lives only while some execution holds or waits on it.
#[derive(Debug, Default)]
pub struct InstrumentLocks {
    locks: Arc<Mutex<LockMap>>,
}

impl InstrumentLocks {
    /// Create an empty gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `instrument`.
    pub async fn acquire(&self, instrument: &Instrument) -> InstrumentGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(instrument.clone()).or_default())
        };
        InstrumentGuard {
            guard: lock.lock_owned().await,
            instrument: instrument.clone(),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Number of instruments currently held or awaited.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no instrument is held or awaited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive access to one instrument, released on drop.
#[derive(Debug)]
pub struct InstrumentGuard {
    guard: OwnedMutexGuard<()>,
    instrument: Instrument,
    locks: Arc<Mutex<LockMap>>,
}

impl Drop for InstrumentGuard {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the map and this guard reference the lock: nobody is waiting.
        let idle = locks.get(&self.instrument).is_some_and(|lock| {
            Arc::ptr_eq(lock, OwnedMutexGuard::mutex(&self.guard)) && Arc::strong_count(lock) == 2
        });
        if idle {
            locks.remove(&self.instrument);
        }
    }
}

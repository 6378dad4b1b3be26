//! Update notifications published by the lookup engine
//!
//! Listeners are plain callbacks keyed by a [`SubscriptionId`]. A publish
//! snapshots the current listener list and invokes each entry in registration
//! order without holding the lock, so a listener may call [`UpdateNotifier::ignore`]
//! on itself (or register new listeners) from inside its callback.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Callback invoked with the lookup URL that changed
pub type Listener = Arc<dyn Fn(&str) + Send + Sync>;

/// Handle returned by [`UpdateNotifier::listen`], used to remove the listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct UpdateNotifier {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
}

impl UpdateNotifier {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Register a listener. It stays registered until passed to `ignore`.
    pub fn listen<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was already removed.
    pub fn ignore(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Deliver `url` once to every listener registered at the time of the call
    pub fn publish(&self, url: &str) {
        let snapshot: Vec<Listener> = self
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in snapshot {
            listener(url);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Listener)>> {
        // Pushes and removals are atomic, so a poisoned list is still valid
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for UpdateNotifier {
    fn default() -> Self {
        Self::new()
    }
}

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// A handler registered for a topic.
pub type Listener<P> = Arc<dyn Fn(&P) + Send + Sync>;

/// Topic-keyed listener registry that fires handlers synchronously, in
/// registration order, on the publishing thread.
///
/// Cloning shares the registry, so a bus can be handed to several record types
/// (or to a test) and every clone sees the same subscriptions.
pub struct EventBus<P> {
    listeners: Arc<RwLock<HashMap<String, Vec<Listener<P>>>>>,
}

impl<P> EventBus<P> {
    pub fn new() -> Self {
        EventBus {
            listeners: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register `listener` for `topic`.
    pub fn subscribe<F>(&self, topic: impl Into<String>, listener: F)
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        listeners
            .entry(topic.into())
            .or_default()
            .push(Arc::new(listener));
    }

    /// Fire every listener of `topic` with `payload`. Returns how many ran.
    ///
    /// The registry lock is released before any listener runs, so listeners may
    /// subscribe or publish re-entrantly. Listeners added during a publish are
    /// first invoked by the next publish.
    pub fn publish(&self, topic: &str, payload: &P) -> usize {
        let snapshot: Vec<Listener<P>> = {
            let listeners = self
                .listeners
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            match listeners.get(topic) {
                Some(found) => found.clone(),
                None => return 0,
            }
        };

        tracing::trace!(topic, listeners = snapshot.len(), "publishing event");
        for listener in &snapshot {
            listener(payload);
        }
        snapshot.len()
    }

    /// Drop every listener registered for `topic`.
    pub fn unsubscribe_all(&self, topic: &str) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(topic);
    }

    pub fn listener_count(&self, topic: &str) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .map_or(0, Vec::len)
    }
}

impl<P> Clone for EventBus<P> {
    fn clone(&self) -> Self {
        EventBus {
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<P> Default for EventBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for EventBus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut topics: Vec<&String> = listeners.keys().collect();
        topics.sort();
        f.debug_struct("EventBus").field("topics", &topics).finish()
    }
}

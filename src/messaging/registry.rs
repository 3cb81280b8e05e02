use super::handler::{CallbackId, ConnectionListener, MessageHandler};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Maps message discriminators to sets of handlers.
///
/// Iteration order within a set is unspecified; handlers registered for the
/// same type must not depend on running before or after one another.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, HashMap<CallbackId, MessageHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `handler` to the set for `kind`. Returns `false` if it was already there.
    pub fn insert(&self, kind: &str, handler: &MessageHandler) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        handlers
            .entry(kind.to_string())
            .or_default()
            .insert(handler.id(), handler.clone())
            .is_none()
    }

    /// Removes one handler; drops the type entry once its set is empty.
    pub fn remove(&self, kind: &str, id: CallbackId) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let Some(set) = handlers.get_mut(kind) else {
            return false;
        };

        let removed = set.remove(&id).is_some();
        if set.is_empty() {
            handlers.remove(kind);
        }
        removed
    }

    /// Copies the current handlers for `kind` so dispatch runs without the lock held.
    pub fn snapshot(&self, kind: &str) -> Vec<MessageHandler> {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        handlers
            .get(kind)
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn handler_count(&self, kind: &str) -> usize {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        handlers.get(kind).map_or(0, HashMap::len)
    }

    /// Number of discriminators with at least one handler
    pub fn kind_count(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Set of connection-state listeners.
#[derive(Default)]
pub struct ListenerSet {
    listeners: RwLock<HashMap<CallbackId, ConnectionListener>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, listener: &ConnectionListener) -> bool {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(listener.id(), listener.clone())
            .is_none()
    }

    pub fn remove(&self, id: CallbackId) -> bool {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    pub fn snapshot(&self) -> Vec<ConnectionListener> {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers `connected` to every listener registered at call time.
    pub fn notify(&self, connected: bool) {
        for listener in self.snapshot() {
            if !listener.invoke(connected) {
                tracing::error!(
                    "Connection listener panicked while handling state {}",
                    connected
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_insert_is_idempotent() {
        let registry = HandlerRegistry::new();
        let handler = MessageHandler::new(|_| {});

        assert!(registry.insert("servers_update", &handler));
        assert!(!registry.insert("servers_update", &handler.clone()));
        assert_eq!(registry.handler_count("servers_update"), 1);
    }

    #[test]
    fn test_same_handler_under_two_kinds() {
        let registry = HandlerRegistry::new();
        let handler = MessageHandler::new(|_| {});

        registry.insert("data_point_add", &handler);
        registry.insert("data_point_rt", &handler);
        assert_eq!(registry.kind_count(), 2);

        registry.remove("data_point_add", handler.id());
        assert_eq!(registry.handler_count("data_point_add"), 0);
        assert_eq!(registry.handler_count("data_point_rt"), 1);
    }

    #[test]
    fn test_remove_drops_empty_kind() {
        let registry = HandlerRegistry::new();
        let first = MessageHandler::new(|_| {});
        let second = MessageHandler::new(|_| {});

        registry.insert("servers_update", &first);
        registry.insert("servers_update", &second);

        assert!(registry.remove("servers_update", first.id()));
        assert_eq!(registry.kind_count(), 1);
        assert!(registry.remove("servers_update", second.id()));
        assert_eq!(registry.kind_count(), 0);
        assert!(!registry.remove("servers_update", second.id()));
    }

    #[test]
    fn test_snapshot_is_detached_from_later_removal() {
        let registry = HandlerRegistry::new();
        let handler = MessageHandler::new(|_| {});
        registry.insert("servers_update", &handler);

        let snapshot = registry.snapshot("servers_update");
        registry.remove("servers_update", handler.id());

        assert_eq!(snapshot.len(), 1);
        assert!(registry.snapshot("servers_update").is_empty());
    }

    #[test]
    fn test_listener_set_notify() {
        let listeners = ListenerSet::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let listener = ConnectionListener::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let faulty = ConnectionListener::new(|_| panic!("faulty listener"));

        listeners.insert(&listener);
        listeners.insert(&listener);
        listeners.insert(&faulty);
        assert_eq!(listeners.len(), 2);

        listeners.notify(true);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        listeners.remove(listener.id());
        listeners.notify(false);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

use crate::types::InboundMessage;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Identity of a registered callback, derived from its shared allocation.
///
/// Two clones of the same [`MessageHandler`] share an id; two handlers built
/// from identical closures do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(usize);

/// A callback invoked with every inbound message of the type it is registered for.
///
/// Cloning is cheap and preserves identity, so the same value can be passed
/// to [`ConnectionManager::on`](crate::ConnectionManager::on) and later to
/// [`ConnectionManager::off`](crate::ConnectionManager::off).
#[derive(Clone)]
pub struct MessageHandler(Arc<dyn Fn(&InboundMessage) + Send + Sync>);

impl MessageHandler {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&InboundMessage) + Send + Sync + 'static,
    {
        Self(Arc::new(handler))
    }

    pub fn id(&self) -> CallbackId {
        CallbackId(Arc::as_ptr(&self.0) as *const () as usize)
    }

    /// Runs the handler, containing a panic. Returns `false` if it panicked.
    pub(crate) fn invoke(&self, message: &InboundMessage) -> bool {
        panic::catch_unwind(AssertUnwindSafe(|| (self.0)(message))).is_ok()
    }
}

impl fmt::Debug for MessageHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageHandler").field(&self.id()).finish()
    }
}

/// A callback invoked with the new connected state on every transition.
#[derive(Clone)]
pub struct ConnectionListener(Arc<dyn Fn(bool) + Send + Sync>);

impl ConnectionListener {
    pub fn new<F>(listener: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        Self(Arc::new(listener))
    }

    pub fn id(&self) -> CallbackId {
        CallbackId(Arc::as_ptr(&self.0) as *const () as usize)
    }

    pub(crate) fn invoke(&self, connected: bool) -> bool {
        panic::catch_unwind(AssertUnwindSafe(|| (self.0)(connected))).is_ok()
    }
}

impl fmt::Debug for ConnectionListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConnectionListener").field(&self.id()).finish()
    }
}

/// Unregistration capability returned by every registration call.
///
/// Dropping a `Subscription` does nothing; the registration stays in place
/// until [`unsubscribe`](Self::unsubscribe) is called. A subscription keeps
/// its callback alive, so the callback's [`CallbackId`] is not reused by a
/// later registration while the subscription exists.
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub(crate) fn new<F>(dispose: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// Removes exactly the registration this subscription was returned for.
    pub fn unsubscribe(mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.dispose.is_some())
            .finish()
    }
}

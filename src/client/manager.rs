use super::{
    ConfigStatus, ConnectionManagerBuilder, ConnectionPhase, ManagerOptions, ManagerState,
    TransportSlot,
};
use crate::messaging::{
    ConnectionListener, HandlerRegistry, ListenerSet, MessageHandler, MessageRouter, Subscription,
};
use crate::types::{PulseError, Result};
use crate::websocket::{Connector, Transport, TransportEvent};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use url::Url;

/// The live feed connection shared by every consumer of the dashboard.
///
/// `ConnectionManager` owns at most one transport to the configured endpoint,
/// reopens it after a fixed delay when it drops (up to a bounded number of
/// attempts), routes inbound messages to handlers by their `type` field, and
/// reports connected/disconnected transitions to listeners.
///
/// Consumers never see reconnection directly: handlers stay registered across
/// transports, and failures show up only as connection-state changes.
///
/// # Example
///
/// ```no_run
/// use mcpulse::{ConnectionManager, ManagerOptions, MessageHandler, ConnectionListener};
///
/// # async fn example() {
/// let manager = ConnectionManager::new(ManagerOptions::with_endpoint("wss://live.example.net/ws"));
///
/// let on_update = MessageHandler::new(|message| {
///     println!("servers: {:?}", message.field("servers"));
/// });
/// manager.on("servers_update", &on_update);
///
/// let status = manager.subscribe_to_connection(ConnectionListener::new(|connected| {
///     println!("connected: {connected}");
/// }));
///
/// // ...
/// status.unsubscribe();
/// manager.off("servers_update", &on_update);
/// manager.disconnect().await;
/// # }
/// ```
#[derive(Clone)]
pub struct ConnectionManager {
    pub(crate) config: Arc<ConfigStatus>,
    pub(crate) connector: Arc<dyn Connector>,
    pub(crate) registry: Arc<HandlerRegistry>,
    pub(crate) router: Arc<MessageRouter>,
    pub(crate) listeners: Arc<ListenerSet>,
    pub(crate) transport: Arc<TransportSlot>,

    // Consolidated mutable state
    pub(crate) state: Arc<Mutex<ManagerState>>,

    pub(crate) shutdown: Arc<watch::Sender<bool>>,
}

impl ConnectionManager {
    /// Builds a manager using the WebSocket transport and starts connecting.
    ///
    /// Must be called inside a tokio runtime. See [`ConnectionManagerBuilder`]
    /// to supply a different [`Connector`].
    pub fn new(options: ManagerOptions) -> Self {
        ConnectionManagerBuilder::new(options).build()
    }

    pub fn builder(options: ManagerOptions) -> ConnectionManagerBuilder {
        ConnectionManagerBuilder::new(options)
    }

    /// Spawns the supervisor if the endpoint is usable.
    pub(crate) fn start(&self) {
        let endpoint = match self.config.as_ref() {
            ConfigStatus::Valid(url) => url.clone(),
            ConfigStatus::Missing => {
                tracing::error!("WebSocket url not defined in configuration");
                self.lock_state().transition(ConnectionPhase::Unconfigured);
                return;
            }
            ConfigStatus::Invalid { endpoint, reason } => {
                tracing::error!("WebSocket url '{}' is invalid: {}", endpoint, reason);
                self.lock_state().transition(ConnectionPhase::Unconfigured);
                return;
            }
        };

        let manager = self.clone();
        self.lock_state().task_manager.spawn(async move {
            manager.supervise(endpoint).await;
        });
    }

    /// Connect / drive / reconnect loop. Runs until shutdown or budget exhaustion.
    async fn supervise(self, endpoint: Url) {
        let mut shutdown = self.shutdown.subscribe();

        loop {
            if !self.lock_state().should_reconnect {
                break;
            }
            self.lock_state().transition(ConnectionPhase::Connecting);
            tracing::info!("Connecting to {}", endpoint);

            let opened = tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                result = self.connector.connect(&endpoint) => result,
            };

            match opened {
                Ok(transport) => self.drive(transport, &mut shutdown).await,
                Err(e) => tracing::error!("WebSocket connection failed: {}", e),
            }

            self.transport.close();
            self.update_connected(false);

            let Some(delay) = self.schedule_reconnect() else {
                break;
            };

            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(delay) => self.lock_state().reconnect.clear(),
            }
        }

        self.transport.close();
        self.update_connected(false);
        tracing::info!("Connection supervisor finished");
    }

    /// Pumps one open transport until it closes or shutdown is signalled.
    async fn drive(&self, transport: Transport, shutdown: &mut watch::Receiver<bool>) {
        let Transport {
            outbound,
            mut events,
        } = transport;

        self.transport.install(outbound);
        {
            let mut state = self.lock_state();
            state.reconnect.reset();
            state.transition(ConnectionPhase::Open);
        }
        self.update_connected(true);
        tracing::info!("Connected to WebSocket server");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    tracing::debug!("Shutdown requested, leaving read loop");
                    break;
                }
                event = events.recv() => match event {
                    Some(TransportEvent::Message(text)) => {
                        tracing::debug!("Received text message: {}", text);
                        self.router.route_text(&text);
                    }
                    Some(TransportEvent::Error(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                    }
                    Some(TransportEvent::Closed(Some(frame))) => {
                        tracing::warn!(
                            "Server closed connection: code={}, reason='{}'",
                            frame.code,
                            frame.reason
                        );
                        break;
                    }
                    Some(TransportEvent::Closed(None)) | None => {
                        tracing::warn!("Server closed connection without close frame");
                        break;
                    }
                },
            }
        }
    }

    /// Claims the next reconnect attempt, or logs exhaustion and returns `None`.
    fn schedule_reconnect(&self) -> Option<Duration> {
        let mut state = self.lock_state();
        if !state.should_reconnect {
            return None;
        }

        let max_attempts = state.reconnect.max_attempts();
        match state.reconnect.next_attempt() {
            Some(attempt) => {
                tracing::info!("Reconnecting... Attempt {}/{}", attempt, max_attempts);
                state.transition(ConnectionPhase::Reconnecting { attempt });
                Some(state.reconnect.delay())
            }
            None => {
                tracing::warn!(
                    "Max reconnect attempts reached ({}), staying disconnected",
                    max_attempts
                );
                state.transition(ConnectionPhase::Exhausted);
                None
            }
        }
    }

    /// Set the connected flag and notify listeners if it changed
    fn update_connected(&self, connected: bool) {
        if self.transport.set_connected(connected) {
            self.listeners.notify(connected);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `handler` for every later message whose `type` equals `kind`.
    ///
    /// Registering the same handler twice for the same type is a no-op: it
    /// still runs once per message. Handlers for the same type run in no
    /// particular order.
    pub fn on(&self, kind: impl Into<String>, handler: &MessageHandler) -> Subscription {
        let kind = kind.into();
        if !self.registry.insert(&kind, handler) {
            tracing::debug!("Handler already registered for '{}'", kind);
        }

        // The disposer holds the handler so its id cannot be reused meanwhile
        let registry = Arc::downgrade(&self.registry);
        let handler = handler.clone();
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.remove(&kind, handler.id());
            }
        })
    }

    /// Removes exactly `handler` from `kind`. Returns whether it was registered.
    pub fn off(&self, kind: &str, handler: &MessageHandler) -> bool {
        self.registry.remove(kind, handler.id())
    }

    pub fn handler_count(&self, kind: &str) -> usize {
        self.registry.handler_count(kind)
    }

    /// Registers a listener for connected/disconnected transitions.
    ///
    /// The listener is not called with the current state; read it with
    /// [`connection_state`](Self::connection_state).
    pub fn subscribe_to_connection(&self, listener: ConnectionListener) -> Subscription {
        self.listeners.insert(&listener);

        let listeners = Arc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.remove(listener.id());
            }
        })
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Whether the transport is open right now. `false` until the first open.
    pub fn connection_state(&self) -> bool {
        self.transport.is_connected()
    }

    /// A receiver that always holds the current connected state
    pub fn watch_connection(&self) -> watch::Receiver<bool> {
        self.transport.subscribe()
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.lock_state().phase
    }

    /// Reopen attempts since the last successful open
    pub fn reconnect_attempts(&self) -> u32 {
        self.lock_state().reconnect.attempts()
    }

    pub fn config_status(&self) -> &ConfigStatus {
        &self.config
    }

    /// Sends `message` if the transport is open; otherwise logs a warning.
    ///
    /// Nothing is queued: a message sent while disconnected is gone.
    pub fn send<T: Serialize + ?Sized>(&self, message: &T) {
        if let Err(e) = self.try_send(message) {
            tracing::warn!("WebSocket message dropped: {}", e);
        }
    }

    /// Same as [`send`](Self::send), reporting why a message was dropped.
    pub fn try_send<T: Serialize + ?Sized>(&self, message: &T) -> Result<()> {
        if !self.connection_state() {
            return Err(PulseError::NotConnected);
        }

        let json = serde_json::to_string(message)?;
        self.transport.send_text(json)
    }

    /// Shuts the manager down for good.
    ///
    /// Stops reconnecting, cancels a pending reopen, closes the transport and
    /// waits for the supervisor to exit. Listeners see a final `false` if the
    /// manager was connected. A new manager is needed to connect again.
    pub async fn disconnect(&self) {
        let supervisor = {
            let mut state = self.lock_state();
            if state.phase == ConnectionPhase::ShutDown {
                return;
            }
            state.should_reconnect = false;
            state.reconnect.clear();
            state.transition(ConnectionPhase::ShutDown);
            std::mem::take(&mut state.task_manager)
        };

        tracing::info!("Disconnecting from WebSocket server");
        self.shutdown.send_replace(true);
        self.transport.close();
        supervisor.join().await;
        self.update_connected(false);
        tracing::info!("Disconnected from WebSocket server");
    }
}

use super::{ConnectionManager, ManagerState, TransportSlot};
use crate::messaging::{HandlerRegistry, ListenerSet, MessageRouter};
use crate::types::{MAX_RECONNECT_ATTEMPTS, RECONNECT_INTERVAL};
use crate::websocket::{Connector, WebSocketFactory};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use url::Url;

#[derive(Debug, Clone)]
pub struct ManagerOptions {
    /// Live endpoint (`ws://` or `wss://`). `None` leaves the manager disconnected.
    pub endpoint: Option<String>,
    pub max_reconnect_attempts: u32,
    pub reconnect_interval: Duration,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            endpoint: None,
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
            reconnect_interval: Duration::from_millis(RECONNECT_INTERVAL),
        }
    }
}

impl ManagerOptions {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Default::default()
        }
    }
}

/// Outcome of validating the configured endpoint.
///
/// Kept separate from runtime reachability: an unreachable but well-formed
/// endpoint is `Valid` and simply never opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigStatus {
    Valid(Url),
    Missing,
    Invalid { endpoint: String, reason: String },
}

impl ConfigStatus {
    pub fn validate(endpoint: Option<&str>) -> Self {
        let Some(raw) = endpoint.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Self::Missing;
        };

        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "ws" | "wss") => Self::Valid(url),
            Ok(url) => Self::Invalid {
                endpoint: raw.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            },
            Err(e) => Self::Invalid {
                endpoint: raw.to_string(),
                reason: e.to_string(),
            },
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn endpoint(&self) -> Option<&Url> {
        match self {
            Self::Valid(url) => Some(url),
            _ => None,
        }
    }
}

/// Builder for ConnectionManager that handles initialization
pub struct ConnectionManagerBuilder {
    options: ManagerOptions,
    connector: Arc<dyn Connector>,
}

impl ConnectionManagerBuilder {
    /// Create a new builder using the WebSocket connector
    pub fn new(options: ManagerOptions) -> Self {
        Self {
            options,
            connector: Arc::new(WebSocketFactory::default()),
        }
    }

    /// Replace the transport, e.g. with an in-memory one in tests
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    /// Build the manager and spawn its supervisor task.
    ///
    /// Never fails: a missing or malformed endpoint yields a manager that stays
    /// disconnected and reports the problem through
    /// [`ConnectionManager::config_status`]. Must be called inside a tokio runtime.
    pub fn build(self) -> ConnectionManager {
        let config = ConfigStatus::validate(self.options.endpoint.as_deref());
        let registry = Arc::new(HandlerRegistry::new());
        let (shutdown_tx, _) = watch::channel(false);
        let state = ManagerState::new(
            self.options.max_reconnect_attempts,
            self.options.reconnect_interval,
        );

        let manager = ConnectionManager {
            config: Arc::new(config),
            connector: self.connector,
            router: Arc::new(MessageRouter::new(Arc::clone(&registry))),
            registry,
            listeners: Arc::new(ListenerSet::new()),
            transport: Arc::new(TransportSlot::new()),
            state: Arc::new(Mutex::new(state)),
            shutdown: Arc::new(shutdown_tx),
        };

        manager.start();
        manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_websocket_schemes() {
        let status = ConfigStatus::validate(Some("wss://live.example.net/ws"));
        assert!(status.is_valid());
        assert_eq!(
            status.endpoint().map(Url::as_str),
            Some("wss://live.example.net/ws")
        );
        assert!(ConfigStatus::validate(Some("ws://127.0.0.1:8080")).is_valid());
    }

    #[test]
    fn test_validate_missing() {
        assert_eq!(ConfigStatus::validate(None), ConfigStatus::Missing);
        assert_eq!(ConfigStatus::validate(Some("   ")), ConfigStatus::Missing);
    }

    #[test]
    fn test_validate_rejects_malformed_and_http() {
        assert!(matches!(
            ConfigStatus::validate(Some("not a url")),
            ConfigStatus::Invalid { .. }
        ));

        let status = ConfigStatus::validate(Some("https://live.example.net"));
        let ConfigStatus::Invalid { reason, .. } = status else {
            panic!("http endpoint should be rejected");
        };
        assert!(reason.contains("https"));
    }

    #[test]
    fn test_default_options() {
        let options = ManagerOptions::default();
        assert_eq!(options.endpoint, None);
        assert_eq!(options.max_reconnect_attempts, 10);
        assert_eq!(options.reconnect_interval, Duration::from_millis(3000));
    }
}

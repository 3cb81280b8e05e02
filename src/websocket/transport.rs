use crate::types::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;
use url::Url;

/// Frames the manager asks a transport to write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text(String),
    Close,
}

/// Close frame details reported by the peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: u16,
    pub reason: String,
}

/// Events a transport reports back to the manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Message(String),
    /// Logged only; the `Closed` that follows drives reconnection
    Error(String),
    Closed(Option<CloseInfo>),
}

/// One open duplex connection.
///
/// Dropping `outbound` asks the transport to close. The end of `events`
/// counts as a close even without an explicit [`TransportEvent::Closed`].
pub struct Transport {
    pub outbound: mpsc::UnboundedSender<Outbound>,
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
}

impl Transport {
    pub fn new(
        outbound: mpsc::UnboundedSender<Outbound>,
        events: mpsc::UnboundedReceiver<TransportEvent>,
    ) -> Self {
        Self { outbound, events }
    }
}

/// Opens transports for the connection manager.
///
/// Returning an error counts as a failed open: the manager treats it exactly
/// like a transport that closed right away.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self, endpoint: &Url) -> Result<Transport>;
}

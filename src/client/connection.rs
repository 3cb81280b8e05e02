use crate::types::{PulseError, Result};
use crate::websocket::Outbound;
use std::sync::{PoisonError, RwLock};
use tokio::sync::{mpsc, watch};

/// Holds the single live transport writer and the connected flag.
///
/// The flag lives in a `watch` channel so it can be read synchronously and
/// observed by reactive consumers without going through the listener set.
pub struct TransportSlot {
    writer: RwLock<Option<mpsc::UnboundedSender<Outbound>>>,
    connected: watch::Sender<bool>,
}

impl TransportSlot {
    pub fn new() -> Self {
        let (connected, _) = watch::channel(false);
        Self {
            writer: RwLock::new(None),
            connected,
        }
    }

    /// Sets the transport writer, closing any writer it supersedes first
    pub fn install(&self, writer: mpsc::UnboundedSender<Outbound>) {
        let mut slot = self.writer.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.take() {
            tracing::debug!("Closing superseded transport");
            let _ = previous.send(Outbound::Close);
        }
        *slot = Some(writer);
    }

    /// Checks if currently connected
    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Records the connected flag. Returns `true` if the value changed.
    pub fn set_connected(&self, connected: bool) -> bool {
        self.connected.send_if_modified(|current| {
            if *current == connected {
                return false;
            }
            *current = connected;
            true
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.connected.subscribe()
    }

    /// Queues a text frame on the live transport
    pub fn send_text(&self, text: String) -> Result<()> {
        if !self.is_connected() {
            return Err(PulseError::NotConnected);
        }

        let slot = self.writer.read().unwrap_or_else(PoisonError::into_inner);
        let writer = slot.as_ref().ok_or(PulseError::NotConnected)?;
        writer
            .send(Outbound::Text(text))
            .map_err(|_| PulseError::Connection("transport writer is gone".to_string()))
    }

    /// Asks the live transport to close and forgets it
    pub fn close(&self) {
        let writer = self
            .writer
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(writer) = writer {
            let _ = writer.send(Outbound::Close);
        }
    }
}

impl Default for TransportSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_requires_connection() {
        let slot = TransportSlot::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        slot.install(tx);

        assert!(matches!(
            slot.send_text("{}".to_string()),
            Err(PulseError::NotConnected)
        ));
        assert!(rx.try_recv().is_err());

        slot.set_connected(true);
        slot.send_text("{}".to_string()).unwrap();
        assert_eq!(rx.try_recv().unwrap(), Outbound::Text("{}".to_string()));
    }

    #[test]
    fn test_install_closes_superseded_writer() {
        let slot = TransportSlot::new();
        let (first_tx, mut first_rx) = mpsc::unbounded_channel();
        let (second_tx, _second_rx) = mpsc::unbounded_channel();

        slot.install(first_tx);
        slot.install(second_tx);

        assert_eq!(first_rx.try_recv().unwrap(), Outbound::Close);
        assert!(first_rx.try_recv().is_err());
    }

    #[test]
    fn test_set_connected_reports_changes_only() {
        let slot = TransportSlot::new();
        assert!(!slot.set_connected(false));
        assert!(slot.set_connected(true));
        assert!(!slot.set_connected(true));
        assert!(slot.is_connected());
    }

    #[test]
    fn test_close_forgets_writer() {
        let slot = TransportSlot::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        slot.install(tx);
        slot.set_connected(true);
        slot.close();

        assert_eq!(rx.try_recv().unwrap(), Outbound::Close);
        assert!(matches!(
            slot.send_text("{}".to_string()),
            Err(PulseError::NotConnected)
        ));
    }
}

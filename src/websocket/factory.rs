use super::transport::{CloseInfo, Connector, Outbound, Transport, TransportEvent};
use crate::types::{HANDSHAKE_TIMEOUT, PulseError, Result};
use async_trait::async_trait;
use futures::SinkExt;
use futures::stream::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

/// WebSocket factory for creating WebSocket connections
#[derive(Debug, Clone, Copy)]
pub struct WebSocketFactory {
    handshake_timeout: Duration,
}

impl WebSocketFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// How long the opening handshake may take before the attempt fails
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }
}

impl Default for WebSocketFactory {
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_millis(HANDSHAKE_TIMEOUT),
        }
    }
}

#[async_trait]
impl Connector for WebSocketFactory {
    /// Performs the handshake and bridges the socket onto a [`Transport`] with
    /// one reader task and one writer task.
    async fn connect(&self, endpoint: &Url) -> Result<Transport> {
        tracing::debug!("Creating WebSocket connection to: {}", endpoint);
        let (ws_stream, _response) =
            tokio::time::timeout(self.handshake_timeout, connect_async(endpoint.as_str()))
                .await
                .map_err(|_| {
                    PulseError::Connection(format!(
                        "handshake with {} timed out after {:?}",
                        endpoint, self.handshake_timeout
                    ))
                })??;
        let (mut write_half, mut read_half) = ws_stream.split();

        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Outbound>();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(frame) = outbound_rx.recv().await {
                match frame {
                    Outbound::Text(text) => {
                        if let Err(e) = write_half.send(Message::Text(text.into())).await {
                            tracing::error!("WebSocket write error: {}", e);
                            break;
                        }
                    }
                    Outbound::Close => break,
                }
            }
            if let Err(e) = write_half.close().await {
                tracing::debug!("WebSocket close handshake failed: {}", e);
            }
            tracing::debug!("Write task finished");
        });

        tokio::spawn(async move {
            tracing::debug!("Starting read task");
            while let Some(msg_result) = read_half.next().await {
                let event = match msg_result {
                    Ok(Message::Text(text)) => TransportEvent::Message(text.to_string()),
                    Ok(Message::Close(frame)) => {
                        let info = frame.map(|close_frame| CloseInfo {
                            code: close_frame.code.into(),
                            reason: close_frame.reason.to_string(),
                        });
                        let _ = event_tx.send(TransportEvent::Closed(info));
                        return;
                    }
                    Ok(Message::Binary(data)) => {
                        tracing::warn!("Received unexpected binary message ({} bytes)", data.len());
                        continue;
                    }
                    Ok(Message::Ping(data)) => {
                        tracing::debug!("Received ping ({} bytes)", data.len());
                        continue;
                    }
                    Ok(Message::Pong(data)) => {
                        tracing::debug!("Received pong ({} bytes)", data.len());
                        continue;
                    }
                    Ok(Message::Frame(_)) => continue,
                    Err(e) => {
                        let _ = event_tx.send(TransportEvent::Error(e.to_string()));
                        break;
                    }
                };

                if event_tx.send(event).is_err() {
                    // Manager moved on to another transport
                    return;
                }
            }
            let _ = event_tx.send(TransportEvent::Closed(None));
        });

        Ok(Transport::new(outbound_tx, event_rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_silent_endpoint_times_out() {
        // Accepts at the TCP level but never answers the upgrade request
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = Url::parse(&format!("ws://{}/ws", listener.local_addr().unwrap())).unwrap();

        let factory = WebSocketFactory::new().with_handshake_timeout(Duration::from_millis(200));
        let result = factory.connect(&endpoint).await;

        assert!(matches!(result, Err(PulseError::Connection(_))));
        drop(listener);
    }

    #[tokio::test]
    async fn test_refused_endpoint_fails_fast() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = Url::parse(&format!("ws://{}/ws", listener.local_addr().unwrap())).unwrap();
        drop(listener);

        let result = WebSocketFactory::new().connect(&endpoint).await;
        assert!(matches!(result, Err(PulseError::WebSocket(_))));
    }
}

use super::registry::HandlerRegistry;
use crate::types::{InboundMessage, PulseError};
use std::sync::Arc;

/// What happened to one inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Handed to this many handlers
    Delivered(usize),
    /// Well-formed, but nobody is registered for its type
    Unhandled,
    /// Not JSON
    Malformed,
    /// JSON without a usable `type`
    MissingDiscriminator,
}

/// Routes incoming messages to the handlers registered for their type.
///
/// Routing only looks at the envelope. Payload contents are never inspected,
/// so validating samples is left to the consumers.
pub struct MessageRouter {
    registry: Arc<HandlerRegistry>,
}

impl MessageRouter {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    /// Parses and routes one text frame. Never panics on bad input.
    pub fn route_text(&self, text: &str) -> RouteOutcome {
        match InboundMessage::parse(text) {
            Ok(message) => self.route(&message),
            Err(PulseError::MissingDiscriminator) => {
                tracing::warn!("Dropping message without type discriminator: {}", text);
                RouteOutcome::MissingDiscriminator
            }
            Err(e) => {
                tracing::error!("Failed to parse message: {} - Raw: {}", e, text);
                RouteOutcome::Malformed
            }
        }
    }

    /// Routes a message to the appropriate handler(s)
    pub fn route(&self, message: &InboundMessage) -> RouteOutcome {
        let handlers = self.registry.snapshot(message.kind());
        if handlers.is_empty() {
            tracing::debug!("No handlers for message type '{}'", message.kind());
            return RouteOutcome::Unhandled;
        }

        tracing::debug!(
            "Routing '{}' to {} handler(s)",
            message.kind(),
            handlers.len()
        );
        for handler in &handlers {
            if !handler.invoke(message) {
                tracing::error!("Handler for '{}' panicked", message.kind());
            }
        }

        RouteOutcome::Delivered(handlers.len())
    }
}

use super::constants::{DISCRIMINATOR_FIELD, PAYLOAD_FIELD, message_types};
use super::error::{PulseError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A parsed inbound message: the routing discriminator plus the full JSON body.
///
/// Handlers receive the whole body, not only the `data` field, because some
/// discriminators (`servers_update`) carry their payload under other keys.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    kind: String,
    body: Value,
}

impl InboundMessage {
    /// Parses raw transport text into an envelope.
    ///
    /// Fails when the text is not JSON, or when the `type` field is absent, not
    /// a string, or empty.
    pub fn parse(text: &str) -> Result<Self> {
        let body: Value = serde_json::from_str(text)?;
        Self::from_value(body)
    }

    pub fn from_value(body: Value) -> Result<Self> {
        let kind = body
            .get(DISCRIMINATOR_FIELD)
            .and_then(Value::as_str)
            .filter(|kind| !kind.is_empty())
            .ok_or(PulseError::MissingDiscriminator)?
            .to_string();

        Ok(Self { kind, body })
    }

    /// The discriminator this message is routed by
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    /// The conventional `data` payload, if present
    pub fn data(&self) -> Option<&Value> {
        self.body.get(PAYLOAD_FIELD)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }

    /// Deserializes the full body into a typed view.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&self.body)?)
    }
}

/// Envelope for client-to-server requests such as per-server subscriptions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutboundMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl OutboundMessage {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ip: None,
            data: Value::Null,
        }
    }

    pub fn subscribe(ip: impl Into<String>) -> Self {
        Self::new(message_types::SUBSCRIBE).with_ip(ip)
    }

    pub fn unsubscribe(ip: impl Into<String>) -> Self {
        Self::new(message_types::UNSUBSCRIBE).with_ip(ip)
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

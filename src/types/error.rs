use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors that can occur when using the live feed client.
///
/// None of these cross into message handlers or connection listeners: the
/// connection manager contains every failure and reports it through logs and
/// connection-state transitions. They surface only from explicit calls such as
/// [`ConnectionManager::try_send`](crate::ConnectionManager::try_send) or the
/// REST client.
#[derive(Error, Debug)]
pub enum PulseError {
    /// WebSocket protocol error (handshake failed, invalid frame, etc.)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// General connection error with descriptive message
    #[error("Connection error: {0}")]
    Connection(String),

    /// Missing or unusable configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Inbound message carried no usable `type` field
    #[error("Message has no type discriminator")]
    MissingDiscriminator,

    /// HTTP request error (historical data queries)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing error (malformed endpoint URL)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Duration string not of the form `<n>(ms|s|m|h|d)`
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Attempted operation while not connected to the server
    #[error("Not connected")]
    NotConnected,
}

/// Convenience type alias for `Result<T, PulseError>`.
pub type Result<T> = std::result::Result<T, PulseError>;

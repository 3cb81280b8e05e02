// WebSocket module - Transport seam and the tungstenite-backed connector
pub mod factory;
pub mod transport;

pub use factory::WebSocketFactory;
pub use transport::{CloseInfo, Connector, Outbound, Transport, TransportEvent};

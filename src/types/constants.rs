/// Live message discriminators (magic strings layer)
pub mod message_types {
    pub const SERVERS_UPDATE: &str = "servers_update";
    pub const DATA_POINT_ADD: &str = "data_point_add";
    pub const DATA_POINT_RT: &str = "data_point_rt";
    pub const SUBSCRIBE: &str = "subscribe";
    pub const UNSUBSCRIBE: &str = "unsubscribe";
}

/// Envelope field names
pub const DISCRIMINATOR_FIELD: &str = "type";
pub const PAYLOAD_FIELD: &str = "data";

/// Environment variables read by [`crate::config::DashboardConfig::from_env`]
pub mod env_vars {
    pub const WS_URL: &str = "MCPULSE_WS_URL";
    pub const API_URL: &str = "MCPULSE_API_URL";
    pub const RECONNECT_ATTEMPTS: &str = "MCPULSE_RECONNECT_ATTEMPTS";
    pub const RECONNECT_INTERVAL_MS: &str = "MCPULSE_RECONNECT_INTERVAL_MS";
}

/// Maximum automatic reopen attempts before giving up
pub const MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Fixed delay between reopen attempts (milliseconds)
pub const RECONNECT_INTERVAL: u64 = 3000;

/// Time allowed for the WebSocket opening handshake (milliseconds)
pub const HANDSHAKE_TIMEOUT: u64 = 10_000;

/// Upper bound for a plausible player count
pub const MAX_PLAYER_COUNT: f64 = 100_000.0;

/// Samples kept per server series
pub const MAX_SERIES_POINTS: usize = 1000;

/// Default sparkline resolution
pub const SPARKLINE_POINTS: usize = 50;

/// Resolution of the multi-server comparison chart
pub const COMPARISON_POINTS: usize = 240;

/// WebSocket close codes
pub const WS_CLOSE_NORMAL: u16 = 1000;

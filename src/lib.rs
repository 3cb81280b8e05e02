//! # mcpulse
//!
//! Client core for a live Minecraft server population dashboard: one resilient
//! WebSocket feed shared by every consumer, plus the state those consumers
//! keep (per-server sample series, the server directory, comparison tables)
//! and a client for the historical REST API.
//!
//! ## Example
//!
//! ```no_run
//! use mcpulse::{DashboardConfig, DashboardContext, LiveSeries};
//!
//! #[tokio::main]
//! async fn main() {
//!     let context = DashboardContext::init(DashboardConfig::from_env());
//!
//!     let series = LiveSeries::follow(context.live(), "mc.hypixel.net");
//!     // ... render series.buffer() ...
//!
//!     series.detach();
//!     context.shutdown().await;
//! }
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod infrastructure;
pub mod messaging;
pub mod types;
pub mod websocket;

pub use client::{ConfigStatus, ConnectionManager, ConnectionPhase, ManagerOptions};
pub use config::DashboardConfig;
pub use context::DashboardContext;
pub use dashboard::{LiveSeries, SeriesBuffer, ServerDataPoint, ServerDirectory, ServerFeed};
pub use infrastructure::ApiClient;
pub use messaging::{ConnectionListener, MessageHandler, Subscription};
pub use types::{InboundMessage, OutboundMessage, PulseError, Result};
pub use websocket::{Connector, Transport, TransportEvent};

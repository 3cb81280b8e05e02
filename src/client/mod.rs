// Module declarations
mod builder;
mod connection;
mod manager;
mod state;


// Public API exports
pub use builder::{ConfigStatus, ConnectionManagerBuilder, ManagerOptions};
pub use connection::TransportSlot;
pub use manager::ConnectionManager;
pub use state::{ConnectionPhase, ManagerState};

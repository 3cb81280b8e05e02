// Messaging module - Handler bookkeeping and message routing
pub mod handler;
pub mod registry;
pub mod router;

pub use handler::{CallbackId, ConnectionListener, MessageHandler, Subscription};
pub use registry::{HandlerRegistry, ListenerSet};
pub use router::{MessageRouter, RouteOutcome};

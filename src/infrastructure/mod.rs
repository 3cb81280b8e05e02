// Infrastructure module - Reconnect budget, background tasks and the REST client
pub mod http;
pub mod task_manager;
pub mod timer;

pub use http::{ApiClient, ws_to_http_endpoint};
pub use task_manager::TaskManager;
pub use timer::ReconnectTimer;

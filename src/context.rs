use crate::client::{ConnectionManager, ConnectionManagerBuilder};
use crate::config::DashboardConfig;
use crate::infrastructure::{ApiClient, ws_to_http_endpoint};
use crate::websocket::Connector;
use std::sync::Arc;

/// Application-wide handle to the live connection and the REST client.
///
/// Build it once at startup and clone it into every consumer; clones share
/// the same connection manager. [`shutdown`](Self::shutdown) is the single
/// teardown point.
#[derive(Clone)]
pub struct DashboardContext {
    config: Arc<DashboardConfig>,
    live: ConnectionManager,
    api: Option<ApiClient>,
}

impl DashboardContext {
    /// Creates the connection manager (which starts connecting right away)
    /// and the REST client. Must be called inside a tokio runtime.
    pub fn init(config: DashboardConfig) -> Self {
        let builder = ConnectionManager::builder(config.manager_options());
        Self::from_builder(config, builder)
    }

    /// Like [`init`](Self::init) with a caller-supplied transport
    pub fn init_with_connector(config: DashboardConfig, connector: Arc<dyn Connector>) -> Self {
        let builder =
            ConnectionManager::builder(config.manager_options()).with_connector(connector);
        Self::from_builder(config, builder)
    }

    fn from_builder(config: DashboardConfig, builder: ConnectionManagerBuilder) -> Self {
        let live = builder.build();
        let api = Self::api_client(&config, &live);
        Self {
            config: Arc::new(config),
            live,
            api,
        }
    }

    /// Uses the configured API url, or the origin of the live endpoint when
    /// none is set.
    fn api_client(config: &DashboardConfig, live: &ConnectionManager) -> Option<ApiClient> {
        let base = match &config.api_url {
            Some(url) => url.clone(),
            None => {
                let derived = live
                    .config_status()
                    .endpoint()
                    .and_then(ws_to_http_endpoint)?;
                tracing::info!("API url not set, using {}", derived);
                derived.to_string()
            }
        };

        match ApiClient::new(&base) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::error!("API url '{}' is unusable: {}", base, e);
                None
            }
        }
    }

    pub fn live(&self) -> &ConnectionManager {
        &self.live
    }

    /// The REST client, if an API url is available
    pub fn api(&self) -> Option<&ApiClient> {
        self.api.as_ref()
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Disconnects the live feed for good
    pub async fn shutdown(&self) {
        self.live.disconnect().await;
    }
}

use crate::dashboard::{BulkServerData, DataPointQuery, Server, TimeRange};
use crate::types::{PulseError, Result};
use serde::de::DeserializeOwned;
use url::Url;

/// Client for the historical REST API.
///
/// A non-success status is logged and degrades to an empty result; only
/// transport and decoding failures are returned as errors.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_endpoint: Url,
    http: reqwest::Client,
}

impl ApiClient {
    /// `base_endpoint` is the API origin (an `http` or `https` URL), optionally
    /// with a path prefix.
    pub fn new(base_endpoint: &str) -> Result<Self> {
        let base_endpoint = Url::parse(base_endpoint.trim())?;
        if !matches!(base_endpoint.scheme(), "http" | "https") {
            return Err(PulseError::Config(format!(
                "API url must be http(s), got '{}'",
                base_endpoint
            )));
        }

        Ok(Self {
            base_endpoint,
            http: reqwest::Client::new(),
        })
    }

    /// Uses `http` for every request instead of a default client
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn base_endpoint(&self) -> &Url {
        &self.base_endpoint
    }

    /// `GET /api/{ip}/{duration}`
    pub async fn data_points(&self, ip: &str, range: TimeRange) -> Result<DataPointQuery> {
        let url = self.endpoint(&[ip, range.as_str()])?;
        self.get_json(url).await
    }

    /// `GET /api/servers`
    pub async fn servers(&self) -> Result<Vec<Server>> {
        let url = self.endpoint(&["servers"])?;
        self.get_json(url).await
    }

    /// `GET /api/bulk/{ip,ip,...}/{duration}`. No request is made for an empty list.
    pub async fn bulk_server_data(
        &self,
        ips: &[String],
        range: TimeRange,
    ) -> Result<BulkServerData> {
        if ips.is_empty() {
            return Ok(BulkServerData::default());
        }

        let joined = ips.join(",");
        let url = self.endpoint(&["bulk", &joined, range.as_str()])?;
        self.get_json(url).await
    }

    /// `{base}/api/` followed by `segments`, each percent-encoded as needed
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_endpoint.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| {
                PulseError::Config(format!("API url '{}' cannot be a base", self.base_endpoint))
            })?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned + Default>(&self, url: Url) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self.http.get(url.clone()).send().await?;

        if !response.status().is_success() {
            tracing::warn!("GET {} failed with status: {}", url, response.status());
            return Ok(T::default());
        }

        Ok(response.json::<T>().await?)
    }
}

/// Derives the API origin from the live endpoint: `ws` becomes `http`,
/// `wss` becomes `https`, and the path and query are dropped.
pub fn ws_to_http_endpoint(ws_endpoint: &Url) -> Option<Url> {
    let scheme = match ws_endpoint.scheme() {
        "ws" => "http",
        "wss" => "https",
        _ => return None,
    };

    let host = ws_endpoint.host_str()?;
    let origin = match ws_endpoint.port() {
        Some(port) => format!("{}://{}:{}", scheme, host, port),
        None => format!("{}://{}", scheme, host),
    };
    Url::parse(&origin).ok()
}

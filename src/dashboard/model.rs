use crate::types::MAX_PLAYER_COUNT;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One server as listed by `/api/servers` and `servers_update`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Server {
    pub name: String,
    pub ip: String,
    #[serde(default)]
    pub icon: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub online: bool,
    #[serde(default, deserialize_with = "lenient_count")]
    pub player_count: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub peak: u32,
}

/// Reads any JSON value as a count: numbers are rounded and clamped to `u32`,
/// anything else is 0.
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let count = value.as_f64().filter(|count| count.is_finite()).unwrap_or(0.0);
    Ok(count.round().clamp(0.0, f64::from(u32::MAX)) as u32)
}

/// A validated population sample.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerDataPoint {
    /// Seconds since the Unix epoch
    pub timestamp: i64,
    pub player_count: u32,
    pub ip: String,
    pub name: String,
}

/// A sample as the backend sends it. Every field may be missing or out of range.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawDataPoint {
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub player_count: Option<f64>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl RawDataPoint {
    /// Keeps the sample if its count is within range and it has a timestamp.
    pub fn validate(&self) -> Option<ServerDataPoint> {
        let count = self
            .player_count
            .filter(|count| count.is_finite() && (0.0..=MAX_PLAYER_COUNT).contains(count))?;
        let timestamp = self.timestamp.filter(|ts| ts.is_finite())?;

        Some(ServerDataPoint {
            timestamp: timestamp.floor() as i64,
            player_count: count.round() as u32,
            ip: self.ip.clone().unwrap_or_default(),
            name: self.name.clone().unwrap_or_default(),
        })
    }

    /// Whether both `ip` and `name` are present and non-empty
    pub fn has_identity(&self) -> bool {
        let present = |field: &Option<String>| field.as_deref().is_some_and(|v| !v.is_empty());
        present(&self.ip) && present(&self.name)
    }
}

/// Response of `/api/{ip}/{duration}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DataPointQuery {
    #[serde(default)]
    pub step: String,
    #[serde(default)]
    pub data: Vec<RawDataPoint>,
}

/// Response of `/api/bulk/{ips}/{duration}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BulkServerData {
    #[serde(default)]
    pub data: HashMap<String, Vec<RawDataPoint>>,
}

/// Drops invalid samples and orders the rest by time.
pub fn sanitize_points(points: &[RawDataPoint]) -> Vec<ServerDataPoint> {
    let mut valid: Vec<ServerDataPoint> = points.iter().filter_map(RawDataPoint::validate).collect();
    valid.sort_by_key(|point| point.timestamp);
    valid
}

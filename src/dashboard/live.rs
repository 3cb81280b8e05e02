//! Validation of live samples carried by `data_point_add` / `data_point_rt`.
//!
//! The connection manager forwards these messages untouched; every consumer
//! runs the payload through [`parse_live_data_payload`] and drops what fails.

use super::model::ServerDataPoint;
use crate::types::MAX_PLAYER_COUNT;
use serde_json::{Map, Value};

const IP_KEYS: [&str; 3] = ["ip", "Ip", "IP"];
const NAME_KEYS: [&str; 2] = ["name", "Name"];
const COUNT_KEYS: [&str; 3] = ["player_count", "playerCount", "PlayerCount"];
const TIMESTAMP_KEYS: [&str; 4] = ["timestamp", "Timestamp", "ts", "Ts"];

/// First non-null value among `keys`
fn lookup<'a>(raw: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| raw.get(*key))
        .find(|value| !value.is_null())
}

/// Accepts JSON numbers and non-blank numeric strings; rejects non-finite values.
fn normalize_to_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Turns a live payload into a sample, or `None` if it is unusable.
///
/// Rules: `ip` must be a non-empty string; `name` falls back to the ip when
/// missing or blank; the player count must lie in `0..=100000` and is rounded;
/// the timestamp must be present and is floored to whole seconds.
pub fn parse_live_data_payload(payload: &Value) -> Option<ServerDataPoint> {
    let raw = payload.as_object()?;

    let ip = lookup(raw, &IP_KEYS)
        .and_then(Value::as_str)
        .filter(|ip| !ip.is_empty())?;

    let name = lookup(raw, &NAME_KEYS)
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(ip);

    let player_count = lookup(raw, &COUNT_KEYS)
        .and_then(normalize_to_number)
        .filter(|count| (0.0..=MAX_PLAYER_COUNT).contains(count))?;

    let timestamp = lookup(raw, &TIMESTAMP_KEYS).and_then(normalize_to_number)?;

    Some(ServerDataPoint {
        timestamp: timestamp.floor() as i64,
        player_count: player_count.round() as u32,
        ip: ip.to_string(),
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_canonical_payload() {
        let point = parse_live_data_payload(&json!({
            "ip": "mc.example.net",
            "name": "Example",
            "player_count": 1520,
            "timestamp": 1_700_000_000,
        }))
        .unwrap();

        assert_eq!(
            point,
            ServerDataPoint {
                timestamp: 1_700_000_000,
                player_count: 1520,
                ip: "mc.example.net".to_string(),
                name: "Example".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_alternate_keys_and_strings() {
        let point = parse_live_data_payload(&json!({
            "IP": "play.example.org",
            "PlayerCount": " 41.6 ",
            "Ts": "1700000000.9",
        }))
        .unwrap();

        assert_eq!(point.ip, "play.example.org");
        assert_eq!(point.name, "play.example.org");
        assert_eq!(point.player_count, 42);
        assert_eq!(point.timestamp, 1_700_000_000);
    }

    #[test]
    fn test_blank_name_falls_back_to_ip() {
        let point = parse_live_data_payload(&json!({
            "ip": "a", "name": "   ", "player_count": 1, "timestamp": 1,
        }))
        .unwrap();
        assert_eq!(point.name, "a");
    }

    #[test]
    fn test_rejects_invalid_samples() {
        let cases = [
            json!({"ip": "x", "player_count": -1, "timestamp": 1}),
            json!({"ip": "x", "player_count": 200_000, "timestamp": 1}),
            json!({"ip": "x", "player_count": 5}),
            json!({"ip": "x", "player_count": "abc", "timestamp": 1}),
            json!({"ip": "x", "player_count": "", "timestamp": 1}),
            json!({"ip": "x", "player_count": 5, "timestamp": "inf"}),
            json!({"ip": "", "player_count": 5, "timestamp": 1}),
            json!({"ip": 7, "player_count": 5, "timestamp": 1}),
            json!({"player_count": 5, "timestamp": 1}),
            json!("x"),
            Value::Null,
        ];

        for case in cases {
            assert!(
                parse_live_data_payload(&case).is_none(),
                "expected rejection for {case}"
            );
        }
    }
}

//! Environment-driven configuration for the dashboard client.

use crate::client::ManagerOptions;
use crate::types::{MAX_RECONNECT_ATTEMPTS, RECONNECT_INTERVAL, env_vars};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Live endpoint; `None` leaves the connection manager unconfigured
    pub ws_url: Option<String>,
    /// REST origin; `None` disables historical queries
    pub api_url: Option<String>,
    pub max_reconnect_attempts: u32,
    pub reconnect_interval: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            ws_url: None,
            api_url: None,
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
            reconnect_interval: Duration::from_millis(RECONNECT_INTERVAL),
        }
    }
}

impl DashboardConfig {
    /// Reads `MCPULSE_WS_URL`, `MCPULSE_API_URL`, `MCPULSE_RECONNECT_ATTEMPTS`
    /// and `MCPULSE_RECONNECT_INTERVAL_MS` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    ///
    /// Blank values count as unset. Numbers that do not parse are logged and
    /// replaced by the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let defaults = Self::default();
        let max_reconnect_attempts = parse_or(
            env_vars::RECONNECT_ATTEMPTS,
            value(env_vars::RECONNECT_ATTEMPTS),
            defaults.max_reconnect_attempts,
        );
        let reconnect_interval = parse_or(
            env_vars::RECONNECT_INTERVAL_MS,
            value(env_vars::RECONNECT_INTERVAL_MS),
            RECONNECT_INTERVAL,
        );

        Self {
            ws_url: value(env_vars::WS_URL),
            api_url: value(env_vars::API_URL),
            max_reconnect_attempts,
            reconnect_interval: Duration::from_millis(reconnect_interval),
        }
    }

    pub fn with_ws_url(mut self, url: impl Into<String>) -> Self {
        self.ws_url = Some(url.into());
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn manager_options(&self) -> ManagerOptions {
        ManagerOptions {
            endpoint: self.ws_url.clone(),
            max_reconnect_attempts: self.max_reconnect_attempts,
            reconnect_interval: self.reconnect_interval,
        }
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!("Ignoring invalid {}='{}', using {}", key, raw, default);
            default
        }
    }
}

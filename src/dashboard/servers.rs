use super::model::Server;
use crate::types::{InboundMessage, PulseError, Result};
use serde::Deserialize;
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

/// Card ordering on the overview page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOption {
    #[default]
    MostPlayers,
    LeastPlayers,
    HighestPeak,
    LowestPeak,
}

impl SortOption {
    pub const ALL: [SortOption; 4] = [
        Self::MostPlayers,
        Self::LeastPlayers,
        Self::HighestPeak,
        Self::LowestPeak,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MostPlayers => "most-players",
            Self::LeastPlayers => "least-players",
            Self::HighestPeak => "highest-peak",
            Self::LowestPeak => "lowest-peak",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::MostPlayers => "Most Players",
            Self::LeastPlayers => "Least Players",
            Self::HighestPeak => "Highest Peak",
            Self::LowestPeak => "Lowest Peak",
        }
    }
}

impl FromStr for SortOption {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|option| option.as_str() == s)
            .ok_or_else(|| PulseError::Config(format!("unknown sort option '{}'", s)))
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize)]
struct ServersUpdate {
    #[serde(default)]
    servers: Option<Vec<Server>>,
}

/// The current server list, replaced wholesale by every `servers_update`.
#[derive(Debug, Clone, Default)]
pub struct ServerDirectory {
    servers: Vec<Server>,
}

impl ServerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a `servers_update` message. Returns `false` if it carried no list.
    pub fn apply_update(&mut self, message: &InboundMessage) -> bool {
        match message.decode::<ServersUpdate>() {
            Ok(ServersUpdate {
                servers: Some(servers),
            }) => {
                self.replace(servers);
                true
            }
            Ok(_) => false,
            Err(e) => {
                tracing::warn!("Ignoring malformed servers_update: {}", e);
                false
            }
        }
    }

    pub fn replace(&mut self, servers: Vec<Server>) {
        self.servers = servers;
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn get(&self, ip: &str) -> Option<&Server> {
        self.servers.iter().find(|server| server.ip == ip)
    }

    pub fn ips(&self) -> Vec<String> {
        self.servers.iter().map(|server| server.ip.clone()).collect()
    }

    pub fn total_players(&self) -> u64 {
        self.servers
            .iter()
            .map(|server| u64::from(server.player_count))
            .sum()
    }

    /// A sorted copy; ties keep their original order.
    pub fn sorted(&self, option: SortOption) -> Vec<Server> {
        let mut servers = self.servers.clone();
        match option {
            SortOption::MostPlayers => servers.sort_by_key(|s| Reverse(s.player_count)),
            SortOption::LeastPlayers => servers.sort_by_key(|s| s.player_count),
            SortOption::HighestPeak => servers.sort_by_key(|s| Reverse(s.peak)),
            SortOption::LowestPeak => servers.sort_by_key(|s| s.peak),
        }
        servers
    }

    /// Most populated first, narrowed to names or ips containing `search`
    /// (case-insensitive, surrounding whitespace ignored).
    pub fn ranked(&self, search: &str) -> Vec<&Server> {
        let term = search.trim().to_lowercase();
        let mut ranked: Vec<&Server> = self
            .servers
            .iter()
            .filter(|server| {
                term.is_empty()
                    || server.name.to_lowercase().contains(&term)
                    || server.ip.to_lowercase().contains(&term)
            })
            .collect();
        ranked.sort_by_key(|server| Reverse(server.player_count));
        ranked
    }
}

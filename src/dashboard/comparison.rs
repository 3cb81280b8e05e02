//! Multi-server comparison: which servers are selected and how their
//! histories are merged into one chart table.

use super::model::{BulkServerData, ServerDataPoint, sanitize_points};
use super::series::downsample_keep_last;
use crate::types::COMPARISON_POINTS;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Column key for a server in the merged table
pub fn series_key(ip: &str) -> String {
    let safe: String = ip
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("series_{}", safe)
}

/// Selected servers, kept in step with the server list.
///
/// The first non-empty list selects everything. When every server was
/// selected, the selection follows the list as it changes; otherwise
/// servers that disappeared are dropped and the rest kept.
#[derive(Debug, Clone, Default)]
pub struct ComparisonSelection {
    selected: Vec<String>,
    initialized: bool,
    prev_server_count: usize,
}

impl ComparisonSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, ip: &str) -> bool {
        self.selected.iter().any(|s| s == ip)
    }

    /// Updates the selection for a new server list. Returns whether it changed.
    pub fn reconcile(&mut self, server_ips: &[String]) -> bool {
        if server_ips.is_empty() {
            self.prev_server_count = 0;
            self.initialized = false;
            return false;
        }

        let prev_count = std::mem::replace(&mut self.prev_server_count, server_ips.len());

        if !self.initialized {
            self.initialized = true;
            return self.assign(server_ips.to_vec());
        }

        let filtered: Vec<String> = self
            .selected
            .iter()
            .filter(|ip| server_ips.contains(ip))
            .cloned()
            .collect();
        let was_all_selected = prev_count > 0 && self.selected.len() == prev_count;

        if was_all_selected {
            if filtered.as_slice() == server_ips {
                return false;
            }
            return self.assign(server_ips.to_vec());
        }

        if filtered.len() != self.selected.len() {
            return self.assign(filtered);
        }
        false
    }

    /// Replaces the selection with `ips`, dropping duplicates.
    pub fn set<I, S>(&mut self, ips: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.initialized = true;
        let mut seen = HashSet::new();
        self.selected = ips
            .into_iter()
            .map(Into::into)
            .filter(|ip: &String| seen.insert(ip.clone()))
            .collect();
    }

    /// Adds `ip` if absent, removes it otherwise. Returns whether it is now selected.
    pub fn toggle(&mut self, ip: &str) -> bool {
        self.initialized = true;
        if let Some(index) = self.selected.iter().position(|s| s == ip) {
            self.selected.remove(index);
            false
        } else {
            self.selected.push(ip.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.set(Vec::<String>::new());
    }

    fn assign(&mut self, ips: Vec<String>) -> bool {
        if self.selected == ips {
            return false;
        }
        self.selected = ips;
        true
    }
}

/// One row of the merged table: a millisecond timestamp and the player
/// count of every selected server sampled at that instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    pub timestamp: i64,
    #[serde(flatten)]
    pub values: BTreeMap<String, u32>,
}

/// Per-server summary under the comparison chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonStats {
    pub ip: String,
    pub key: String,
    pub current: u32,
    pub max: u32,
    pub avg: u32,
}

/// Sanitized histories for one time range, keyed by ip.
#[derive(Debug, Clone, Default)]
pub struct ComparisonData {
    series: HashMap<String, Vec<ServerDataPoint>>,
}

impl ComparisonData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected ips with no history loaded yet
    pub fn missing(&self, selected: &[String]) -> Vec<String> {
        selected
            .iter()
            .filter(|ip| !self.series.contains_key(*ip))
            .cloned()
            .collect()
    }

    /// Stores the bulk response for `requested`; ips absent from the
    /// response are recorded as empty so they are not fetched again.
    pub fn absorb(&mut self, requested: &[String], bulk: &BulkServerData) {
        for ip in requested {
            let points = bulk
                .data
                .get(ip)
                .map(|raw| sanitize_points(raw))
                .unwrap_or_default();
            self.series.insert(ip.clone(), points);
        }
    }

    pub fn get(&self, ip: &str) -> Option<&[ServerDataPoint]> {
        self.series.get(ip).map(Vec::as_slice)
    }

    /// Merges the selected series on timestamp and downsamples the result.
    pub fn rows(&self, selected: &[String]) -> Vec<ComparisonRow> {
        let mut merged: BTreeMap<i64, BTreeMap<String, u32>> = BTreeMap::new();

        for ip in selected {
            let Some(points) = self.series.get(ip) else {
                continue;
            };
            let key = series_key(ip);
            for point in points {
                merged
                    .entry(point.timestamp * 1000)
                    .or_default()
                    .insert(key.clone(), point.player_count);
            }
        }

        let rows: Vec<ComparisonRow> = merged
            .into_iter()
            .map(|(timestamp, values)| ComparisonRow { timestamp, values })
            .collect();
        downsample_keep_last(&rows, COMPARISON_POINTS)
    }

    /// Y axis bounds over the selected series, padded by 10% (at least 1)
    /// and never below zero. `(0, 1)` when there is nothing to show.
    pub fn y_domain(&self, selected: &[String]) -> (f64, f64) {
        let counts = selected
            .iter()
            .filter_map(|ip| self.series.get(ip))
            .flatten()
            .map(|point| f64::from(point.player_count));

        let bounds = counts.fold(None, |bounds: Option<(f64, f64)>, count| {
            Some(match bounds {
                Some((min, max)) => (min.min(count), max.max(count)),
                None => (count, count),
            })
        });

        let Some((min, max)) = bounds else {
            return (0.0, 1.0);
        };
        let padding = ((max - min) * 0.1).max(1.0);
        ((min - padding).max(0.0), max + padding)
    }

    pub fn stats(&self, selected: &[String]) -> Vec<ComparisonStats> {
        selected
            .iter()
            .map(|ip| {
                let points = self.series.get(ip).map(Vec::as_slice).unwrap_or_default();
                let current = points.last().map_or(0, |p| p.player_count);
                let max = points.iter().map(|p| p.player_count).max().unwrap_or(0);
                let avg = if points.is_empty() {
                    0
                } else {
                    let sum: u64 = points.iter().map(|p| u64::from(p.player_count)).sum();
                    (sum as f64 / points.len() as f64).round() as u32
                };

                ComparisonStats {
                    ip: ip.clone(),
                    key: series_key(ip),
                    current,
                    max,
                    avg,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::model::RawDataPoint;

    fn ips(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn raw(timestamp: f64, player_count: f64) -> RawDataPoint {
        RawDataPoint {
            timestamp: Some(timestamp),
            player_count: Some(player_count),
            ip: None,
            name: None,
        }
    }

    #[test]
    fn test_series_key() {
        assert_eq!(series_key("mc.hypixel.net"), "series_mc_hypixel_net");
        assert_eq!(series_key("play-1.example:25565"), "series_play_1_example_25565");
    }

    #[test]
    fn test_first_list_selects_all() {
        let mut selection = ComparisonSelection::new();
        assert!(selection.reconcile(&ips(&["a", "b", "c"])));
        assert_eq!(selection.selected(), ips(&["a", "b", "c"]).as_slice());
    }

    #[test]
    fn test_all_selected_follows_list() {
        let mut selection = ComparisonSelection::new();
        selection.reconcile(&ips(&["a", "b"]));

        assert!(selection.reconcile(&ips(&["a", "b", "c"])));
        assert_eq!(selection.selected(), ips(&["a", "b", "c"]).as_slice());

        assert!(!selection.reconcile(&ips(&["a", "b", "c"])));
    }

    #[test]
    fn test_partial_selection_drops_vanished() {
        let mut selection = ComparisonSelection::new();
        selection.reconcile(&ips(&["a", "b", "c"]));
        selection.set(["a", "c", "a"]);
        assert_eq!(selection.selected(), ips(&["a", "c"]).as_slice());

        // new servers are not added to a partial selection
        assert!(!selection.reconcile(&ips(&["a", "b", "c", "d"])));
        assert!(selection.reconcile(&ips(&["b", "c", "d"])));
        assert_eq!(selection.selected(), ips(&["c"]).as_slice());
    }

    #[test]
    fn test_empty_list_resets_initialization() {
        let mut selection = ComparisonSelection::new();
        selection.reconcile(&ips(&["a", "b"]));
        selection.toggle("a");
        assert_eq!(selection.selected(), ips(&["b"]).as_slice());

        selection.reconcile(&[]);
        assert!(selection.reconcile(&ips(&["x", "y"])));
        assert_eq!(selection.selected(), ips(&["x", "y"]).as_slice());
    }

    #[test]
    fn test_rows_merge_on_timestamp() {
        let mut data = ComparisonData::new();
        let mut bulk = BulkServerData::default();
        bulk.data.insert("a.net".into(), vec![raw(2.0, 20.0), raw(1.0, 10.0)]);
        bulk.data.insert("b.net".into(), vec![raw(2.0, 5.0), raw(3.0, -1.0)]);
        let selected = ips(&["a.net", "b.net", "c.net"]);
        data.absorb(&selected, &bulk);

        assert!(data.missing(&selected).is_empty());
        assert_eq!(data.get("c.net"), Some(&[][..]));

        let rows = data.rows(&selected);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].timestamp, 1000);
        assert_eq!(rows[0].values.get("series_a_net"), Some(&10));
        assert_eq!(rows[0].values.get("series_b_net"), None);
        assert_eq!(rows[1].values.get("series_b_net"), Some(&5));

        let json = serde_json::to_value(&rows[1]).unwrap();
        assert_eq!(json["timestamp"], 2000);
        assert_eq!(json["series_a_net"], 20);
    }

    #[test]
    fn test_rows_are_downsampled_keeping_last() {
        let mut data = ComparisonData::new();
        let mut bulk = BulkServerData::default();
        bulk.data.insert(
            "a".into(),
            (0..1000).map(|ts| raw(ts as f64, 1.0)).collect(),
        );
        data.absorb(&ips(&["a"]), &bulk);

        let rows = data.rows(&ips(&["a"]));
        assert!(rows.len() <= COMPARISON_POINTS + 1);
        assert_eq!(rows.last().map(|r| r.timestamp), Some(999_000));
    }

    #[test]
    fn test_y_domain() {
        let mut data = ComparisonData::new();
        assert_eq!(data.y_domain(&ips(&["a"])), (0.0, 1.0));

        let mut bulk = BulkServerData::default();
        bulk.data.insert("a".into(), vec![raw(1.0, 100.0), raw(2.0, 200.0)]);
        bulk.data.insert("b".into(), vec![raw(1.0, 3.0)]);
        data.absorb(&ips(&["a", "b"]), &bulk);

        assert_eq!(data.y_domain(&ips(&["a"])), (90.0, 210.0));
        assert_eq!(data.y_domain(&ips(&["b"])), (2.0, 4.0));
        let (low, high) = data.y_domain(&ips(&["a", "b"]));
        assert_eq!(low, 0.0);
        assert!((high - 219.7).abs() < 1e-9);
    }

    #[test]
    fn test_stats() {
        let mut data = ComparisonData::new();
        let mut bulk = BulkServerData::default();
        bulk.data.insert("a".into(), vec![raw(1.0, 1.0), raw(2.0, 4.0)]);
        data.absorb(&ips(&["a"]), &bulk);

        let stats = data.stats(&ips(&["a", "z"]));
        assert_eq!((stats[0].current, stats[0].max, stats[0].avg), (4, 4, 3));
        assert_eq!((stats[1].current, stats[1].max, stats[1].avg), (0, 0, 0));
    }
}

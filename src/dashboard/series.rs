use super::model::{RawDataPoint, ServerDataPoint};
use crate::types::MAX_SERIES_POINTS;

/// Summary shown on a server card
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeriesStats {
    pub current: u32,
    pub peak: u32,
    pub average: u32,
}

impl SeriesStats {
    pub fn from_points(points: &[ServerDataPoint]) -> Self {
        let Some(last) = points.last() else {
            return Self::default();
        };

        let peak = points.iter().map(|p| p.player_count).max().unwrap_or(0);
        let sum: u64 = points.iter().map(|p| u64::from(p.player_count)).sum();
        let average = (sum as f64 / points.len() as f64).round() as u32;

        Self {
            current: last.player_count,
            peak,
            average,
        }
    }
}

/// Time-ordered samples for one server.
///
/// Holds at most one sample per timestamp and at most `capacity` samples;
/// the oldest are dropped first.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    ip: String,
    points: Vec<ServerDataPoint>,
    capacity: usize,
}

impl SeriesBuffer {
    pub fn new(ip: impl Into<String>) -> Self {
        Self::with_capacity(ip, MAX_SERIES_POINTS)
    }

    pub fn with_capacity(ip: impl Into<String>, capacity: usize) -> Self {
        Self {
            ip: ip.into(),
            points: Vec::new(),
            capacity,
        }
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn points(&self) -> &[ServerDataPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&ServerDataPoint> {
        self.points.last()
    }

    /// Replaces the contents with a historical query result.
    ///
    /// Besides the range checks, history samples must name their server.
    pub fn load_history(&mut self, history: &[RawDataPoint]) -> usize {
        let mut points: Vec<ServerDataPoint> = history
            .iter()
            .filter(|raw| raw.has_identity())
            .filter_map(RawDataPoint::validate)
            .collect();
        points.sort_by_key(|point| point.timestamp);
        points.dedup_by_key(|point| point.timestamp);

        self.points = points;
        self.trim();
        self.points.len()
    }

    /// Inserts a sample in timestamp order.
    ///
    /// Returns `false` for a sample of another server or a timestamp that is
    /// already present.
    pub fn push(&mut self, point: ServerDataPoint) -> bool {
        if point.ip != self.ip {
            return false;
        }

        match self
            .points
            .binary_search_by_key(&point.timestamp, |existing| existing.timestamp)
        {
            Ok(_) => false,
            Err(index) => {
                self.points.insert(index, point);
                self.trim();
                true
            }
        }
    }

    pub fn stats(&self) -> SeriesStats {
        SeriesStats::from_points(&self.points)
    }

    /// Player counts reduced to roughly `max_points` values for a sparkline
    pub fn sparkline(&self, max_points: usize) -> Vec<u32> {
        let counts: Vec<u32> = self.points.iter().map(|p| p.player_count).collect();
        downsample(&counts, max_points)
    }

    fn trim(&mut self) {
        if self.points.len() > self.capacity {
            let excess = self.points.len() - self.capacity;
            self.points.drain(..excess);
        }
    }
}

/// Keeps every `ceil(len / max_points)`-th element, starting with the first.
pub fn downsample<T: Clone>(data: &[T], max_points: usize) -> Vec<T> {
    if max_points == 0 {
        return Vec::new();
    }
    if data.len() <= max_points {
        return data.to_vec();
    }

    let step = data.len().div_ceil(max_points);
    data.iter().step_by(step).cloned().collect()
}

/// Like [`downsample`], but always ends with the final element.
pub fn downsample_keep_last<T: Clone>(data: &[T], max_points: usize) -> Vec<T> {
    if max_points == 0 || data.len() <= max_points {
        return downsample(data, max_points);
    }

    let step = data.len().div_ceil(max_points);
    let mut result = downsample(data, max_points);
    if (data.len() - 1) % step != 0
        && let Some(last) = data.last()
    {
        result.push(last.clone());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(timestamp: i64, player_count: u32) -> ServerDataPoint {
        ServerDataPoint {
            timestamp,
            player_count,
            ip: "x".to_string(),
            name: "X".to_string(),
        }
    }

    #[test]
    fn test_push_orders_and_dedupes() {
        let mut buffer = SeriesBuffer::new("x");
        assert!(buffer.push(point(30, 3)));
        assert!(buffer.push(point(10, 1)));
        assert!(buffer.push(point(20, 2)));
        assert!(!buffer.push(point(20, 99)));

        let timestamps: Vec<i64> = buffer.points().iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, vec![10, 20, 30]);
        assert_eq!(buffer.points()[1].player_count, 2);
    }

    #[test]
    fn test_push_ignores_other_servers() {
        let mut buffer = SeriesBuffer::new("x");
        let mut foreign = point(1, 1);
        foreign.ip = "y".to_string();
        assert!(!buffer.push(foreign));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut buffer = SeriesBuffer::with_capacity("x", 3);
        for ts in 1..=5 {
            buffer.push(point(ts, ts as u32));
        }
        let timestamps: Vec<i64> = buffer.points().iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, vec![3, 4, 5]);
    }

    #[test]
    fn test_load_history_requires_identity() {
        let mut buffer = SeriesBuffer::new("x");
        let history = vec![
            RawDataPoint {
                timestamp: Some(2.0),
                player_count: Some(5.0),
                ip: Some("x".to_string()),
                name: Some("X".to_string()),
            },
            RawDataPoint {
                timestamp: Some(1.0),
                player_count: Some(4.0),
                ip: Some("x".to_string()),
                name: None,
            },
            RawDataPoint {
                timestamp: Some(3.0),
                player_count: Some(-2.0),
                ip: Some("x".to_string()),
                name: Some("X".to_string()),
            },
        ];

        assert_eq!(buffer.load_history(&history), 1);
        assert_eq!(buffer.latest().map(|p| p.timestamp), Some(2));
    }

    #[test]
    fn test_stats() {
        let mut buffer = SeriesBuffer::new("x");
        assert_eq!(buffer.stats(), SeriesStats::default());

        buffer.push(point(1, 10));
        buffer.push(point(2, 30));
        buffer.push(point(3, 15));
        assert_eq!(
            buffer.stats(),
            SeriesStats {
                current: 15,
                peak: 30,
                average: 18,
            }
        );
    }

    #[test]
    fn test_sparkline_downsampling() {
        let mut buffer = SeriesBuffer::new("x");
        for ts in 0..120 {
            buffer.push(point(ts, ts as u32));
        }

        let line = buffer.sparkline(50);
        // step = ceil(120 / 50) = 3
        assert_eq!(line.len(), 40);
        assert_eq!(&line[..3], &[0, 3, 6]);

        assert_eq!(buffer.sparkline(500).len(), 120);
        assert!(buffer.sparkline(0).is_empty());
    }

    #[test]
    fn test_downsample_keep_last() {
        let data: Vec<u32> = (0..10).collect();
        // step = ceil(10 / 4) = 3 -> 0, 3, 6, 9 already ends on the last element
        assert_eq!(downsample_keep_last(&data, 4), vec![0, 3, 6, 9]);

        let data: Vec<u32> = (0..11).collect();
        // step = 3 -> 0, 3, 6, 9 then the final 10
        assert_eq!(downsample_keep_last(&data, 4), vec![0, 3, 6, 9, 10]);

        assert_eq!(downsample_keep_last(&data, 20), data);
    }
}

//! Consumers that keep dashboard state current from the live feed.

use super::live::parse_live_data_payload;
use super::series::SeriesBuffer;
use super::servers::ServerDirectory;
use crate::client::ConnectionManager;
use crate::messaging::{MessageHandler, Subscription};
use crate::types::{InboundMessage, message_types};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct FeedCounters {
    accepted: AtomicUsize,
    rejected: AtomicUsize,
}

/// Feeds live samples for one server into a shared [`SeriesBuffer`].
///
/// Listens on both `data_point_add` and `data_point_rt`. Samples that fail
/// validation, belong to another server, or repeat a known timestamp are
/// dropped here; the connection manager forwards everything.
#[derive(Debug)]
pub struct LiveSeries {
    buffer: Arc<Mutex<SeriesBuffer>>,
    counters: Arc<FeedCounters>,
    subscriptions: Vec<Subscription>,
}

impl LiveSeries {
    pub fn attach(manager: &ConnectionManager, buffer: Arc<Mutex<SeriesBuffer>>) -> Self {
        let ip = lock(&buffer).ip().to_string();
        let counters = Arc::new(FeedCounters::default());

        let handler = {
            let buffer = Arc::clone(&buffer);
            let counters = Arc::clone(&counters);
            MessageHandler::new(move |message: &InboundMessage| {
                let Some(point) = message.data().and_then(parse_live_data_payload) else {
                    counters.rejected.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!("Dropping invalid live sample: {}", message.body());
                    return;
                };
                if point.ip != ip {
                    return;
                }
                if lock(&buffer).push(point) {
                    counters.accepted.fetch_add(1, Ordering::Relaxed);
                }
            })
        };

        let subscriptions = vec![
            manager.on(message_types::DATA_POINT_ADD, &handler),
            manager.on(message_types::DATA_POINT_RT, &handler),
        ];

        Self {
            buffer,
            counters,
            subscriptions,
        }
    }

    /// Attaches a fresh, empty buffer for `ip`
    pub fn follow(manager: &ConnectionManager, ip: impl Into<String>) -> Self {
        Self::attach(manager, Arc::new(Mutex::new(SeriesBuffer::new(ip))))
    }

    pub fn buffer(&self) -> &Arc<Mutex<SeriesBuffer>> {
        &self.buffer
    }

    /// Samples added to the buffer so far
    pub fn accepted(&self) -> usize {
        self.counters.accepted.load(Ordering::Relaxed)
    }

    /// Samples dropped for failing validation
    pub fn rejected(&self) -> usize {
        self.counters.rejected.load(Ordering::Relaxed)
    }

    /// Stops listening. The buffer keeps what it has.
    pub fn detach(self) -> Arc<Mutex<SeriesBuffer>> {
        for subscription in self.subscriptions {
            subscription.unsubscribe();
        }
        self.buffer
    }
}

/// Keeps a shared [`ServerDirectory`] in step with `servers_update`.
#[derive(Debug)]
pub struct ServerFeed {
    directory: Arc<Mutex<ServerDirectory>>,
    subscription: Subscription,
}

impl ServerFeed {
    pub fn attach(manager: &ConnectionManager, directory: Arc<Mutex<ServerDirectory>>) -> Self {
        let handler = {
            let directory = Arc::clone(&directory);
            MessageHandler::new(move |message: &InboundMessage| {
                if lock(&directory).apply_update(message) {
                    tracing::debug!("Server list replaced");
                }
            })
        };

        let subscription = manager.on(message_types::SERVERS_UPDATE, &handler);
        Self {
            directory,
            subscription,
        }
    }

    pub fn directory(&self) -> &Arc<Mutex<ServerDirectory>> {
        &self.directory
    }

    pub fn detach(self) -> Arc<Mutex<ServerDirectory>> {
        self.subscription.unsubscribe();
        self.directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ManagerOptions;

    // No endpoint: the manager stays idle and messages are routed by hand.
    fn idle_manager() -> ConnectionManager {
        ConnectionManager::new(ManagerOptions::default())
    }

    #[tokio::test]
    async fn test_live_series_filters_and_counts() {
        let manager = idle_manager();
        let series = LiveSeries::attach(
            &manager,
            Arc::new(Mutex::new(SeriesBuffer::new("a.net"))),
        );
        assert_eq!(manager.handler_count("data_point_add"), 1);
        assert_eq!(manager.handler_count("data_point_rt"), 1);

        for text in [
            r#"{"type":"data_point_add","data":{"ip":"a.net","player_count":5,"timestamp":10}}"#,
            r#"{"type":"data_point_rt","data":{"ip":"a.net","player_count":6,"timestamp":11}}"#,
            r#"{"type":"data_point_rt","data":{"ip":"a.net","player_count":7,"timestamp":11}}"#,
            r#"{"type":"data_point_rt","data":{"ip":"b.net","player_count":8,"timestamp":12}}"#,
            r#"{"type":"data_point_rt","data":{"ip":"a.net","player_count":-8,"timestamp":13}}"#,
            r#"{"type":"data_point_rt"}"#,
        ] {
            manager.router.route_text(text);
        }

        assert_eq!(series.accepted(), 2);
        assert_eq!(series.rejected(), 2);
        let buffer = series.detach();
        assert_eq!(manager.handler_count("data_point_add"), 0);
        assert_eq!(manager.handler_count("data_point_rt"), 0);

        let buffer = lock(&buffer);
        let counts: Vec<u32> = buffer.points().iter().map(|p| p.player_count).collect();
        assert_eq!(counts, vec![5, 6]);
    }

    #[tokio::test]
    async fn test_server_feed_replaces_directory() {
        let manager = idle_manager();
        let feed = ServerFeed::attach(&manager, Arc::new(Mutex::new(ServerDirectory::new())));

        manager.router.route_text(
            r#"{"type":"servers_update","servers":[{"name":"A","ip":"a","player_count":3,"peak":4}]}"#,
        );
        assert_eq!(lock(feed.directory()).total_players(), 3);

        let directory = feed.detach();
        assert_eq!(manager.handler_count("servers_update"), 0);
        manager
            .router
            .route_text(r#"{"type":"servers_update","servers":[]}"#);
        assert_eq!(lock(&directory).len(), 1);
    }
}

use mcpulse::dashboard::{SortOption, TimeRange};
use mcpulse::types::SPARKLINE_POINTS;
use mcpulse::{
    ConnectionListener, DashboardConfig, DashboardContext, LiveSeries, SeriesBuffer,
    ServerDirectory, ServerFeed,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Terminal rendition of the dashboard: server ranking plus a live series
/// for the most populated server.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mcpulse=info")),
        )
        .init();

    let context = DashboardContext::init(DashboardConfig::from_env());
    println!("📡 Live feed: {:?}", context.live().config_status());

    let _status = context
        .live()
        .subscribe_to_connection(ConnectionListener::new(|connected| {
            println!("{}", if connected { "🟢 Connected" } else { "🔴 Disconnected" });
        }));

    let directory = Arc::new(Mutex::new(ServerDirectory::new()));
    if let Some(api) = context.api() {
        let servers = api.servers().await?;
        println!("📋 {} servers from the REST API", servers.len());
        directory.lock().map_err(|_| "directory lock poisoned")?.replace(servers);
    }
    let feed = ServerFeed::attach(context.live(), Arc::clone(&directory));

    // Follow the busiest known server, seeded with a day of history
    let top = directory
        .lock()
        .map_err(|_| "directory lock poisoned")?
        .sorted(SortOption::MostPlayers)
        .first()
        .map(|server| server.ip.clone());
    let series = match top {
        Some(ip) => {
            let mut buffer = SeriesBuffer::new(ip.clone());
            if let Some(api) = context.api() {
                let history = api.data_points(&ip, TimeRange::OneDay).await?;
                let loaded = buffer.load_history(&history.data);
                println!("📈 {} history samples for {} (step {})", loaded, ip, history.step);
            }
            Some(LiveSeries::attach(context.live(), Arc::new(Mutex::new(buffer))))
        }
        None => None,
    };

    let mut ticker = tokio::time::interval(Duration::from_secs(10));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                render(feed.directory(), series.as_ref());
            }
        }
    }

    println!("👋 Shutting down");
    if let Some(series) = series {
        series.detach();
    }
    feed.detach();
    context.shutdown().await;
    Ok(())
}

fn render(directory: &Mutex<ServerDirectory>, series: Option<&LiveSeries>) {
    let Ok(directory) = directory.lock() else {
        return;
    };
    println!(
        "\n👥 {} players across {} servers",
        directory.total_players(),
        directory.len()
    );
    for server in directory.sorted(SortOption::MostPlayers).iter().take(5) {
        println!(
            "   {:<24} {:>7} online (peak {})",
            server.name, server.player_count, server.peak
        );
    }

    if let Some(series) = series
        && let Ok(buffer) = series.buffer().lock()
    {
        let stats = buffer.stats();
        println!(
            "📊 {}: now {} / peak {} / avg {} ({} samples, {} live)",
            buffer.ip(),
            stats.current,
            stats.peak,
            stats.average,
            buffer.len(),
            series.accepted()
        );
        println!("   {:?}", buffer.sparkline(SPARKLINE_POINTS));
    }
}

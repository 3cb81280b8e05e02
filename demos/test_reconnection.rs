use mcpulse::{ConnectionListener, ConnectionManager, ConnectionPhase, ManagerOptions};
use std::time::Duration;

/// Watch reconnection behaviour against a real live endpoint
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing to see logs
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("🦀 Testing reconnection against a live feed\n");

    let url = std::env::var("MCPULSE_WS_URL").map_err(|_| "MCPULSE_WS_URL must be set in .env")?;
    println!("📡 Connecting to: {}\n", url);

    let manager = ConnectionManager::new(ManagerOptions {
        reconnect_interval: Duration::from_secs(2),
        ..ManagerOptions::with_endpoint(url)
    });
    let _status = manager.subscribe_to_connection(ConnectionListener::new(|connected| {
        println!(
            "\n🔔 Connection state changed: {}",
            if connected { "🟢 up" } else { "🔴 down" }
        );
    }));

    // Test 1: Connect and verify
    println!("✅ Test 1: Initial connection...");
    let mut state = manager.watch_connection();
    tokio::time::timeout(Duration::from_secs(10), state.wait_for(|connected| *connected))
        .await
        .map_err(|_| "Timed out waiting for the first connection")??;
    println!("✅ Connected successfully!\n");

    println!("⏳ Keeping connection alive for 30 seconds...");
    println!("💡 To trigger a reconnect:");
    println!("   1. While this is running, disable your network or restart the server");
    println!("   2. Re-enable it after a few seconds");
    println!("   3. Watch the logs for reconnection attempts\n");

    // Monitor connection status for 30 seconds
    for i in 1..=30 {
        tokio::time::sleep(Duration::from_secs(1)).await;
        print!(
            "\r⏱  Second {}/30 - Status: {} - Phase: {:?}        ",
            i,
            if manager.connection_state() {
                "🟢 Connected"
            } else {
                "🔴 Disconnected"
            },
            manager.phase()
        );
        std::io::Write::flush(&mut std::io::stdout())?;
    }
    println!("\n");

    // Test 2: Manual disconnect should NOT trigger reconnection
    println!("✅ Test 2: Manual disconnect (should NOT auto-reconnect)...");
    manager.disconnect().await;
    println!("⏳ Waiting 5 seconds to verify no auto-reconnect...");
    tokio::time::sleep(Duration::from_secs(5)).await;

    if manager.connection_state() || manager.phase() != ConnectionPhase::ShutDown {
        return Err("Should NOT reconnect after manual disconnect".into());
    }
    println!("✅ Correctly stayed disconnected after manual disconnect!\n");

    println!("🎉 Reconnection tests completed!");
    Ok(())
}

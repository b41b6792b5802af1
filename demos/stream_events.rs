//! Example: Following the SteamBots event stream.
//!
//! Prints every event, and trade events separately, until Ctrl-C.
//! Reads the key from `STEAMBOTS_API_KEY` (a `.env` file works too).
//!
//! Run with: cargo run --example stream_events

use steambots_api_client::SteamBots;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut client = SteamBots::from_env()?;

    let mut events = client.subscribe();
    let mut trades = client.subscribe_type("trade");
    client.open_stream(None)?;

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                println!("[{}] {}", event.event_type().unwrap_or("?"), event.payload());
            }
            Some(trade) = trades.recv() => {
                println!("trade {:?} updated", trade.id());
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    println!("Last cursor: {:?}", client.stream().last_cursor());
    client.close_stream();
    Ok(())
}

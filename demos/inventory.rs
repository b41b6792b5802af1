//! Example: REST calls against the SteamBots API.
//!
//! Lists bots, loads an inventory, and shows how API errors surface.
//!
//! Run with: cargo run --example inventory -- 76561197994468086

use steambots_api_client::rest::QueryParams;
use steambots_api_client::{SteamBots, SteamBotsApi, SteamBotsError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt::init();

    let client = SteamBots::from_env()?;
    let steam_id = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "76561197994468086".to_string());

    println!("=== Bots ===");
    println!("{}", client.get_bots().await?);

    println!("\n=== Inventory of {} ===", steam_id);
    match client.load_inventory(&steam_id).await {
        Ok(inventory) => println!("{}", inventory),
        Err(SteamBotsError::Api(err)) => println!("API refused: {}", err),
        Err(err) => return Err(err.into()),
    }

    println!("\n=== Recent trades ===");
    let filter = QueryParams::new().param("limit", 5);
    println!("{}", client.get_trades(Some(&filter)).await?);

    Ok(())
}

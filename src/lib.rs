//! # SteamBots Client
//!
//! An async Rust client library for the SteamBots trading-bot service.
//!
//! ## Features
//!
//! - REST API for bots, trades, deposits, withdrawals, inventories and items
//! - Event stream with automatic reconnection resumed from the last event id
//! - Generic and per-type event subscriptions
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use steambots_api_client::{SteamBots, SteamBotsApi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SteamBots::new("api_key");
//!     let bots = client.get_bots().await?;
//!     println!("Bots: {}", bots);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod rest;
pub mod stream;

// Re-export commonly used types at crate root
pub use client::{SteamBots, SteamBotsBuilder};
pub use error::{ApiError, SteamBotsError};
pub use rest::SteamBotsApi;
pub use stream::{Cursor, StreamEvent};

/// Result type alias using SteamBotsError
pub type Result<T> = std::result::Result<T, SteamBotsError>;

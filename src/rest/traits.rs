//! Trait definition for the SteamBots REST API.
//!
//! [`SteamBotsApi`] abstracts the endpoint helpers so callers can accept
//! either the REST client or the full [`SteamBots`](crate::SteamBots)
//! handle, or substitute a mock in their own tests.
//!
//! ```rust,ignore
//! use steambots_api_client::rest::SteamBotsApi;
//!
//! async fn count_bots<C: SteamBotsApi>(client: &C) -> steambots_api_client::Result<usize> {
//!     let bots = client.get_bots().await?;
//!     Ok(bots.as_array().map(Vec::len).unwrap_or(0))
//! }
//! ```

use std::future::Future;

use serde_json::Value;

use crate::error::SteamBotsError;
use crate::rest::SteamBotsRestClient;
use crate::rest::request::QueryParams;

/// The SteamBots REST operations.
pub trait SteamBotsApi: Send + Sync {
    /// List bots.
    fn get_bots(&self) -> impl Future<Output = Result<Value, SteamBotsError>> + Send;

    /// List trades.
    fn get_trades(
        &self,
        filter: Option<&QueryParams>,
    ) -> impl Future<Output = Result<Value, SteamBotsError>> + Send;

    /// Get one trade.
    fn get_trade(&self, trade_id: &str)
    -> impl Future<Output = Result<Value, SteamBotsError>> + Send;

    /// Resend a trade offer.
    fn resend_trade(
        &self,
        trade_id: &str,
        trade_link: Option<&str>,
    ) -> impl Future<Output = Result<Value, SteamBotsError>> + Send;

    /// Create a deposit.
    fn create_deposit(
        &self,
        trade_link: &str,
        asset_ids: &[String],
    ) -> impl Future<Output = Result<Value, SteamBotsError>> + Send;

    /// Create a withdrawal.
    fn create_withdrawal(
        &self,
        trade_link: &str,
        item_ids: &[String],
    ) -> impl Future<Output = Result<Value, SteamBotsError>> + Send;

    /// Load a Steam inventory.
    fn load_inventory(
        &self,
        steam_id: &str,
    ) -> impl Future<Output = Result<Value, SteamBotsError>> + Send;

    /// List items.
    fn get_items(
        &self,
        filter: Option<&QueryParams>,
    ) -> impl Future<Output = Result<Value, SteamBotsError>> + Send;
}

impl SteamBotsApi for SteamBotsRestClient {
    async fn get_bots(&self) -> Result<Value, SteamBotsError> {
        SteamBotsRestClient::get_bots(self).await
    }

    async fn get_trades(&self, filter: Option<&QueryParams>) -> Result<Value, SteamBotsError> {
        SteamBotsRestClient::get_trades(self, filter).await
    }

    async fn get_trade(&self, trade_id: &str) -> Result<Value, SteamBotsError> {
        SteamBotsRestClient::get_trade(self, trade_id).await
    }

    async fn resend_trade(
        &self,
        trade_id: &str,
        trade_link: Option<&str>,
    ) -> Result<Value, SteamBotsError> {
        SteamBotsRestClient::resend_trade(self, trade_id, trade_link).await
    }

    async fn create_deposit(
        &self,
        trade_link: &str,
        asset_ids: &[String],
    ) -> Result<Value, SteamBotsError> {
        SteamBotsRestClient::create_deposit(self, trade_link, asset_ids).await
    }

    async fn create_withdrawal(
        &self,
        trade_link: &str,
        item_ids: &[String],
    ) -> Result<Value, SteamBotsError> {
        SteamBotsRestClient::create_withdrawal(self, trade_link, item_ids).await
    }

    async fn load_inventory(&self, steam_id: &str) -> Result<Value, SteamBotsError> {
        SteamBotsRestClient::load_inventory(self, steam_id).await
    }

    async fn get_items(&self, filter: Option<&QueryParams>) -> Result<Value, SteamBotsError> {
        SteamBotsRestClient::get_items(self, filter).await
    }
}

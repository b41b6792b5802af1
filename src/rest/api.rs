//! Typed endpoint helpers.
//!
//! Each helper validates its arguments before any network I/O and fails
//! with [`SteamBotsError::InvalidArgument`] naming the offending parameter.

use serde_json::{Map, Value, json};

use crate::error::SteamBotsError;
use crate::rest::SteamBotsRestClient;
use crate::rest::endpoints;
use crate::rest::request::{ApiRequest, QueryParams};

impl SteamBotsRestClient {
    /// List the bots attached to the account.
    pub async fn get_bots(&self) -> Result<Value, SteamBotsError> {
        self.call(ApiRequest::get(endpoints::BOTS)).await
    }

    /// List trades, optionally filtered.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # async fn run(client: steambots_api_client::rest::SteamBotsRestClient) -> steambots_api_client::Result<()> {
    /// use steambots_api_client::rest::QueryParams;
    ///
    /// let filter = QueryParams::new().param("state", "accepted");
    /// let trades = client.get_trades(Some(&filter)).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_trades(&self, filter: Option<&QueryParams>) -> Result<Value, SteamBotsError> {
        let mut request = ApiRequest::get(endpoints::TRADES);
        if let Some(filter) = filter {
            request = request.query(filter.clone());
        }
        self.call(request).await
    }

    /// Get a single trade.
    pub async fn get_trade(&self, trade_id: &str) -> Result<Value, SteamBotsError> {
        validate_path_segment("trade_id", trade_id)?;
        self.call(ApiRequest::get(endpoints::trade(trade_id))).await
    }

    /// Resend a trade offer, optionally to a different trade link.
    pub async fn resend_trade(
        &self,
        trade_id: &str,
        trade_link: Option<&str>,
    ) -> Result<Value, SteamBotsError> {
        validate_path_segment("trade_id", trade_id)?;
        let mut body = Map::new();
        if let Some(link) = trade_link {
            validate_trade_link(link)?;
            body.insert("trade_link".into(), Value::String(link.to_string()));
        }
        self.call(ApiRequest::post(endpoints::trade_resend(trade_id)).json(Value::Object(body)))
            .await
    }

    /// Create a deposit: the bot requests `asset_ids` from the user behind `trade_link`.
    ///
    /// `asset_ids` must hold at least one non-blank id. An empty list is
    /// rejected locally instead of being sent as a trade offer with no items.
    pub async fn create_deposit<S>(
        &self,
        trade_link: &str,
        asset_ids: &[S],
    ) -> Result<Value, SteamBotsError>
    where
        S: AsRef<str>,
    {
        validate_trade_link(trade_link)?;
        let asset_ids = validate_id_list("asset_ids", asset_ids)?;
        let body = json!({
            "trade_link": trade_link,
            "asset_ids": asset_ids,
        });
        self.call(ApiRequest::post(endpoints::DEPOSITS).json(body)).await
    }

    /// Create a withdrawal: the bot sends `item_ids` to the user behind `trade_link`.
    ///
    /// `item_ids` must hold at least one non-blank id, as for
    /// [`create_deposit`](Self::create_deposit).
    pub async fn create_withdrawal<S>(
        &self,
        trade_link: &str,
        item_ids: &[S],
    ) -> Result<Value, SteamBotsError>
    where
        S: AsRef<str>,
    {
        validate_trade_link(trade_link)?;
        let item_ids = validate_id_list("item_ids", item_ids)?;
        let body = json!({
            "trade_link": trade_link,
            "item_ids": item_ids,
        });
        self.call(ApiRequest::post(endpoints::WITHDRAWALS).json(body)).await
    }

    /// Load the inventory of a Steam user by SteamID64.
    pub async fn load_inventory(&self, steam_id: &str) -> Result<Value, SteamBotsError> {
        validate_steam_id(steam_id)?;
        self.call(ApiRequest::get(endpoints::inventory(steam_id))).await
    }

    /// List items held by the bots, optionally filtered.
    pub async fn get_items(&self, filter: Option<&QueryParams>) -> Result<Value, SteamBotsError> {
        let mut request = ApiRequest::get(endpoints::ITEMS);
        if let Some(filter) = filter {
            request = request.query(filter.clone());
        }
        self.call(request).await
    }
}

fn validate_path_segment(name: &str, value: &str) -> Result<(), SteamBotsError> {
    if value.trim().is_empty() {
        return Err(SteamBotsError::invalid_argument(format!(
            "{name} must not be empty"
        )));
    }
    if value.contains(['/', '?', '#']) {
        return Err(SteamBotsError::invalid_argument(format!(
            "{name} must not contain '/', '?' or '#', got {value:?}"
        )));
    }
    Ok(())
}

fn validate_steam_id(steam_id: &str) -> Result<(), SteamBotsError> {
    if steam_id.is_empty() || !steam_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SteamBotsError::invalid_argument(format!(
            "steam_id must be a decimal SteamID64, got {steam_id:?}"
        )));
    }
    Ok(())
}

fn validate_trade_link(trade_link: &str) -> Result<(), SteamBotsError> {
    if trade_link.trim().is_empty() {
        return Err(SteamBotsError::invalid_argument("trade_link must not be empty"));
    }
    url::Url::parse(trade_link).map_err(|e| {
        SteamBotsError::invalid_argument(format!("trade_link must be an absolute URL: {e}"))
    })?;
    Ok(())
}

fn validate_id_list<'a, S>(name: &str, ids: &'a [S]) -> Result<Vec<&'a str>, SteamBotsError>
where
    S: AsRef<str>,
{
    if ids.is_empty() {
        return Err(SteamBotsError::invalid_argument(format!(
            "{name} must contain at least one id"
        )));
    }
    ids.iter()
        .enumerate()
        .map(|(index, id)| {
            let id = id.as_ref();
            if id.trim().is_empty() {
                Err(SteamBotsError::invalid_argument(format!(
                    "{name}[{index}] must not be empty"
                )))
            } else {
                Ok(id)
            }
        })
        .collect()
}

//! The combined SteamBots client handle.

use std::sync::Arc;

use serde_json::Value;

use crate::auth::{CredentialsProvider, EnvCredentials, StaticCredentials};
use crate::error::SteamBotsError;
use crate::rest::endpoints::STEAMBOTS_API_URL;
use crate::rest::{ApiRequest, QueryParams, SteamBotsApi, SteamBotsRestClient};
use crate::stream::{
    Cursor, EventSubscription, STREAMBOTS_STREAM_URL, StreamConfig, StreamSession, StreamState,
};

/// One API key, one event stream, and the REST API.
///
/// The stream and the REST client share nothing but the key. REST calls
/// take `&self` and may run concurrently; opening and closing the stream
/// take `&mut self`.
///
/// # Example
///
/// ```rust,no_run
/// use steambots_api_client::{SteamBots, SteamBotsApi};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut client = SteamBots::new("api_key");
///
///     let mut events = client.subscribe();
///     client.open_stream(None)?;
///
///     let inventory = client.load_inventory("76561197994468086").await?;
///     println!("{}", inventory);
///
///     while let Some(event) = events.recv().await {
///         println!("{}", event.payload());
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct SteamBots {
    rest: SteamBotsRestClient,
    stream: StreamSession,
}

impl SteamBots {
    /// Create a client for the production endpoints.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::builder(Arc::new(StaticCredentials::new(api_key))).build()
    }

    /// Create a client with the key from `STEAMBOTS_API_KEY`.
    pub fn from_env() -> Result<Self, SteamBotsError> {
        let credentials = EnvCredentials::try_from_env().ok_or(SteamBotsError::MissingCredentials)?;
        Ok(Self::builder(Arc::new(credentials)).build())
    }

    /// Create a new client builder.
    pub fn builder(credentials: Arc<dyn CredentialsProvider>) -> SteamBotsBuilder {
        SteamBotsBuilder::new(credentials)
    }

    /// Open the event stream, replacing any existing one.
    ///
    /// See [`StreamSession::open_stream`].
    pub fn open_stream(&mut self, since: Option<Cursor>) -> Result<(), SteamBotsError> {
        self.stream.open_stream(since)
    }

    /// Close the event stream and cancel any pending reconnect.
    pub fn close_stream(&mut self) {
        self.stream.close_stream();
    }

    /// Receive every stream event.
    pub fn subscribe(&self) -> EventSubscription {
        self.stream.subscribe()
    }

    /// Receive stream events of one type.
    pub fn subscribe_type(&self, event_type: &str) -> EventSubscription {
        self.stream.subscribe_type(event_type)
    }

    /// Current stream lifecycle state.
    pub fn stream_state(&self) -> StreamState {
        self.stream.state()
    }

    /// The underlying stream session.
    pub fn stream(&self) -> &StreamSession {
        &self.stream
    }

    /// The underlying REST client.
    pub fn rest(&self) -> &SteamBotsRestClient {
        &self.rest
    }

    /// Perform a raw REST call.
    pub async fn call(&self, request: ApiRequest) -> Result<Value, SteamBotsError> {
        self.rest.call(request).await
    }
}

impl SteamBotsApi for SteamBots {
    async fn get_bots(&self) -> Result<Value, SteamBotsError> {
        self.rest.get_bots().await
    }

    async fn get_trades(&self, filter: Option<&QueryParams>) -> Result<Value, SteamBotsError> {
        self.rest.get_trades(filter).await
    }

    async fn get_trade(&self, trade_id: &str) -> Result<Value, SteamBotsError> {
        self.rest.get_trade(trade_id).await
    }

    async fn resend_trade(
        &self,
        trade_id: &str,
        trade_link: Option<&str>,
    ) -> Result<Value, SteamBotsError> {
        self.rest.resend_trade(trade_id, trade_link).await
    }

    async fn create_deposit(
        &self,
        trade_link: &str,
        asset_ids: &[String],
    ) -> Result<Value, SteamBotsError> {
        self.rest.create_deposit(trade_link, asset_ids).await
    }

    async fn create_withdrawal(
        &self,
        trade_link: &str,
        item_ids: &[String],
    ) -> Result<Value, SteamBotsError> {
        self.rest.create_withdrawal(trade_link, item_ids).await
    }

    async fn load_inventory(&self, steam_id: &str) -> Result<Value, SteamBotsError> {
        self.rest.load_inventory(steam_id).await
    }

    async fn get_items(&self, filter: Option<&QueryParams>) -> Result<Value, SteamBotsError> {
        self.rest.get_items(filter).await
    }
}

/// Builder for [`SteamBots`].
pub struct SteamBotsBuilder {
    credentials: Arc<dyn CredentialsProvider>,
    api_url: String,
    stream_url: String,
    stream_config: StreamConfig,
    user_agent: Option<String>,
    max_retries: u32,
}

impl SteamBotsBuilder {
    /// Create a builder pointing at the production endpoints.
    pub fn new(credentials: Arc<dyn CredentialsProvider>) -> Self {
        Self {
            credentials,
            api_url: STEAMBOTS_API_URL.to_string(),
            stream_url: STREAMBOTS_STREAM_URL.to_string(),
            stream_config: StreamConfig::default(),
            user_agent: None,
            max_retries: 0,
        }
    }

    /// Set the REST base URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the stream endpoint.
    pub fn stream_url(mut self, url: impl Into<String>) -> Self {
        self.stream_url = url.into();
        self
    }

    /// Set the stream configuration.
    pub fn stream_config(mut self, config: StreamConfig) -> Self {
        self.stream_config = config;
        self
    }

    /// Set a custom user agent for REST calls.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the maximum number of REST retries for transient failures.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Build the client.
    pub fn build(self) -> SteamBots {
        let mut rest = SteamBotsRestClient::builder()
            .base_url(self.api_url)
            .credentials(Arc::clone(&self.credentials))
            .max_retries(self.max_retries);
        if let Some(user_agent) = self.user_agent {
            rest = rest.user_agent(user_agent);
        }

        SteamBots {
            rest: rest.build(),
            stream: StreamSession::new(self.stream_url, self.credentials, self.stream_config),
        }
    }
}

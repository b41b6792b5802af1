//! Long-lived stream session with cursor-resumed reconnection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use url::Url;

use crate::auth::CredentialsProvider;
use crate::error::SteamBotsError;
use crate::stream::bus::{DEFAULT_CHANNEL_CAPACITY, EventBus, EventSubscription};
use crate::stream::decoder::FrameDecoder;
use crate::stream::event::Cursor;

/// Production stream endpoint.
pub const STREAMBOTS_STREAM_URL: &str = "https://stream.steambots.io";

/// Delay between the end of a stream and the reconnect attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(6000);

/// Configuration for the event stream.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Fixed delay before reconnecting after the server ends the stream.
    pub reconnect_delay: Duration,
    /// Also reconnect when the request fails before any response arrives
    /// (connection refused, reset during the handshake).
    ///
    /// Off by default: such a failure leaves the session idle. A body that
    /// breaks off after the response started always reconnects.
    pub reconnect_on_error: bool,
    /// Events buffered per subscriber before it starts lagging.
    pub channel_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            reconnect_on_error: false,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl StreamConfig {
    /// Create a new configuration builder.
    pub fn builder() -> StreamConfigBuilder {
        StreamConfigBuilder::new()
    }
}

/// Builder for [`StreamConfig`].
#[derive(Debug, Clone, Default)]
pub struct StreamConfigBuilder {
    config: StreamConfig,
}

impl StreamConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: StreamConfig::default(),
        }
    }

    /// Set the reconnect delay.
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.config.reconnect_delay = delay;
        self
    }

    /// Reconnect after transport errors too.
    pub fn reconnect_on_error(mut self, enabled: bool) -> Self {
        self.config.reconnect_on_error = enabled;
        self
    }

    /// Set the per-subscriber channel capacity.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> StreamConfig {
        self.config
    }
}

/// Lifecycle of the stream session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamState {
    /// No connection and no pending reconnect.
    Idle,
    /// Waiting for the stream endpoint to answer.
    Connecting,
    /// Reading events from an open connection.
    Streaming,
    /// The stream ended or dropped; a reconnect is pending.
    ReconnectScheduled,
    /// A frame could not be decoded; the session stopped.
    Failed(String),
}

impl StreamState {
    /// Whether a connection or a pending reconnect exists.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            StreamState::Connecting | StreamState::Streaming | StreamState::ReconnectScheduled
        )
    }
}

/// How a single connection finished.
enum ConnectionEnd {
    /// The server closed the body.
    Ended,
    /// The body read failed after the response arrived.
    Dropped(SteamBotsError),
    /// The request failed before any response arrived.
    Transport(SteamBotsError),
    /// A frame was not a JSON object.
    Decode(SteamBotsError),
}

/// State shared between the session and its worker task.
#[derive(Debug)]
struct Shared {
    // Bumped on every teardown; a worker only writes while its generation is current.
    generation: AtomicU64,
    state: watch::Sender<StreamState>,
    cursor: RwLock<Option<Cursor>>,
    bus: EventBus,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn set_state(&self, generation: u64, state: StreamState) {
        self.state.send_if_modified(|current| {
            if !self.is_current(generation) || *current == state {
                return false;
            }
            *current = state;
            true
        });
    }

    fn set_cursor(&self, generation: u64, cursor: Option<Cursor>) {
        let mut current = self.cursor.write().unwrap_or_else(|e| e.into_inner());
        if self.is_current(generation) {
            *current = cursor;
        }
    }
}

/// A resumable subscription to the SteamBots event stream.
///
/// At most one connection and one pending reconnect exist per session: both
/// live in a single background task, and [`open_stream`](Self::open_stream)
/// tears the previous task down before starting a new one.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use steambots_api_client::auth::StaticCredentials;
/// use steambots_api_client::stream::{StreamConfig, StreamSession, STREAMBOTS_STREAM_URL};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let credentials = Arc::new(StaticCredentials::new("api_key"));
///     let mut session =
///         StreamSession::new(STREAMBOTS_STREAM_URL, credentials, StreamConfig::default());
///
///     let mut trades = session.subscribe_type("trade");
///     session.open_stream(None)?;
///
///     while let Some(event) = trades.recv().await {
///         println!("trade: {}", event.payload());
///     }
///     Ok(())
/// }
/// ```
pub struct StreamSession {
    http_client: ClientWithMiddleware,
    url: String,
    credentials: Arc<dyn CredentialsProvider>,
    config: StreamConfig,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl StreamSession {
    /// Create an idle session for the given stream endpoint.
    pub fn new(
        url: impl Into<String>,
        credentials: Arc<dyn CredentialsProvider>,
        config: StreamConfig,
    ) -> Self {
        let user_agent = format!("steambots-api-client/{}", env!("CARGO_PKG_VERSION"));
        let http_client = ClientBuilder::new(crate::rest::base_http_client(&user_agent))
            .with(TracingMiddleware::default())
            .build();
        Self::with_http_client(url, credentials, config, http_client)
    }

    /// Create an idle session using a preconfigured HTTP client.
    pub fn with_http_client(
        url: impl Into<String>,
        credentials: Arc<dyn CredentialsProvider>,
        config: StreamConfig,
        http_client: ClientWithMiddleware,
    ) -> Self {
        let (state, _) = watch::channel(StreamState::Idle);
        let shared = Arc::new(Shared {
            generation: AtomicU64::new(0),
            state,
            cursor: RwLock::new(None),
            bus: EventBus::new(config.channel_capacity),
        });
        Self {
            http_client,
            url: url.into(),
            credentials,
            config,
            shared,
            worker: None,
        }
    }

    /// Open the stream, replacing any existing connection or pending reconnect.
    ///
    /// With `since`, the server replays events after that cursor. Events are
    /// delivered to subscriptions obtained from [`subscribe`](Self::subscribe)
    /// and [`subscribe_type`](Self::subscribe_type).
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open_stream(&mut self, since: Option<Cursor>) -> Result<(), SteamBotsError> {
        let base = Url::parse(&self.url)?;
        self.close_stream();

        let generation = self.shared.generation.load(Ordering::SeqCst);
        self.shared.set_cursor(generation, since.clone());
        self.shared.set_state(generation, StreamState::Connecting);

        let worker = StreamWorker {
            shared: Arc::clone(&self.shared),
            generation,
            http_client: self.http_client.clone(),
            base,
            credentials: Arc::clone(&self.credentials),
            config: self.config.clone(),
        };
        self.worker = Some(tokio::spawn(worker.run(since)));
        Ok(())
    }

    /// Cancel any pending reconnect and abort the active connection.
    ///
    /// Safe to call when nothing is open.
    pub fn close_stream(&mut self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            worker.abort();
            tracing::debug!("stream closed");
        }
        self.shared.state.send_if_modified(|state| {
            if *state == StreamState::Idle {
                return false;
            }
            *state = StreamState::Idle;
            true
        });
    }

    /// Whether a connection or a pending reconnect exists.
    pub fn is_open(&self) -> bool {
        self.worker.as_ref().is_some_and(|worker| !worker.is_finished())
            && self.state().is_active()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        self.shared.state.borrow().clone()
    }

    /// Watch lifecycle changes.
    pub fn watch_state(&self) -> watch::Receiver<StreamState> {
        self.shared.state.subscribe()
    }

    /// The cursor a reconnect would resume from.
    pub fn last_cursor(&self) -> Option<Cursor> {
        self.shared
            .cursor
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Receive every event.
    pub fn subscribe(&self) -> EventSubscription {
        self.shared.bus.subscribe()
    }

    /// Receive events whose `type` equals `event_type`.
    pub fn subscribe_type(&self, event_type: &str) -> EventSubscription {
        self.shared.bus.subscribe_type(event_type)
    }

    /// The stream endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The stream configuration.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}

impl std::fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSession")
            .field("url", &self.url)
            .field("state", &self.state())
            .field("last_cursor", &self.last_cursor())
            .finish()
    }
}

/// Background task owning the connection and the reconnect timer.
struct StreamWorker {
    shared: Arc<Shared>,
    generation: u64,
    http_client: ClientWithMiddleware,
    base: Url,
    credentials: Arc<dyn CredentialsProvider>,
    config: StreamConfig,
}

impl StreamWorker {
    async fn run(self, mut since: Option<Cursor>) {
        loop {
            self.shared.set_state(self.generation, StreamState::Connecting);
            tracing::info!(since_id = since.as_ref().map(Cursor::as_str), "connecting to event stream");

            match self.stream_once(&mut since).await {
                ConnectionEnd::Ended => {
                    tracing::info!(
                        delay_ms = self.config.reconnect_delay.as_millis() as u64,
                        "event stream ended, reconnecting"
                    );
                }
                ConnectionEnd::Dropped(err) => {
                    tracing::warn!(
                        error = %err,
                        delay_ms = self.config.reconnect_delay.as_millis() as u64,
                        "event stream dropped, reconnecting"
                    );
                }
                ConnectionEnd::Transport(err) => {
                    tracing::warn!(error = %err, "event stream transport error");
                    if !self.config.reconnect_on_error {
                        self.shared.set_state(self.generation, StreamState::Idle);
                        return;
                    }
                }
                ConnectionEnd::Decode(err) => {
                    tracing::error!(error = %err, "event stream sent an undecodable frame");
                    self.shared
                        .set_state(self.generation, StreamState::Failed(err.to_string()));
                    return;
                }
            }

            self.shared
                .set_state(self.generation, StreamState::ReconnectScheduled);
            tokio::time::sleep(self.config.reconnect_delay).await;
        }
    }

    async fn stream_once(&self, since: &mut Option<Cursor>) -> ConnectionEnd {
        let url = stream_url(
            &self.base,
            self.credentials.get_credentials().expose_key(),
            since.as_ref(),
        );

        let response = match self.http_client.get(url).send().await {
            Ok(response) => response,
            Err(err) => return ConnectionEnd::Transport(err.into()),
        };
        if !response.status().is_success() {
            tracing::warn!(status = response.status().as_u16(), "event stream answered with an error status");
        }
        self.shared.set_state(self.generation, StreamState::Streaming);

        let mut body = response.bytes_stream();
        let mut decoder = FrameDecoder::new();
        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => return ConnectionEnd::Dropped(err.into()),
            };
            decoder.push(&chunk);

            while let Some(decoded) = decoder.next_event() {
                let event = match decoded {
                    Ok(event) => event,
                    Err(err) => return ConnectionEnd::Decode(err),
                };
                if let Some(id) = event.id() {
                    *since = Some(id.clone());
                    self.shared.set_cursor(self.generation, since.clone());
                }
                if !self.shared.is_current(self.generation) {
                    return ConnectionEnd::Ended;
                }
                tracing::debug!(
                    id = event.id().map(Cursor::as_str),
                    event_type = event.event_type(),
                    "stream event"
                );
                self.shared.bus.publish(event);
            }
        }

        ConnectionEnd::Ended
    }
}

/// `{base}?key={api_key}[&since_id={cursor}]`.
fn stream_url(base: &Url, api_key: &str, since: Option<&Cursor>) -> Url {
    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("key", api_key);
        if let Some(cursor) = since {
            query.append_pair("since_id", cursor.as_str());
        }
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticCredentials;

    fn session() -> StreamSession {
        StreamSession::new(
            "http://127.0.0.1:9",
            Arc::new(StaticCredentials::new("secret-key")),
            StreamConfig::default(),
        )
    }

    #[test]
    fn test_stream_url_without_cursor() {
        let base = Url::parse("https://stream.steambots.io").unwrap();
        let url = stream_url(&base, "abc", None);
        assert_eq!(url.as_str(), "https://stream.steambots.io/?key=abc");
    }

    #[test]
    fn test_stream_url_with_cursor() {
        let base = Url::parse("https://stream.steambots.io").unwrap();
        let url = stream_url(&base, "a b", Some(&Cursor::from(42u64)));
        assert_eq!(url.as_str(), "https://stream.steambots.io/?key=a+b&since_id=42");
    }

    #[test]
    fn test_config_builder() {
        let config = StreamConfig::builder()
            .reconnect_delay(Duration::from_millis(10))
            .reconnect_on_error(true)
            .channel_capacity(8)
            .build();
        assert_eq!(config.reconnect_delay, Duration::from_millis(10));
        assert!(config.reconnect_on_error);
        assert_eq!(config.channel_capacity, 8);
        assert_eq!(StreamConfig::default().reconnect_delay, Duration::from_secs(6));
    }

    #[test]
    fn test_close_without_open_is_noop() {
        let mut session = session();
        session.close_stream();
        session.close_stream();
        assert_eq!(session.state(), StreamState::Idle);
        assert!(!session.is_open());
    }

    #[test]
    fn test_open_rejects_invalid_url() {
        let mut session = StreamSession::new(
            "not a url",
            Arc::new(StaticCredentials::new("k")),
            StreamConfig::default(),
        );
        assert!(matches!(session.open_stream(None), Err(SteamBotsError::Url(_))));
        assert_eq!(session.state(), StreamState::Idle);
    }

    #[tokio::test]
    async fn test_open_records_resume_cursor() {
        let mut session = session();
        session.open_stream(Some(Cursor::from("17"))).unwrap();
        assert_eq!(session.last_cursor(), Some(Cursor::from("17")));
        session.close_stream();
        assert_eq!(session.state(), StreamState::Idle);
    }

    #[tokio::test]
    async fn test_open_without_cursor_clears_previous_cursor() {
        let mut session = session();
        session.open_stream(Some(Cursor::from("99"))).unwrap();
        assert_eq!(session.last_cursor(), Some(Cursor::from("99")));

        session.open_stream(None).unwrap();
        assert_eq!(session.last_cursor(), None);
        session.close_stream();
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", session());
        assert!(!debug.contains("secret-key"));
    }

    #[test]
    fn test_state_is_active() {
        assert!(StreamState::Streaming.is_active());
        assert!(StreamState::ReconnectScheduled.is_active());
        assert!(!StreamState::Idle.is_active());
        assert!(!StreamState::Failed("x".into()).is_active());
    }
}

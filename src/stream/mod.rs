//! SteamBots event stream.
//!
//! The stream endpoint keeps an HTTP response open and writes one JSON
//! object per event, each terminated by CRLF. [`StreamSession`] frames the
//! body, republishes every event on a generic channel and on a channel per
//! event `type`, and reconnects with `since_id` when the response ends or
//! breaks off.
//!
//! # Example
//!
//! ```rust,ignore
//! use steambots_api_client::SteamBots;
//!
//! let mut client = SteamBots::new("api_key");
//! let mut events = client.subscribe();
//! client.open_stream(None)?;
//!
//! while let Some(event) = events.recv().await {
//!     println!("{:?}: {}", event.event_type(), event.payload());
//! }
//! ```

mod bus;
mod decoder;
mod event;
mod session;

pub use bus::{DATA_TOPIC, DEFAULT_CHANNEL_CAPACITY, EventBus, EventSubscription};
pub use decoder::{FRAME_DELIMITER, FrameDecoder};
pub use event::{Cursor, StreamEvent};
pub use session::{
    DEFAULT_RECONNECT_DELAY, STREAMBOTS_STREAM_URL, StreamConfig, StreamConfigBuilder,
    StreamSession, StreamState,
};

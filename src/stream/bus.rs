//! Publish/subscribe fan-out for stream events.
//!
//! Every event goes to the generic channel and, when it has a `type`, to the
//! channel for that type. Subscribers only ever see events published after
//! they subscribed.

use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamExt};

use crate::stream::event::StreamEvent;

/// Default number of events buffered per subscriber before it starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Name of the generic topic in logs.
pub const DATA_TOPIC: &str = "data";

/// Topic registry for stream events.
#[derive(Debug)]
pub struct EventBus {
    all: broadcast::Sender<StreamEvent>,
    topics: RwLock<HashMap<String, broadcast::Sender<StreamEvent>>>,
    capacity: usize,
}

impl EventBus {
    /// Create a bus whose channels buffer `capacity` events each.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (all, _) = broadcast::channel(capacity);
        Self {
            all,
            topics: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Receive every event.
    pub fn subscribe(&self) -> EventSubscription {
        EventSubscription {
            receiver: self.all.subscribe(),
            topic: DATA_TOPIC.to_string(),
        }
    }

    /// Receive only events whose `type` equals `event_type`.
    pub fn subscribe_type(&self, event_type: &str) -> EventSubscription {
        let mut topics = self.topics.write().unwrap_or_else(|e| e.into_inner());
        let sender = topics
            .entry(event_type.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        EventSubscription {
            receiver: sender.subscribe(),
            topic: event_type.to_string(),
        }
    }

    /// Publish an event generically and on its type's topic.
    ///
    /// Returns how many of the two channels had at least one subscriber.
    pub fn publish(&self, event: StreamEvent) -> usize {
        let mut delivered = 0;

        let topic_sender = event.event_type().and_then(|event_type| {
            self.topics
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .get(event_type)
                .cloned()
        });

        if self.all.send(event.clone()).is_ok() {
            delivered += 1;
        }

        if let Some(sender) = topic_sender {
            if sender.send(event).is_ok() {
                delivered += 1;
            } else {
                self.prune_topic(&sender);
            }
        }

        delivered
    }

    /// Number of topics with a registered channel.
    pub fn topic_count(&self) -> usize {
        self.topics.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    // Drop a topic whose subscribers have all gone away.
    fn prune_topic(&self, sender: &broadcast::Sender<StreamEvent>) {
        let mut topics = self.topics.write().unwrap_or_else(|e| e.into_inner());
        topics.retain(|_, existing| {
            !(existing.same_channel(sender) && existing.receiver_count() == 0)
        });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

/// A subscription to the generic channel or to one event type.
///
/// Subscriptions survive reconnects and stream reopens. A subscriber that
/// falls more than the channel capacity behind skips the missed events.
#[derive(Debug)]
pub struct EventSubscription {
    receiver: broadcast::Receiver<StreamEvent>,
    topic: String,
}

impl EventSubscription {
    /// The topic this subscription listens to (`"data"` for the generic one).
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the owning session is dropped.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(topic = %self.topic, skipped, "stream subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<StreamEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(topic = %self.topic, skipped, "stream subscriber lagged");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Turn the subscription into a [`Stream`] of events.
    pub fn into_stream(self) -> impl Stream<Item = StreamEvent> + Send + Unpin + 'static {
        let topic = self.topic;
        BroadcastStream::new(self.receiver).filter_map(move |item| match item {
            Ok(event) => Some(event),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(topic = %topic, skipped, "stream subscriber lagged");
                None
            }
        })
    }
}

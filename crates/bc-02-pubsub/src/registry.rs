//! # Pub/Sub Registry
//!
//! The subscribed-topic set and the handler table are kept apart: a handler
//! may be recorded for a topic that is not (yet) subscribed, and only the
//! subscribed set decides whether messages are routed at all.
//!
//! Lifecycle operations (`subscribe`, `unsubscribe`) run one at a time under
//! an async mutex that also guards the [`TransportSubscription`].

use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use serde_json::{json, Value};
use shared_rpc::{ChannelEvent, RemoteChannel};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::domain::{DispatchOutcome, PubSubError, PubSubMessage, TopicHandler};

/// Event carrying every inbound pub/sub message.
pub const PUBSUB_EVENT: &str = "ipfs_pubsub_incomming";

/// Remote methods used by this crate.
pub mod methods {
    pub const SUBSCRIBE: &str = "ipfs_pubsub_subscribe";
    pub const UNSUBSCRIBE: &str = "ipfs_pubsub_unsubscribe";
    pub const PUBLISH: &str = "ipfs_pubsub_publish";
}

/// State of the one shared transport-level subscription.
#[derive(Debug, Default)]
pub enum TransportSubscription {
    #[default]
    Closed,
    Open {
        dispatcher: JoinHandle<()>,
    },
}

impl TransportSubscription {
    pub fn is_open(&self) -> bool {
        matches!(self, TransportSubscription::Open { .. })
    }

    /// Stop the dispatcher, if any, and mark closed.
    fn close(&mut self) {
        if let TransportSubscription::Open { dispatcher } = std::mem::take(self) {
            dispatcher.abort();
        }
    }
}

#[derive(Default)]
struct TopicTable {
    subscribed: DashSet<String>,
    handlers: DashMap<String, TopicHandler>,
}

impl TopicTable {
    fn dispatch(&self, message: PubSubMessage) -> DispatchOutcome {
        if !self.subscribed.contains(&message.topic) {
            trace!(topic = %message.topic, "Dropping message for unsubscribed topic");
            return DispatchOutcome::Dropped;
        }

        // Clone out of the map so a handler may touch the registry.
        let handler = self.handlers.get(&message.topic).map(|h| Arc::clone(&h));
        match handler {
            Some(handler) => {
                handler(message);
                DispatchOutcome::Delivered
            }
            None => {
                debug!(topic = %message.topic, "No handler for subscribed topic");
                DispatchOutcome::Unhandled
            }
        }
    }
}

/// Topic registry over one node connection.
pub struct PubSubRegistry {
    channel: Arc<dyn RemoteChannel>,
    table: Arc<TopicTable>,
    transport: Mutex<TransportSubscription>,
}

impl PubSubRegistry {
    pub fn new(channel: Arc<dyn RemoteChannel>) -> Self {
        Self {
            channel,
            table: Arc::new(TopicTable::default()),
            transport: Mutex::new(TransportSubscription::Closed),
        }
    }

    /// Subscribe to `topic`.
    ///
    /// Subscribing an already-subscribed topic does nothing: no remote call,
    /// and the existing handler stays (see [`Self::update_handler`]).
    pub async fn subscribe(
        &self,
        topic: &str,
        handler: Option<TopicHandler>,
    ) -> Result<(), PubSubError> {
        validate_topic(topic)?;
        let mut transport = self.transport.lock().await;

        if self.table.subscribed.contains(topic) {
            debug!(topic = %topic, "Already subscribed");
            return Ok(());
        }

        if !transport.is_open() {
            self.open_transport(&mut transport).await?;
        }

        if let Err(e) = self
            .channel
            .request(methods::SUBSCRIBE, json!([topic]))
            .await
        {
            if self.table.subscribed.is_empty() {
                self.close_transport(&mut transport).await;
            }
            return Err(e.into());
        }

        self.table.subscribed.insert(topic.to_string());
        if let Some(handler) = handler {
            self.table.handlers.insert(topic.to_string(), handler);
        }
        info!(topic = %topic, topics = self.table.subscribed.len(), "Subscribed");
        Ok(())
    }

    /// Set the handler for `topic`, replacing any previous one.
    ///
    /// Unknown topics get a warning but the handler is still recorded.
    pub fn update_handler(&self, topic: &str, handler: TopicHandler) -> Result<(), PubSubError> {
        validate_topic(topic)?;
        if !self.table.subscribed.contains(topic) {
            let warning = PubSubError::TopicNotSubscribed(topic.to_string());
            warn!(error = %warning, "Recording handler for unsubscribed topic");
        }
        self.table.handlers.insert(topic.to_string(), handler);
        Ok(())
    }

    /// Unsubscribe from `topic`; closing the shared subscription with the
    /// last topic. Unknown topics are a logged no-op.
    ///
    /// The topic's handler is dropped too. Resubscribing needs a handler again,
    /// either passed to [`subscribe`](Self::subscribe) or set with
    /// [`update_handler`](Self::update_handler).
    pub async fn unsubscribe(&self, topic: &str) -> Result<(), PubSubError> {
        let mut transport = self.transport.lock().await;

        if !self.table.subscribed.contains(topic) {
            let warning = PubSubError::TopicNotSubscribed(topic.to_string());
            warn!(error = %warning, "Nothing to unsubscribe");
            return Ok(());
        }

        self.channel
            .request(methods::UNSUBSCRIBE, json!([topic]))
            .await?;

        self.table.subscribed.remove(topic);
        self.table.handlers.remove(topic);
        info!(topic = %topic, topics = self.table.subscribed.len(), "Unsubscribed");

        if self.table.subscribed.is_empty() {
            self.close_transport(&mut transport).await;
        }
        Ok(())
    }

    /// Publish `payload` on `topic`. Publishing does not require a
    /// subscription.
    pub async fn publish(&self, topic: &str, payload: Value) -> Result<Value, PubSubError> {
        validate_topic(topic)?;
        let result = self
            .channel
            .request(methods::PUBLISH, json!([topic, payload]))
            .await?;
        debug!(topic = %topic, "Published");
        Ok(result)
    }

    /// Route one message to its topic's handler.
    pub fn dispatch(&self, message: PubSubMessage) -> DispatchOutcome {
        self.table.dispatch(message)
    }

    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.table.subscribed.contains(topic)
    }

    /// Subscribed topics, sorted.
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.table.subscribed.iter().map(|t| t.clone()).collect();
        topics.sort();
        topics
    }

    pub fn has_handler(&self, topic: &str) -> bool {
        self.table.handlers.contains_key(topic)
    }

    pub async fn is_transport_open(&self) -> bool {
        self.transport.lock().await.is_open()
    }

    async fn open_transport(
        &self,
        transport: &mut TransportSubscription,
    ) -> Result<(), PubSubError> {
        // Receiver first so nothing pushed after `rpc.on` is missed.
        let events = self.channel.events();
        self.channel.subscribe_event(PUBSUB_EVENT).await?;

        let dispatcher = tokio::spawn(run_dispatcher(events, Arc::clone(&self.table)));
        *transport = TransportSubscription::Open { dispatcher };
        info!(event = PUBSUB_EVENT, "Transport subscription opened");
        Ok(())
    }

    async fn close_transport(&self, transport: &mut TransportSubscription) {
        if let Err(e) = self.channel.unsubscribe_event(PUBSUB_EVENT).await {
            warn!(error = %e, "Failed to cancel transport subscription");
        }
        transport.close();
        info!(event = PUBSUB_EVENT, "Transport subscription closed");
    }
}

impl Drop for PubSubRegistry {
    fn drop(&mut self) {
        self.transport.get_mut().close();
    }
}

fn validate_topic(topic: &str) -> Result<(), PubSubError> {
    if topic.trim().is_empty() {
        return Err(PubSubError::InvalidTopic(topic.to_string()));
    }
    Ok(())
}

async fn run_dispatcher(mut events: broadcast::Receiver<ChannelEvent>, table: Arc<TopicTable>) {
    loop {
        match events.recv().await {
            Ok(event) if event.name == PUBSUB_EVENT => {
                match PubSubMessage::from_event(&event.payload) {
                    Some(message) => {
                        table.dispatch(message);
                    }
                    None => warn!(payload = %event.payload, "Malformed pub/sub message"),
                }
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "Pub/sub dispatcher lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

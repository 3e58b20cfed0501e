//! # Messages and Handlers

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One message on the multiplexed stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PubSubMessage {
    pub topic: String,
    #[serde(default)]
    pub payload: Value,
}

impl PubSubMessage {
    pub fn new(topic: impl Into<String>, payload: Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }

    /// Parse an event payload: the message object itself, or a one-element
    /// array wrapping it.
    pub fn from_event(payload: &Value) -> Option<Self> {
        let object = match payload {
            Value::Array(items) if items.len() == 1 => &items[0],
            other => other,
        };
        serde_json::from_value(object.clone()).ok()
    }
}

/// Callback for one topic. Runs on the dispatcher task; must not block.
pub type TopicHandler = Arc<dyn Fn(PubSubMessage) + Send + Sync>;

/// Wrap a closure as a [`TopicHandler`].
pub fn handler<F>(f: F) -> TopicHandler
where
    F: Fn(PubSubMessage) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// What `dispatch` did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    /// Topic subscribed but no handler registered.
    Unhandled,
    /// Topic not subscribed.
    Dropped,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_event_shapes() {
        let plain = json!({"topic": "news", "payload": {"n": 1}});
        let wrapped = json!([{"topic": "news", "payload": {"n": 1}}]);
        let expected = PubSubMessage::new("news", json!({"n": 1}));

        assert_eq!(PubSubMessage::from_event(&plain), Some(expected.clone()));
        assert_eq!(PubSubMessage::from_event(&wrapped), Some(expected));
        assert_eq!(
            PubSubMessage::from_event(&json!({"topic": "bare"})),
            Some(PubSubMessage::new("bare", Value::Null))
        );
        assert_eq!(PubSubMessage::from_event(&json!({"payload": 1})), None);
        assert_eq!(PubSubMessage::from_event(&json!("text")), None);
    }
}

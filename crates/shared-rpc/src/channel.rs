//! # Remote Channel Port
//!
//! The single seam between the client crates and the network.

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::broadcast;

use crate::errors::RpcError;

/// Method asking the node to start pushing a named event.
pub const EVENT_SUBSCRIBE: &str = "rpc.on";

/// Method asking the node to stop pushing a named event.
pub const EVENT_UNSUBSCRIBE: &str = "rpc.off";

/// A server-pushed event.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelEvent {
    /// Event name (`synctokens`, `ipfs_pubsub_incomming`, ...).
    pub name: String,
    /// Event payload as sent by the node.
    pub payload: Value,
}

impl ChannelEvent {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// Request/response plus event stream over one connection to the node.
///
/// Implementations must be thread-safe; calls suspend at the network boundary.
#[async_trait]
pub trait RemoteChannel: Send + Sync {
    /// Invoke `method` with `params` and wait for its result.
    ///
    /// A JSON-RPC error object comes back as `RpcError::Remote`; a missing or
    /// `null` result is `Ok(Value::Null)`.
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError>;

    /// Receiver for every event pushed on this channel from now on.
    fn events(&self) -> broadcast::Receiver<ChannelEvent>;

    /// Ask the node to push `event` on this connection.
    async fn subscribe_event(&self, event: &str) -> Result<(), RpcError> {
        self.request(EVENT_SUBSCRIBE, json!([event])).await.map(|_| ())
    }

    /// Ask the node to stop pushing `event`.
    async fn unsubscribe_event(&self, event: &str) -> Result<(), RpcError> {
        self.request(EVENT_UNSUBSCRIBE, json!([event])).await.map(|_| ())
    }
}

//! # Domain Errors

use shared_rpc::RpcError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PubSubError {
    #[error("Invalid topic: {0:?}")]
    InvalidTopic(String),

    #[error("Remote call failed: {0}")]
    RemoteCallFailed(#[from] RpcError),

    /// Only ever logged; operations on unknown topics still succeed.
    #[error("Topic not subscribed: {0}")]
    TopicNotSubscribed(String),
}

//! # Client Errors

use bc_01_job_queue::JobQueueError;
use bc_02_pubsub::PubSubError;
use bc_03_merkle::MerkleError;
use bc_04_signature_verification::SignatureError;
use shared_rpc::RpcError;
use shared_types::CodecError;
use thiserror::Error;

use crate::config::ConfigError;

/// Every failure a [`crate::BladeClient`] operation can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BladeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    JobQueue(#[from] JobQueueError),

    #[error(transparent)]
    PubSub(#[from] PubSubError),

    #[error(transparent)]
    Merkle(#[from] MerkleError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unexpected response to {method}: {detail}")]
    UnexpectedResponse { method: String, detail: String },
}

impl BladeError {
    pub(crate) fn unexpected(method: &str, detail: impl Into<String>) -> Self {
        BladeError::UnexpectedResponse {
            method: method.to_string(),
            detail: detail.into(),
        }
    }
}

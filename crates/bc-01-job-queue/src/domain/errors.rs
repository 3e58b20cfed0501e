//! # Domain Errors

use shared_rpc::RpcError;
use shared_types::CodecError;
use thiserror::Error;

use super::job::JobState;

/// Job queue error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobQueueError {
    /// Health gate not passed; no call may be compiled.
    #[error("Server not ready (ledger: {ledger}, storage: {storage})")]
    ServerNotReady { ledger: bool, storage: bool },

    /// The node or the transport failed the request.
    #[error("Remote call failed: {0}")]
    RemoteCallFailed(#[from] RpcError),

    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] CodecError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The node answered with a shape this client cannot use.
    #[error("Unexpected response to {method}: {detail}")]
    UnexpectedResponse { method: String, detail: String },

    #[error("Illegal job transition {from:?} -> {to:?}")]
    IllegalTransition { from: JobState, to: JobState },
}

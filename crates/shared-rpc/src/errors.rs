//! # RPC Errors

use thiserror::Error;

/// Transport and protocol failures of a remote call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RpcError {
    /// Could not establish the connection.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Sending or receiving failed on an established connection.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error object.
    #[error("Remote error {code}: {message}")]
    Remote { code: i64, message: String },

    /// The node's answer could not be parsed.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The connection is gone; pending and future requests fail with this.
    #[error("Channel closed")]
    Closed,

    /// The operation needs a capability this transport lacks.
    #[error("Unsupported by this transport: {0}")]
    Unsupported(String),
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        RpcError::Decode(err.to_string())
    }
}

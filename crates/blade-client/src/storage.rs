//! # Storage Network Results
//!
//! The node relays `ipfs_read` content in whatever shape its IPFS binding
//! produced: plain text, a byte array, or a serialized buffer object
//! (`{"type": "Buffer", "data": [..]}`).

use serde_json::Value;

use crate::errors::BladeError;

/// Remote methods used for the storage network.
pub mod methods {
    pub const MY_ID: &str = "ipfs_myid";
    pub const PUT: &str = "ipfs_put";
    pub const READ: &str = "ipfs_read";
    pub const PUBLISH: &str = "ipfs_publish";
    pub const PULL_IPNS: &str = "ipfs_pullIPNS";
}

/// Raw bytes of an `ipfs_read` result.
pub fn content_bytes(result: Value) -> Result<Vec<u8>, BladeError> {
    match result {
        Value::String(text) => Ok(text.into_bytes()),
        Value::Array(items) => byte_array(&items),
        Value::Object(map) if map.get("type").and_then(Value::as_str) == Some("Buffer") => {
            match map.get("data") {
                Some(Value::Array(items)) => byte_array(items),
                _ => Err(BladeError::unexpected(methods::READ, "buffer without data array")),
            }
        }
        other => Err(BladeError::unexpected(
            methods::READ,
            format!("unsupported content shape: {other}"),
        )),
    }
}

fn byte_array(items: &[Value]) -> Result<Vec<u8>, BladeError> {
    items
        .iter()
        .map(|item| {
            item.as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| BladeError::unexpected(methods::READ, format!("not a byte: {item}")))
        })
        .collect()
}

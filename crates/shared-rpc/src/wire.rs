//! # JSON-RPC Wire Format
//!
//! Outbound requests are JSON-RPC 2.0 objects with a numeric id. Inbound
//! frames are either responses (carry an `id`) or notifications (carry a
//! `method` or `notification` name plus `params`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::channel::ChannelEvent;
use crate::errors::RpcError;

/// JSON-RPC request structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: &'a Value,
    pub id: u64,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: &'a Value) -> Self {
        Self {
            jsonrpc: "2.0",
            method,
            params,
            id,
        }
    }
}

/// JSON-RPC error structure.
#[derive(Debug, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct InboundFrame {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    notification: Option<String>,
    #[serde(default)]
    params: Option<Value>,
}

/// What an inbound frame turned out to be.
#[derive(Debug, PartialEq)]
pub enum Inbound {
    /// Answer to the request with this id.
    Response {
        id: u64,
        outcome: Result<Value, RpcError>,
    },
    /// Server-pushed event.
    Event(ChannelEvent),
    /// Valid JSON that is neither (e.g. an id we never issued as a number).
    Ignored,
}

/// Classify one inbound text frame.
pub fn classify(text: &str) -> Result<Inbound, RpcError> {
    let frame: InboundFrame = serde_json::from_str(text)?;

    if let Some(name) = frame.notification.or(frame.method) {
        let payload = frame.params.unwrap_or(Value::Null);
        return Ok(Inbound::Event(ChannelEvent::new(name, payload)));
    }

    let Some(id) = frame.id.as_ref().and_then(Value::as_u64) else {
        return Ok(Inbound::Ignored);
    };

    let outcome = match frame.error {
        Some(err) => Err(RpcError::Remote {
            code: err.code,
            message: err.message,
        }),
        None => Ok(frame.result.unwrap_or(Value::Null)),
    };

    Ok(Inbound::Response { id, outcome })
}

/// Numeric `id` of a frame that [`classify`] rejected, if it carries one.
pub fn frame_id(text: &str) -> Option<u64> {
    let value: Value = serde_json::from_str(text).ok()?;
    value.get("id").and_then(Value::as_u64)
}

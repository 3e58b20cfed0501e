//! # Mock Channel
//!
//! Scripted in-process channel. Records every request, answers from
//! per-method scripts, and lets tests push events.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::channel::{ChannelEvent, RemoteChannel};
use crate::errors::RpcError;
use crate::DEFAULT_EVENT_CAPACITY;

/// One request as seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub params: Value,
}

/// Mock implementation of [`RemoteChannel`] for testing.
///
/// Answer lookup per method: queued one-shot answers first, then the sticky
/// answer, then `Ok(Value::Null)`.
pub struct MockChannel {
    queued: Mutex<HashMap<String, VecDeque<Result<Value, RpcError>>>>,
    sticky: Mutex<HashMap<String, Result<Value, RpcError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    events_tx: broadcast::Sender<ChannelEvent>,
}

impl MockChannel {
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(DEFAULT_EVENT_CAPACITY);
        Self {
            queued: Mutex::new(HashMap::new()),
            sticky: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            events_tx,
        }
    }

    /// Answer every call to `method` with `result`.
    pub fn respond(&self, method: &str, result: Value) {
        self.sticky.lock().insert(method.to_string(), Ok(result));
    }

    /// Fail every call to `method` with `error`.
    pub fn fail(&self, method: &str, error: RpcError) {
        self.sticky.lock().insert(method.to_string(), Err(error));
    }

    /// Answer the next call to `method` with `outcome`.
    pub fn respond_once(&self, method: &str, outcome: Result<Value, RpcError>) {
        self.queued
            .lock()
            .entry(method.to_string())
            .or_default()
            .push_back(outcome);
    }

    /// Push an event to every receiver. Returns how many received it.
    pub fn emit(&self, name: &str, payload: Value) -> usize {
        self.events_tx
            .send(ChannelEvent::new(name, payload))
            .unwrap_or(0)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Params of every call to `method`, in issuance order.
    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.method == method)
            .map(|c| c.params.clone())
            .collect()
    }

    /// Method names in issuance order.
    pub fn methods(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.method.clone()).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Live event receivers.
    pub fn receiver_count(&self) -> usize {
        self.events_tx.receiver_count()
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteChannel for MockChannel {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        self.calls.lock().push(RecordedCall {
            method: method.to_string(),
            params,
        });

        if let Some(outcome) = self
            .queued
            .lock()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
        {
            return outcome;
        }

        match self.sticky.lock().get(method) {
            Some(outcome) => outcome.clone(),
            None => Ok(Value::Null),
        }
    }

    fn events(&self) -> broadcast::Receiver<ChannelEvent> {
        self.events_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_scripted_answers() {
        let mock = MockChannel::new();
        mock.respond("accounts", json!(["0x1"]));
        mock.respond_once("accounts", Ok(json!(["0x2"])));

        assert_eq!(mock.request("accounts", json!([])).await.unwrap(), json!(["0x2"]));
        assert_eq!(mock.request("accounts", json!([])).await.unwrap(), json!(["0x1"]));
        assert_eq!(mock.request("unknown", json!([])).await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_failure_and_recording() {
        let mock = MockChannel::new();
        mock.fail("full_checks", RpcError::Closed);

        assert_eq!(
            mock.request("full_checks", json!([])).await,
            Err(RpcError::Closed)
        );
        assert_eq!(mock.methods(), vec!["full_checks".to_string()]);
        assert_eq!(mock.calls_to("full_checks"), vec![json!([])]);
    }

    #[tokio::test]
    async fn test_default_subscribe_event_uses_rpc_on() {
        let mock = MockChannel::new();
        mock.subscribe_event("synctokens").await.unwrap();
        mock.unsubscribe_event("synctokens").await.unwrap();

        assert_eq!(mock.calls_to("rpc.on"), vec![json!(["synctokens"])]);
        assert_eq!(mock.calls_to("rpc.off"), vec![json!(["synctokens"])]);
    }

    #[tokio::test]
    async fn test_emit_reaches_receivers() {
        let mock = MockChannel::new();
        assert_eq!(mock.emit("synctokens", json!([])), 0);

        let mut rx = mock.events();
        assert_eq!(mock.emit("synctokens", json!([1])), 1);
        let event = rx.recv().await.unwrap();
        assert_eq!(event, ChannelEvent::new("synctokens", json!([1])));
    }
}

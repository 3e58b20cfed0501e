//! # HTTP Channel
//!
//! One POST per request. Event subscriptions need a server push and are
//! rejected.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use crate::channel::{ChannelEvent, RemoteChannel};
use crate::errors::RpcError;
use crate::wire::{classify, Inbound, JsonRpcRequest};

/// HTTP adapter for [`RemoteChannel`].
pub struct HttpChannel {
    http_client: reqwest::Client,
    rpc_url: String,
    request_id: AtomicU64,
    // Never fed; receivers just see silence.
    events_tx: broadcast::Sender<ChannelEvent>,
}

impl HttpChannel {
    /// Create a channel with no request timeout.
    pub fn new(rpc_url: String) -> Result<Self, RpcError> {
        Self::build(rpc_url, reqwest::Client::builder())
    }

    /// Create a channel whose requests fail after `timeout`.
    pub fn with_timeout(rpc_url: String, timeout: Duration) -> Result<Self, RpcError> {
        Self::build(rpc_url, reqwest::Client::builder().timeout(timeout))
    }

    fn build(rpc_url: String, builder: reqwest::ClientBuilder) -> Result<Self, RpcError> {
        let http_client = builder
            .build()
            .map_err(|e| RpcError::Connection(e.to_string()))?;
        let (events_tx, _) = broadcast::channel(1);

        Ok(Self {
            http_client,
            rpc_url,
            request_id: AtomicU64::new(1),
            events_tx,
        })
    }

    pub fn url(&self) -> &str {
        &self.rpc_url
    }
}

#[async_trait]
impl RemoteChannel for HttpChannel {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest::new(id, method, &params);

        debug!(id, method = %method, url = %self.rpc_url, "Posting request");
        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    RpcError::Connection(e.to_string())
                } else {
                    RpcError::Transport(e.to_string())
                }
            })?;

        let body = response
            .text()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        match classify(&body)? {
            Inbound::Response { outcome, .. } => outcome,
            _ => Err(RpcError::Decode(format!(
                "expected a response to request {}",
                id
            ))),
        }
    }

    fn events(&self) -> broadcast::Receiver<ChannelEvent> {
        self.events_tx.subscribe()
    }

    async fn subscribe_event(&self, event: &str) -> Result<(), RpcError> {
        Err(RpcError::Unsupported(format!(
            "event {} needs a websocket channel",
            event
        )))
    }

    async fn unsubscribe_event(&self, event: &str) -> Result<(), RpcError> {
        Err(RpcError::Unsupported(format!(
            "event {} needs a websocket channel",
            event
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Minimal one-shot HTTP server answering with `body`.
    async fn spawn_http_server(body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let _ = socket.read(&mut buf).await.unwrap();
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_http_request_result() {
        let url = spawn_http_server(r#"{"jsonrpc":"2.0","id":1,"result":["0xabc"]}"#).await;
        let channel = HttpChannel::new(url).unwrap();

        let result = channel.request("accounts", json!([])).await.unwrap();
        assert_eq!(result, json!(["0xabc"]));
    }

    #[tokio::test]
    async fn test_http_request_remote_error() {
        let url = spawn_http_server(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"Method not found"}}"#,
        )
        .await;
        let channel = HttpChannel::new(url).unwrap();

        let err = channel.request("nope", json!([])).await.unwrap_err();
        assert!(matches!(err, RpcError::Remote { code: -32601, .. }));
    }

    #[tokio::test]
    async fn test_http_rejects_event_subscription() {
        let channel = HttpChannel::new("http://127.0.0.1:9".to_string()).unwrap();
        let err = channel.subscribe_event("synctokens").await.unwrap_err();
        assert!(matches!(err, RpcError::Unsupported(_)));
    }
}

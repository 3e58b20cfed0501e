//! # Shared RPC - Remote Channel to the Blade Node
//!
//! Every remote operation of the client goes through one [`RemoteChannel`]:
//! a JSON-RPC 2.0 request/response exchange plus a broadcast stream of
//! server-pushed events.
//!
//! ## Adapters
//!
//! | Adapter | Transport | Events |
//! |---------|-----------|--------|
//! | [`WsChannel`] | WebSocket, one persistent connection | yes |
//! | [`HttpChannel`] | HTTP POST per request | no |
//! | [`MockChannel`] | in-process, scripted | injected |
//!
//! ## Ordering
//!
//! Requests issued sequentially on one channel reach the node in issuance
//! order. Nothing is ordered across concurrent callers, and no request can be
//! cancelled or timed out by this layer.

pub mod channel;
pub mod errors;
pub mod http;
pub mod mock;
pub mod wire;
pub mod ws;

use std::sync::Arc;

pub use channel::{ChannelEvent, RemoteChannel, EVENT_SUBSCRIBE, EVENT_UNSUBSCRIBE};
pub use errors::RpcError;
pub use http::HttpChannel;
pub use mock::{MockChannel, RecordedCall};
pub use ws::WsChannel;

/// Buffered events per receiver before slow receivers start lagging.
pub const DEFAULT_EVENT_CAPACITY: usize = 1000;

/// Open a channel for `url`, picking the adapter from the scheme.
///
/// `ws://` gives a [`WsChannel`]; `http://` and `https://` give an
/// [`HttpChannel`] without timeout. `wss://` is refused: the WebSocket
/// adapter is built without TLS.
pub async fn connect(url: &str) -> Result<Arc<dyn RemoteChannel>, RpcError> {
    if url.starts_with("wss://") {
        Err(RpcError::Unsupported(format!(
            "TLS WebSocket is not available, use https:// instead: {}",
            url
        )))
    } else if url.starts_with("ws://") {
        let channel = WsChannel::connect(url).await?;
        Ok(Arc::new(channel))
    } else if url.starts_with("http://") || url.starts_with("https://") {
        let channel = HttpChannel::new(url.to_string())?;
        Ok(Arc::new(channel))
    } else {
        Err(RpcError::Connection(format!("unsupported url scheme: {}", url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_unknown_scheme() {
        let result = connect("tcp://localhost:1").await;
        assert!(matches!(result, Err(RpcError::Connection(_))));
    }

    #[tokio::test]
    async fn test_connect_refuses_tls_websocket() {
        let result = connect("wss://127.0.0.1:1").await;
        assert!(matches!(result, Err(RpcError::Unsupported(_))));
    }

    #[tokio::test]
    async fn test_connect_http_is_lazy() {
        // No request is made until the first call.
        assert!(connect("http://127.0.0.1:9").await.is_ok());
    }
}

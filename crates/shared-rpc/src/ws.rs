//! # WebSocket Channel
//!
//! One persistent connection. A writer task drains an outbound queue, a reader
//! task routes responses to their waiting callers by id and fans events out
//! to every receiver.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::channel::{ChannelEvent, RemoteChannel};
use crate::errors::RpcError;
use crate::wire::{classify, frame_id, Inbound, JsonRpcRequest};
use crate::DEFAULT_EVENT_CAPACITY;

type PendingMap = DashMap<u64, oneshot::Sender<Result<Value, RpcError>>>;

/// WebSocket adapter for [`RemoteChannel`].
pub struct WsChannel {
    url: String,
    outbound: mpsc::UnboundedSender<Message>,
    pending: Arc<PendingMap>,
    next_id: AtomicU64,
    events_tx: broadcast::Sender<ChannelEvent>,
    closed: Arc<AtomicBool>,
    tasks: Vec<JoinHandle<()>>,
}

impl WsChannel {
    /// Connect to `url` and start the reader and writer tasks.
    pub async fn connect(url: &str) -> Result<Self, RpcError> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| RpcError::Connection(e.to_string()))?;
        info!(url = %url, "WebSocket channel connected");

        let (mut write, mut read) = stream.split();
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<Message>();
        let pending: Arc<PendingMap> = Arc::new(DashMap::new());
        let (events_tx, _) = broadcast::channel(DEFAULT_EVENT_CAPACITY);
        let closed = Arc::new(AtomicBool::new(false));

        let writer = tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                if let Err(e) = write.send(message).await {
                    warn!(error = %e, "WebSocket write failed");
                    break;
                }
            }
        });

        let reader = {
            let pending = Arc::clone(&pending);
            let events_tx = events_tx.clone();
            let closed = Arc::clone(&closed);
            let pong_tx = outbound.clone();
            tokio::spawn(async move {
                while let Some(frame) = read.next().await {
                    match frame {
                        Ok(Message::Text(text)) => {
                            route_frame(text.as_str(), &pending, &events_tx);
                        }
                        Ok(Message::Ping(data)) => {
                            let _ = pong_tx.send(Message::Pong(data));
                        }
                        Ok(Message::Close(_)) => {
                            info!("WebSocket closed by server");
                            break;
                        }
                        Err(e) => {
                            warn!(error = %e, "WebSocket read failed");
                            break;
                        }
                        _ => {}
                    }
                }

                closed.store(true, Ordering::SeqCst);
                fail_pending(&pending);
            })
        };

        Ok(Self {
            url: url.to_string(),
            outbound,
            pending,
            next_id: AtomicU64::new(1),
            events_tx,
            closed,
            tasks: vec![writer, reader],
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Requests still waiting for an answer.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

fn route_frame(text: &str, pending: &PendingMap, events_tx: &broadcast::Sender<ChannelEvent>) {
    match classify(text) {
        Ok(Inbound::Response { id, outcome }) => match pending.remove(&id) {
            Some((_, tx)) => {
                let _ = tx.send(outcome);
            }
            None => debug!(id, "Response for unknown request id"),
        },
        Ok(Inbound::Event(event)) => {
            // No receivers is not an error.
            let _ = events_tx.send(event);
        }
        Ok(Inbound::Ignored) => debug!("Ignoring frame without numeric id or event name"),
        Err(e) => match frame_id(text).and_then(|id| pending.remove(&id)) {
            Some((id, tx)) => {
                warn!(id, error = %e, "Malformed response for pending request");
                let _ = tx.send(Err(e));
            }
            None => warn!(error = %e, "Dropping malformed frame"),
        },
    }
}

fn fail_pending(pending: &PendingMap) {
    let ids: Vec<u64> = pending.iter().map(|entry| *entry.key()).collect();
    for id in ids {
        if let Some((_, tx)) = pending.remove(&id) {
            let _ = tx.send(Err(RpcError::Closed));
        }
    }
}

#[async_trait]
impl RemoteChannel for WsChannel {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        if self.is_closed() {
            return Err(RpcError::Closed);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let frame = serde_json::to_string(&JsonRpcRequest::new(id, method, &params))?;

        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);

        // The reader may have drained `pending` between the check above and the insert.
        if self.is_closed() {
            self.pending.remove(&id);
            return Err(RpcError::Closed);
        }

        debug!(id, method = %method, "Sending request");
        if self.outbound.send(Message::Text(frame.into())).is_err() {
            self.pending.remove(&id);
            return Err(RpcError::Closed);
        }

        rx.await.map_err(|_| RpcError::Closed)?
    }

    fn events(&self) -> broadcast::Receiver<ChannelEvent> {
        self.events_tx.subscribe()
    }
}

impl Drop for WsChannel {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

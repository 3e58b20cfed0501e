//! # Token Sync Hook
//!
//! The node announces token state changes with a `synctokens` event. The
//! client forwards each announcement to a replaceable hook; the default hook
//! does nothing.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use shared_rpc::{ChannelEvent, RemoteChannel, RpcError};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const SYNC_TOKENS_EVENT: &str = "synctokens";

/// Callback run for every `synctokens` event payload.
pub type TokenSyncHook = Arc<dyn Fn(Value) + Send + Sync>;

pub fn noop_hook() -> TokenSyncHook {
    Arc::new(|_| {})
}

pub(crate) struct TokenSync {
    hook: Arc<RwLock<TokenSyncHook>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl TokenSync {
    pub(crate) fn new() -> Self {
        Self {
            hook: Arc::new(RwLock::new(noop_hook())),
            listener: Mutex::new(None),
        }
    }

    pub(crate) fn set_hook(&self, hook: TokenSyncHook) {
        *self.hook.write() = hook;
    }

    pub(crate) fn fire(&self, payload: Value) {
        fire(&self.hook, payload);
    }

    /// Subscribe to the event and start forwarding. No-op when already
    /// listening.
    pub(crate) async fn start(&self, channel: &Arc<dyn RemoteChannel>) -> Result<(), RpcError> {
        let mut listener = self.listener.lock().await;
        if listener.is_some() {
            return Ok(());
        }

        let events = channel.events();
        channel.subscribe_event(SYNC_TOKENS_EVENT).await?;
        *listener = Some(tokio::spawn(run_listener(events, Arc::clone(&self.hook))));
        info!(event = SYNC_TOKENS_EVENT, "Token sync listening");
        Ok(())
    }

    pub(crate) async fn stop(&self, channel: &Arc<dyn RemoteChannel>) -> Result<(), RpcError> {
        let mut listener = self.listener.lock().await;
        let Some(task) = listener.take() else {
            return Ok(());
        };
        task.abort();
        channel.unsubscribe_event(SYNC_TOKENS_EVENT).await
    }

    pub(crate) async fn is_listening(&self) -> bool {
        self.listener.lock().await.is_some()
    }
}

impl Drop for TokenSync {
    fn drop(&mut self) {
        if let Some(task) = self.listener.get_mut().take() {
            task.abort();
        }
    }
}

fn fire(hook: &RwLock<TokenSyncHook>, payload: Value) {
    let hook = Arc::clone(&hook.read());
    hook(payload);
}

async fn run_listener(mut events: broadcast::Receiver<ChannelEvent>, hook: Arc<RwLock<TokenSyncHook>>) {
    loop {
        match events.recv().await {
            Ok(event) if event.name == SYNC_TOKENS_EVENT => {
                debug!("Token sync requested");
                fire(&hook, event.payload);
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "Token sync listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

//! Fixtures shared by the integration flows.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use bc_04_signature_verification::{address_from_pubkey, EcdsaSignature};
use blade_client::{BladeClient, ClientConfig, ContractConfig};
use futures_util::{SinkExt, StreamExt};
use k256::ecdsa::{RecoveryId, SigningKey};
use serde_json::{json, Value};
use shared_rpc::MockChannel;
use shared_types::Hash;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

pub const APP: &str = "Dice";
pub const ACCOUNT: &str = "0x00000000000000000000000000000000000000aa";

pub fn dice_config() -> ClientConfig {
    ClientConfig {
        app_name: APP.to_string(),
        version: "1.0".to_string(),
        contracts: vec![
            ContractConfig::new("Dice").with_condition("Sanity"),
            ContractConfig::new("Token"),
        ],
        ..ClientConfig::default()
    }
}

/// Mock node that passes the health gate and registers apps.
pub fn healthy_mock() -> Arc<MockChannel> {
    let mock = Arc::new(MockChannel::new());
    mock.respond("full_checks", json!({"geth": true, "ipfs": true}));
    mock.respond("newApp", json!(true));
    mock
}

pub fn mock_client(mock: &Arc<MockChannel>) -> Result<BladeClient> {
    BladeClient::with_channel(dice_config(), mock.clone()).context("building client")
}

/// secp256k1 key with its canonical address.
pub struct Signer {
    key: SigningKey,
    pub address: String,
}

impl Signer {
    pub fn random() -> Self {
        let key = SigningKey::random(&mut rand::thread_rng());
        let address = address_from_pubkey(key.verifying_key()).to_hex();
        Self { key, address }
    }

    /// Low-S signature; replay-protected `v` when `network_id` is given.
    pub fn sign(&self, payload_hash: &Hash, network_id: Option<u64>) -> Result<EcdsaSignature> {
        let (mut signature, mut recid) = self
            .key
            .sign_prehash_recoverable(payload_hash)
            .context("signing payload")?;
        if let Some(normalized) = signature.normalize_s() {
            signature = normalized;
            recid = RecoveryId::new(!recid.is_y_odd(), recid.is_x_reduced());
        }

        let bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);

        let recid = u64::from(recid.to_byte());
        let v = match network_id {
            Some(id) => 2 * id + 35 + recid,
            None => 27 + recid,
        };
        Ok(EcdsaSignature::new(r, s, v))
    }
}

/// WebSocket node on localhost answering each method from a fixed table.
///
/// Unknown methods get a `null` result. Events queued with [`Self::push`]
/// are sent as notifications in between replies.
pub struct ScriptedNode {
    pub url: String,
    pushes: mpsc::UnboundedSender<(String, Value)>,
    requests: mpsc::UnboundedReceiver<Value>,
    task: JoinHandle<()>,
}

impl ScriptedNode {
    pub async fn spawn(answers: HashMap<String, Value>) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (push_tx, mut push_rx) = mpsc::unbounded_channel::<(String, Value)>();
        let (seen_tx, seen_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                return;
            };

            loop {
                tokio::select! {
                    frame = ws.next() => {
                        let Some(Ok(Message::Text(text))) = frame else { break };
                        let Ok(request) = serde_json::from_str::<Value>(text.as_str()) else {
                            continue;
                        };
                        let method = request["method"].as_str().unwrap_or_default();
                        let result = answers.get(method).cloned().unwrap_or(Value::Null);
                        let reply = json!({"jsonrpc": "2.0", "id": request["id"], "result": result});
                        let _ = seen_tx.send(request);
                        if ws.send(Message::Text(reply.to_string().into())).await.is_err() {
                            break;
                        }
                    }
                    Some((name, payload)) = push_rx.recv() => {
                        let event = json!({"jsonrpc": "2.0", "notification": name, "params": payload});
                        if ws.send(Message::Text(event.to_string().into())).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Ok(Self {
            url: format!("ws://{addr}"),
            pushes: push_tx,
            requests: seen_rx,
            task,
        })
    }

    pub fn port(&self) -> Result<u16> {
        let port = self
            .url
            .rsplit(':')
            .next()
            .context("url without port")?
            .parse()?;
        Ok(port)
    }

    pub fn push(&self, name: &str, payload: Value) -> Result<()> {
        self.pushes
            .send((name.to_string(), payload))
            .context("scripted node stopped")
    }

    /// Requests received so far, in arrival order.
    pub fn drain_requests(&mut self) -> Vec<Value> {
        let mut seen = Vec::new();
        while let Ok(request) = self.requests.try_recv() {
            seen.push(request);
        }
        seen
    }
}

impl Drop for ScriptedNode {
    fn drop(&mut self) {
        self.task.abort();
    }
}

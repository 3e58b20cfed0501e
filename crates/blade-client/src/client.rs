//! # Blade Client
//!
//! One [`BladeClient`] per app and node connection. It owns the channel and
//! wires the job queue, pub/sub registry and signature verifier onto it.

use std::sync::Arc;

use bc_01_job_queue::{ContractCall, HealthReport, JobQueueApi, JobQueueClient, QueueId, Receipt};
use bc_02_pubsub::PubSubRegistry;
use bc_03_merkle::{MerkleTree, Proof};
use bc_04_signature_verification::SignatureVerifier;
use futures_util::future::try_join_all;
use serde_json::{json, Value};
use shared_rpc::RemoteChannel;
use shared_types::{normalize_address, Address, Hash};
use tracing::{debug, info, warn};

use crate::app::{self, call_params, registration_params};
use crate::config::{ClientConfig, DEFAULT_CONDITION};
use crate::errors::BladeError;
use crate::storage;
use crate::token_sync::{TokenSync, TokenSyncHook};

/// Client façade over one Blade node.
pub struct BladeClient {
    config: ClientConfig,
    channel: Arc<dyn RemoteChannel>,
    jobs: JobQueueClient,
    pubsub: PubSubRegistry,
    verifier: SignatureVerifier,
    token_sync: TokenSync,
}

impl BladeClient {
    /// Validate `config` and open a channel to its endpoint.
    pub async fn connect(config: ClientConfig) -> Result<Self, BladeError> {
        config.validate()?;
        let endpoint = config.endpoint();
        let channel = shared_rpc::connect(&endpoint).await?;
        info!(endpoint = %endpoint, app = %config.app_name, "Connected to Blade node");
        Self::with_channel(config, channel)
    }

    /// Build over an existing channel.
    pub fn with_channel(
        config: ClientConfig,
        channel: Arc<dyn RemoteChannel>,
    ) -> Result<Self, BladeError> {
        config.validate()?;
        Ok(Self {
            jobs: JobQueueClient::new(Arc::clone(&channel), config.app_name.clone()),
            pubsub: PubSubRegistry::new(Arc::clone(&channel)),
            verifier: SignatureVerifier::new(config.network_id),
            token_sync: TokenSync::new(),
            channel,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn channel(&self) -> &Arc<dyn RemoteChannel> {
        &self.channel
    }

    pub fn jobs(&self) -> &JobQueueClient {
        &self.jobs
    }

    pub fn pubsub(&self) -> &PubSubRegistry {
        &self.pubsub
    }

    pub fn verifier(&self) -> SignatureVerifier {
        self.verifier
    }

    pub fn is_ready(&self) -> bool {
        self.jobs.is_ready()
    }

    // --- Setup -------------------------------------------------------------

    /// [`Self::init_with`] for the default condition type.
    pub async fn init(&self) -> Result<Vec<Value>, BladeError> {
        self.init_with(DEFAULT_CONDITION).await
    }

    /// Health gate, then one `newApp` per configured contract.
    ///
    /// Registrations are issued together; the results come back in
    /// configuration order. With no contracts configured nothing is
    /// registered and the result is empty.
    pub async fn init_with(&self, cond_type: &str) -> Result<Vec<Value>, BladeError> {
        let report = self.jobs.check_health().await?;
        debug!(ledger = report.ledger, storage = report.storage, "Health gate passed");

        if self.config.contracts.is_empty() {
            warn!(app = %self.config.app_name, "No contract configured; nothing registered");
            return Ok(Vec::new());
        }

        let registrations = self.config.contracts.iter().map(|contract| {
            let params = registration_params(&self.config, contract, cond_type);
            debug!(contract = %contract.ctr_name, cond_type = %cond_type, "Registering contract");
            self.channel.request(app::methods::NEW_APP, params)
        });
        let results = try_join_all(registrations).await?;

        info!(
            app = %self.config.app_name,
            contracts = results.len(),
            "App registered"
        );
        Ok(results)
    }

    pub async fn check_health(&self) -> Result<HealthReport, BladeError> {
        Ok(self.jobs.check_health().await?)
    }

    // --- Ledger --------------------------------------------------------------

    /// Read-only contract call.
    pub async fn call(
        &self,
        contract: &str,
        call_name: &str,
        args: Vec<Value>,
    ) -> Result<Value, BladeError> {
        if contract.trim().is_empty() || call_name.trim().is_empty() {
            return Err(BladeError::InvalidInput(
                "contract and call names must be non-empty".to_string(),
            ));
        }
        let params = call_params(&self.config.app_name, contract, call_name, args);
        Ok(self.channel.request(app::methods::CALL, params).await?)
    }

    /// Accounts the node can sign for, canonicalized.
    pub async fn accounts(&self) -> Result<Vec<Address>, BladeError> {
        let result = self.channel.request(app::methods::ACCOUNTS, json!([])).await?;
        let Value::Array(items) = result else {
            return Err(BladeError::unexpected(app::methods::ACCOUNTS, "expected an array"));
        };

        items
            .iter()
            .map(|item| match item {
                Value::String(text) => Ok(normalize_address(text)?),
                Value::Number(n) => Ok(normalize_address(&n.to_string())?),
                other => Err(BladeError::unexpected(
                    app::methods::ACCOUNTS,
                    format!("not an address: {other}"),
                )),
            })
            .collect()
    }

    pub async fn link_account(&self, address: &str) -> Result<bool, BladeError> {
        Ok(self.jobs.link_account(address).await?)
    }

    /// Compile and queue one call.
    pub async fn send(&self, call: ContractCall) -> Result<QueueId, BladeError> {
        Ok(self.jobs.send(call).await?)
    }

    pub async fn poll_receipt(&self, queue_id: &QueueId) -> Result<Receipt, BladeError> {
        Ok(self.jobs.poll_receipt(queue_id).await?)
    }

    // --- Storage network -------------------------------------------------------

    pub async fn ipfs_id(&self) -> Result<Value, BladeError> {
        Ok(self.channel.request(storage::methods::MY_ID, json!([])).await?)
    }

    /// Add the file at `path` (on the node's filesystem).
    pub async fn ipfs_put(&self, path: &str) -> Result<Value, BladeError> {
        Ok(self.channel.request(storage::methods::PUT, json!([path])).await?)
    }

    pub async fn ipfs_read(&self, hash: &str) -> Result<Vec<u8>, BladeError> {
        let result = self.channel.request(storage::methods::READ, json!([hash])).await?;
        storage::content_bytes(result)
    }

    /// [`Self::ipfs_read`] decoded as UTF-8, invalid sequences replaced.
    pub async fn ipfs_read_text(&self, hash: &str) -> Result<String, BladeError> {
        let bytes = self.ipfs_read(hash).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn ipns_publish(&self, hash: &str) -> Result<Value, BladeError> {
        Ok(self.channel.request(storage::methods::PUBLISH, json!([hash])).await?)
    }

    pub async fn pull_ipns(&self, name: &str) -> Result<Value, BladeError> {
        Ok(self.channel.request(storage::methods::PULL_IPNS, json!([name])).await?)
    }

    // --- Token sync --------------------------------------------------------------

    /// Replace the hook run on `synctokens` events.
    pub fn on_token_sync(&self, hook: TokenSyncHook) {
        self.token_sync.set_hook(hook);
    }

    /// Run the current hook directly.
    pub fn sync_tokens(&self, payload: Value) {
        self.token_sync.fire(payload);
    }

    /// Subscribe to `synctokens` and forward events to the hook.
    pub async fn start_token_sync(&self) -> Result<(), BladeError> {
        Ok(self.token_sync.start(&self.channel).await?)
    }

    pub async fn stop_token_sync(&self) -> Result<(), BladeError> {
        Ok(self.token_sync.stop(&self.channel).await?)
    }

    pub async fn is_token_sync_running(&self) -> bool {
        self.token_sync.is_listening().await
    }

    // --- Local verification ----------------------------------------------------

    /// Recover the signer of `payload_hash` and compare it to `claimed_address`
    /// under this client's network id.
    pub fn verify_signature(
        &self,
        payload_hash: &Hash,
        v: u64,
        r: &[u8; 32],
        s: &[u8; 32],
        claimed_address: &str,
    ) -> bool {
        self.verifier.verify(payload_hash, v, r, s, claimed_address)
    }

    pub fn merkle_tree<L: AsRef<[u8]>>(leaves: &[L]) -> Result<MerkleTree, BladeError> {
        Ok(MerkleTree::build(leaves)?)
    }

    pub fn merkle_proof<L: AsRef<[u8]>>(leaves: &[L], target: &[u8]) -> Result<Proof, BladeError> {
        Ok(bc_03_merkle::get_proof(leaves, target)?)
    }
}

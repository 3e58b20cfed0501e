//! # Blade Client
//!
//! Façade for dApps talking to a Blade node. The node fronts a ledger and a
//! content-addressed storage network; this crate registers the app, reads
//! and queues contract calls, relays storage and pub/sub traffic, and checks
//! Merkle proofs and signatures locally.
//!
//! ## Startup
//!
//! ```rust,ignore
//! let config = ClientConfig::from_file("blade.json")?;
//! let client = BladeClient::connect(config).await?;
//! client.init().await?;                 // full_checks, then newApp per contract
//! client.link_account("0xabc...").await?;
//! let queue = client.send(ContractCall::new("Dice", "roll").arg(6)).await?;
//! let receipt = client.poll_receipt(&queue).await?;
//! ```
//!
//! ## Components
//!
//! | Area | Crate | Access |
//! |------|-------|--------|
//! | Job queue | `bc-01-job-queue` | [`BladeClient::jobs`] |
//! | Pub/sub | `bc-02-pubsub` | [`BladeClient::pubsub`] |
//! | Merkle proofs | `bc-03-merkle` | [`BladeClient::merkle_proof`] |
//! | Signatures | `bc-04-signature-verification` | [`BladeClient::verifier`] |

pub mod app;
pub mod client;
pub mod config;
pub mod errors;
pub mod storage;
pub mod token_sync;

pub use client::BladeClient;
pub use config::{ClientConfig, ConfigError, ContractConfig, Transport, DEFAULT_CONDITION};
pub use errors::BladeError;
pub use token_sync::{noop_hook, TokenSyncHook, SYNC_TOKENS_EVENT};

pub use bc_01_job_queue::{ContractCall, HealthReport, JobQueueApi, QueueId, Receipt};
pub use bc_02_pubsub::{handler, PubSubMessage, TopicHandler};
pub use shared_types::{Address, Hash, U256};

//! Cross-crate flows.

pub mod job_flow;
pub mod proof_flow;
pub mod pubsub_flow;
pub mod ws_node;

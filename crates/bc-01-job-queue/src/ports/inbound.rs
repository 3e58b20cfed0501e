//! # Inbound Ports
//!
//! What callers can ask of the job queue.

use async_trait::async_trait;

use crate::domain::{
    CompiledJob, ContractCall, HealthReport, JobId, JobQueueError, JobState, QueueId, Receipt,
};

/// Job Queue API - inbound port.
#[async_trait]
pub trait JobQueueApi: Send + Sync {
    /// Ask the node whether ledger and storage are up; gates compilation.
    async fn check_health(&self) -> Result<HealthReport, JobQueueError>;

    /// Compile one call into a job object.
    async fn compile_call(&self, call: ContractCall) -> Result<CompiledJob, JobQueueError>;

    /// Queue one or more compiled jobs in the given order.
    async fn submit(&self, jobs: &[CompiledJob]) -> Result<QueueId, JobQueueError>;

    /// Compile then submit a single call.
    async fn send(&self, call: ContractCall) -> Result<QueueId, JobQueueError>;

    /// Single-shot receipt lookup; pending is a value, not an error.
    ///
    /// Receipted jobs stay tracked until the queue is forgotten or pruned.
    async fn poll_receipt(&self, queue_id: &QueueId) -> Result<Receipt, JobQueueError>;

    /// Make `address` the caller for later compilations if the node allows it.
    async fn link_account(&self, address: &str) -> Result<bool, JobQueueError>;

    /// Lifecycle state of a tracked job.
    fn job_state(&self, id: JobId) -> Option<JobState>;
}

//! # BC-01 Job Queue Client
//!
//! Turns a contract call into a job the Blade node can execute, hands jobs to
//! the node's execution queue, and looks up receipts.
//!
//! ## Flow
//!
//! ```text
//! ContractCall ──compile_call──▶ getTkObj ──▶ JobObject
//! JobObject(s) ──submit───────▶ processJobs ─▶ QueueId
//! QueueId ─────poll_receipt───▶ getReceipts ─▶ Receipt (Pending | Ready)
//! ```
//!
//! Compilation is refused until `check_health` has seen both the ledger and
//! the storage subsystem up.
//!
//! ## Module Structure
//!
//! ```text
//! bc-01-job-queue/
//! ├── domain/    # descriptor, session, job lifecycle, errors
//! ├── ports/     # JobQueueApi (inbound)
//! └── service.rs # JobQueueClient over a RemoteChannel
//! ```

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    CallDescriptor, CompiledJob, ContractCall, HealthReport, JobId, JobObject, JobQueueError,
    JobState, JobTracker, QueueId, Receipt, Session, CALLER_UNSET,
};
pub use ports::inbound::JobQueueApi;
pub use service::{methods, JobQueueClient};

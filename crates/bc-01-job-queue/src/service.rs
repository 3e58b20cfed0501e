//! # Job Queue Client
//!
//! Drives the compile / submit / poll protocol over a [`RemoteChannel`] and
//! keeps the per-job lifecycle in a [`JobTracker`].

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use shared_rpc::RemoteChannel;
use shared_types::{normalize_address, Address};
use tracing::{debug, info, warn};

use crate::domain::{
    CallDescriptor, CompiledJob, ContractCall, HealthReport, JobId, JobObject, JobQueueError,
    JobState, JobTracker, QueueId, Receipt, Session,
};
use crate::ports::inbound::JobQueueApi;

/// Remote methods used by this crate.
pub mod methods {
    pub const FULL_CHECKS: &str = "full_checks";
    pub const GET_TK_OBJ: &str = "getTkObj";
    pub const PROCESS_JOBS: &str = "processJobs";
    pub const GET_RECEIPTS: &str = "getReceipts";
    pub const CAN_USE_ACCOUNT: &str = "canUseAccount";
}

/// Job queue client bound to one app and one channel.
pub struct JobQueueClient {
    channel: Arc<dyn RemoteChannel>,
    app_name: String,
    session: Session,
    tracker: JobTracker,
}

impl JobQueueClient {
    pub fn new(channel: Arc<dyn RemoteChannel>, app_name: impl Into<String>) -> Self {
        Self {
            channel,
            app_name: app_name.into(),
            session: Session::new(),
            tracker: JobTracker::new(),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn caller(&self) -> Option<Address> {
        self.session.caller()
    }

    pub fn is_ready(&self) -> bool {
        self.session.is_ready()
    }

    /// Descriptor for `call` under the current session caller.
    pub fn describe(&self, call: ContractCall) -> CallDescriptor {
        CallDescriptor::build(&self.app_name, call, self.session.caller())
    }

    /// Track a job object compiled outside this client so it can be submitted.
    pub fn adopt(&self, job: JobObject) -> CompiledJob {
        CompiledJob {
            id: self.tracker.adopt(),
            job,
        }
    }

    /// Shared state of the jobs behind `queue_id`.
    pub fn queue_state(&self, queue_id: &QueueId) -> Option<JobState> {
        self.tracker.queue_state(queue_id)
    }

    /// Stop tracking `queue_id` and its jobs once the caller is done with it.
    pub fn forget_queue(&self, queue_id: &QueueId) -> usize {
        let released = self.tracker.forget(queue_id);
        debug!(queue = %queue_id, released, "Queue released");
        released
    }

    /// Release every receipted or failed job.
    pub fn prune_finished(&self) -> usize {
        let released = self.tracker.prune_terminal();
        debug!(released, "Finished jobs pruned");
        released
    }

    /// Jobs currently tracked, in any state.
    pub fn tracked_jobs(&self) -> usize {
        self.tracker.tracked()
    }

    fn fail_all(&self, ids: &[JobId]) {
        for id in ids {
            if let Err(e) = self.tracker.transition(*id, JobState::Failed) {
                warn!(job = %id, error = %e, "Could not mark job failed");
            }
        }
    }

    fn ensure_ready(&self) -> Result<(), JobQueueError> {
        if self.session.is_ready() {
            return Ok(());
        }
        let health = self.session.health();
        Err(JobQueueError::ServerNotReady {
            ledger: health.ledger,
            storage: health.storage,
        })
    }
}

#[async_trait]
impl JobQueueApi for JobQueueClient {
    /// A transport failure leaves the previous verdict in place.
    async fn check_health(&self) -> Result<HealthReport, JobQueueError> {
        let result = self.channel.request(methods::FULL_CHECKS, json!([])).await?;
        let report: HealthReport =
            serde_json::from_value(result).map_err(|e| JobQueueError::UnexpectedResponse {
                method: methods::FULL_CHECKS.to_string(),
                detail: e.to_string(),
            })?;

        self.session.record_health(report);
        if !report.is_healthy() {
            warn!(
                ledger = report.ledger,
                storage = report.storage,
                "Blade node not fully functioning"
            );
            return Err(JobQueueError::ServerNotReady {
                ledger: report.ledger,
                storage: report.storage,
            });
        }

        info!(app = %self.app_name, "Blade node healthy");
        Ok(report)
    }

    async fn compile_call(&self, call: ContractCall) -> Result<CompiledJob, JobQueueError> {
        self.ensure_ready()?;
        if call.contract.trim().is_empty() {
            return Err(JobQueueError::InvalidInput("empty contract name".to_string()));
        }
        if call.call.trim().is_empty() {
            return Err(JobQueueError::InvalidInput("empty call name".to_string()));
        }

        let descriptor = self.describe(call);
        let id = self.tracker.create();
        self.tracker.transition(id, JobState::Compiling)?;

        debug!(
            job = %id,
            contract = %descriptor.contract_name,
            call = %descriptor.call_name,
            caller = %descriptor.caller_text(),
            args = descriptor.args.len(),
            gas_override = ?descriptor.gas_override,
            "Compiling call"
        );

        match self
            .channel
            .request(methods::GET_TK_OBJ, descriptor.to_params())
            .await
        {
            Ok(Value::Null) => {
                self.fail_all(&[id]);
                Err(JobQueueError::UnexpectedResponse {
                    method: methods::GET_TK_OBJ.to_string(),
                    detail: "no job object returned".to_string(),
                })
            }
            Ok(job) => {
                self.tracker.transition(id, JobState::Compiled)?;
                Ok(CompiledJob { id, job })
            }
            Err(e) => {
                self.fail_all(&[id]);
                Err(e.into())
            }
        }
    }

    async fn submit(&self, jobs: &[CompiledJob]) -> Result<QueueId, JobQueueError> {
        if jobs.is_empty() {
            return Err(JobQueueError::InvalidInput("no jobs to submit".to_string()));
        }

        let mut seen = HashSet::with_capacity(jobs.len());
        for job in jobs {
            if !seen.insert(job.id) {
                return Err(JobQueueError::InvalidInput(format!(
                    "{} listed twice",
                    job.id
                )));
            }
            match self.tracker.state(job.id) {
                Some(JobState::Compiled) => {}
                Some(from) => {
                    return Err(JobQueueError::IllegalTransition {
                        from,
                        to: JobState::Submitted,
                    })
                }
                None => {
                    return Err(JobQueueError::InvalidInput(format!(
                        "{} is not tracked by this client",
                        job.id
                    )))
                }
            }
        }

        let ids: Vec<JobId> = jobs.iter().map(|j| j.id).collect();
        let params = Value::Array(jobs.iter().map(|j| j.job.clone()).collect());

        match self.channel.request(methods::PROCESS_JOBS, params).await {
            Ok(Value::Null) => {
                self.fail_all(&ids);
                Err(JobQueueError::UnexpectedResponse {
                    method: methods::PROCESS_JOBS.to_string(),
                    detail: "no queue id returned".to_string(),
                })
            }
            Ok(raw) => {
                for id in &ids {
                    self.tracker.transition(*id, JobState::Submitted)?;
                }
                let queue_id = QueueId(raw);
                self.tracker.bind_queue(&queue_id, ids);
                info!(queue = %queue_id, jobs = jobs.len(), "Jobs queued");
                Ok(queue_id)
            }
            Err(e) => {
                self.fail_all(&ids);
                Err(e.into())
            }
        }
    }

    async fn send(&self, call: ContractCall) -> Result<QueueId, JobQueueError> {
        let compiled = self.compile_call(call).await?;
        self.submit(std::slice::from_ref(&compiled)).await
    }

    async fn poll_receipt(&self, queue_id: &QueueId) -> Result<Receipt, JobQueueError> {
        let result = self
            .channel
            .request(methods::GET_RECEIPTS, json!([queue_id.as_value()]))
            .await?;
        let receipt = Receipt::from_result(result);

        if !receipt.is_pending() {
            for id in self.tracker.jobs_in(queue_id) {
                if self.tracker.state(id) == Some(JobState::Submitted) {
                    self.tracker.transition(id, JobState::Receipted)?;
                }
            }
        }
        debug!(queue = %queue_id, pending = receipt.is_pending(), "Receipt polled");
        Ok(receipt)
    }

    async fn link_account(&self, address: &str) -> Result<bool, JobQueueError> {
        let normalized = normalize_address(address)?;
        let key = normalized.to_hex();

        let result = self
            .channel
            .request(methods::CAN_USE_ACCOUNT, json!([key]))
            .await?;
        let map = result
            .as_object()
            .ok_or_else(|| JobQueueError::UnexpectedResponse {
                method: methods::CAN_USE_ACCOUNT.to_string(),
                detail: format!("expected an address map, got {}", result),
            })?;

        let allowed = map
            .get(&key)
            .or_else(|| {
                map.iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(&key))
                    .map(|(_, v)| v)
            })
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if allowed {
            self.session.set_caller(normalized);
            info!(account = %normalized, "Account linked");
        } else {
            warn!(account = %normalized, "Node refused account");
        }
        Ok(allowed)
    }

    fn job_state(&self, id: JobId) -> Option<JobState> {
        self.tracker.state(id)
    }
}

//! # Job Lifecycle
//!
//! ```text
//! Idle ─▶ Compiling ─▶ Compiled ─▶ Submitted ─▶ Receipted
//!            │            │            │
//!            └────────────┴────────────┴──────▶ Failed
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde_json::Value;

use super::errors::JobQueueError;

/// Opaque compiled job as returned by `getTkObj`.
pub type JobObject = Value;

/// Local handle of a job tracked by one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Opaque queue handle as returned by `processJobs`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueId(pub Value);

impl QueueId {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Canonical JSON text, used as the tracking key.
    pub fn key(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

/// A job object together with its tracking handle.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledJob {
    pub id: JobId,
    pub job: JobObject,
}

/// Outcome of a receipt lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Receipt {
    /// Not executed yet, or unknown to the node.
    Pending,
    Ready(Value),
}

impl Receipt {
    /// `null`, `""`, `[]` and `{}` all mean pending.
    pub fn from_result(result: Value) -> Self {
        let empty = match &result {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Object(o) => o.is_empty(),
            _ => false,
        };
        if empty {
            Receipt::Pending
        } else {
            Receipt::Ready(result)
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Receipt::Pending)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Receipt::Ready(v) => Some(v),
            Receipt::Pending => None,
        }
    }
}

/// Lifecycle state of one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    Idle,
    Compiling,
    Compiled,
    Submitted,
    Receipted,
    Failed,
}

impl JobState {
    pub fn can_transition_to(self, next: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (Idle, Compiling)
                | (Compiling, Compiled)
                | (Compiled, Submitted)
                | (Submitted, Receipted)
                | (Compiling, Failed)
                | (Compiled, Failed)
                | (Submitted, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Receipted | JobState::Failed)
    }
}

/// Per-client table of job states and the queue each job went into.
#[derive(Debug, Default)]
pub struct JobTracker {
    next_id: AtomicU64,
    states: DashMap<JobId, JobState>,
    queues: DashMap<String, Vec<JobId>>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a new job in `Idle`.
    pub fn create(&self) -> JobId {
        let id = JobId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.states.insert(id, JobState::Idle);
        id
    }

    /// Start tracking a job object compiled elsewhere, in `Compiled`.
    pub fn adopt(&self) -> JobId {
        let id = JobId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.states.insert(id, JobState::Compiled);
        id
    }

    pub fn state(&self, id: JobId) -> Option<JobState> {
        self.states.get(&id).map(|s| *s)
    }

    /// Move `id` to `next`, rejecting moves the lifecycle does not allow.
    pub fn transition(&self, id: JobId, next: JobState) -> Result<(), JobQueueError> {
        let mut entry = self.states.get_mut(&id).ok_or_else(|| {
            JobQueueError::InvalidInput(format!("{} is not tracked by this client", id))
        })?;
        let current = *entry;
        if !current.can_transition_to(next) {
            return Err(JobQueueError::IllegalTransition {
                from: current,
                to: next,
            });
        }
        *entry = next;
        Ok(())
    }

    pub fn bind_queue(&self, queue_id: &QueueId, jobs: Vec<JobId>) {
        self.queues.entry(queue_id.key()).or_default().extend(jobs);
    }

    pub fn jobs_in(&self, queue_id: &QueueId) -> Vec<JobId> {
        self.queues
            .get(&queue_id.key())
            .map(|jobs| jobs.clone())
            .unwrap_or_default()
    }

    /// Shared state of every job in the queue, if they agree.
    pub fn queue_state(&self, queue_id: &QueueId) -> Option<JobState> {
        let jobs = self.jobs_in(queue_id);
        let mut states = jobs.iter().filter_map(|id| self.state(*id));
        let first = states.next()?;
        states.all(|s| s == first).then_some(first)
    }

    pub fn tracked(&self) -> usize {
        self.states.len()
    }

    /// Drop the queue binding and every job behind it. Returns how many jobs
    /// were released.
    pub fn forget(&self, queue_id: &QueueId) -> usize {
        let Some((_, jobs)) = self.queues.remove(&queue_id.key()) else {
            return 0;
        };
        jobs.iter()
            .filter(|id| self.states.remove(id).is_some())
            .count()
    }

    /// Release every job in `Receipted` or `Failed`, and queues left empty.
    pub fn prune_terminal(&self) -> usize {
        let before = self.states.len();
        self.states.retain(|_, state| !state.is_terminal());
        self.queues.retain(|_, jobs| {
            jobs.retain(|id| self.states.contains_key(id));
            !jobs.is_empty()
        });
        before.saturating_sub(self.states.len())
    }
}

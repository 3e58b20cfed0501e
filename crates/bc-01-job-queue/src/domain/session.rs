//! # Session
//!
//! Per-client identity and readiness. Linking an account is single-writer:
//! two logical sessions must not link through one client.

use parking_lot::RwLock;
use serde::Deserialize;
use shared_types::Address;

/// Subsystem flags reported by `full_checks`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct HealthReport {
    #[serde(rename = "geth", default)]
    pub ledger: bool,
    #[serde(rename = "ipfs", default)]
    pub storage: bool,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.ledger && self.storage
    }
}

#[derive(Debug, Default)]
struct SessionState {
    caller: Option<Address>,
    health: Option<HealthReport>,
}

/// Active caller and last health verdict.
#[derive(Debug, Default)]
pub struct Session {
    state: RwLock<SessionState>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn caller(&self) -> Option<Address> {
        self.state.read().caller
    }

    pub fn set_caller(&self, caller: Address) {
        self.state.write().caller = Some(caller);
    }

    pub fn clear_caller(&self) {
        self.state.write().caller = None;
    }

    /// True once a health check reported both subsystems up.
    pub fn is_ready(&self) -> bool {
        self.state
            .read()
            .health
            .map_or(false, |h| h.is_healthy())
    }

    pub fn record_health(&self, report: HealthReport) {
        self.state.write().health = Some(report);
    }

    /// Last report, or all-down before any check.
    pub fn health(&self) -> HealthReport {
        self.state.read().health.unwrap_or_default()
    }
}

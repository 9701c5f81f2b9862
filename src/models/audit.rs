//! Audit records for delays imposed on connecting accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{AuthOutcome, EventSubclass};

/// How an imposed wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitOutcome {
    /// The full delay elapsed
    Elapsed,
    /// The connection was killed while waiting
    Killed,
}

/// Structured audit entry written each time a connection is delayed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayAuditEvent {
    pub timestamp: DateTime<Utc>,
    pub account: String,
    pub subclass: EventSubclass,
    pub outcome: AuthOutcome,
    pub failed_attempts: u64,
    pub threshold: i64,
    pub delay_ms: u64,
    pub wait_outcome: WaitOutcome,
}

impl DelayAuditEvent {
    pub fn new(
        account: String,
        subclass: EventSubclass,
        outcome: AuthOutcome,
        failed_attempts: u64,
        threshold: i64,
        delay_ms: u64,
        wait_outcome: WaitOutcome,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            account,
            subclass,
            outcome,
            failed_attempts,
            threshold,
            delay_ms,
            wait_outcome,
        }
    }

    pub fn log(&self) {
        info!(
            target: "connection_control_audit",
            timestamp = %self.timestamp,
            account = %self.account,
            subclass = ?self.subclass,
            outcome = ?self.outcome,
            failed_attempts = self.failed_attempts,
            threshold = self.threshold,
            delay_ms = self.delay_ms,
            wait_outcome = ?self.wait_outcome,
            "Connection delayed after repeated failed logins"
        );
    }
}

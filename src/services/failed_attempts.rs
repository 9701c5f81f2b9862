//! Per-account failed login counters.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{ConnectionControlError, Result};
use crate::models::{AccountKey, FailedLoginAttempt};

/// Concurrent map from account key to consecutive failed logins
///
/// An account with no entry has zero failures; entries never hold zero.
/// Writers take the lock exclusively, readers share it.
#[derive(Debug, Default)]
pub struct FailedAttemptsList {
    attempts: RwLock<BTreeMap<AccountKey, u64>>,
}

impl FailedAttemptsList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more failure for `key`, creating the entry at 1
    pub fn define(&self, key: &AccountKey) {
        let mut attempts = self.attempts.write();
        let count = attempts.entry(key.clone()).or_insert(0);
        *count = count.saturating_add(1);
        debug!(account = %key, failed_attempts = *count, "Failed login recorded");
    }

    /// Remove the entry for `key`
    ///
    /// Returns `true` when there was nothing to remove.
    pub fn undefine(&self, key: &AccountKey) -> bool {
        let removed = self.attempts.write().remove(key);
        if removed.is_some() {
            debug!(account = %key, "Failed login counter cleared");
        }
        removed.is_none()
    }

    /// Failures recorded for `key`, 0 when absent
    pub fn count(&self, key: &AccountKey) -> u64 {
        self.attempts.read().get(key).copied().unwrap_or(0)
    }

    /// Number of accounts with at least one failure
    pub fn size(&self) -> usize {
        self.attempts.read().len()
    }

    /// Drop every entry
    pub fn reset(&self) {
        self.attempts.write().clear();
        debug!("All failed login counters cleared");
    }

    /// Copy every entry, ordered by account key
    ///
    /// Fails with `OutOfMemory` if the copy cannot be allocated.
    pub fn snapshot(&self) -> Result<Vec<FailedLoginAttempt>> {
        let attempts = self.attempts.read();
        let mut rows: Vec<FailedLoginAttempt> = Vec::new();
        rows.try_reserve_exact(attempts.len())
            .map_err(|_| ConnectionControlError::OutOfMemory("copying failed login attempts"))?;
        rows.extend(attempts.iter().map(|(key, count)| FailedLoginAttempt {
            userhost: key.to_string(),
            failed_attempts: *count,
        }));
        Ok(rows)
    }
}

//! System variable values and status counters.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use tracing::info;

use crate::config::{ConnectionControlConfig, OptionBounds};
use crate::error::{ConnectionControlError, Result};
use crate::models::{ControlOption, StatId};
use crate::services::coordinator::EventCoordinator;

/// Committed values of the component's system variables
///
/// Changes follow a check-then-update discipline: [`SystemVariables::check`]
/// validates a proposal without touching state, [`SystemVariables::update`]
/// stores it and notifies subscribers.
#[derive(Debug)]
pub struct SystemVariables {
    failed_connections_threshold: AtomicI64,
    min_connection_delay: AtomicI64,
    max_connection_delay: AtomicI64,
}

impl Default for SystemVariables {
    fn default() -> Self {
        Self::new(&ConnectionControlConfig::default())
    }
}

impl SystemVariables {
    pub fn new(config: &ConnectionControlConfig) -> Self {
        Self {
            failed_connections_threshold: AtomicI64::new(config.failed_connections_threshold),
            min_connection_delay: AtomicI64::new(config.min_connection_delay),
            max_connection_delay: AtomicI64::new(config.max_connection_delay),
        }
    }

    fn cell(&self, option: ControlOption) -> &AtomicI64 {
        match option {
            ControlOption::FailedConnectionsThreshold => &self.failed_connections_threshold,
            ControlOption::MinConnectionDelay => &self.min_connection_delay,
            ControlOption::MaxConnectionDelay => &self.max_connection_delay,
        }
    }

    pub fn get(&self, option: ControlOption) -> i64 {
        self.cell(option).load(Ordering::SeqCst)
    }

    pub fn threshold(&self) -> i64 {
        self.get(ControlOption::FailedConnectionsThreshold)
    }

    pub fn min_delay(&self) -> i64 {
        self.get(ControlOption::MinConnectionDelay)
    }

    pub fn max_delay(&self) -> i64 {
        self.get(ControlOption::MaxConnectionDelay)
    }

    /// Validate a proposed value against its range and the committed counterpart bound
    pub fn check(&self, option: ControlOption, value: i64) -> Result<i64> {
        if !OptionBounds::of(option).contains(value) {
            return Err(ConnectionControlError::OptionOutOfRange { option, value });
        }

        let conflict = match option {
            ControlOption::FailedConnectionsThreshold => None,
            ControlOption::MinConnectionDelay => {
                let max = self.max_delay();
                (value > max).then_some((ControlOption::MaxConnectionDelay, max))
            }
            ControlOption::MaxConnectionDelay => {
                let min = self.min_delay();
                (value < min).then_some((ControlOption::MinConnectionDelay, min))
            }
        };

        match conflict {
            Some((counterpart, bound)) => Err(ConnectionControlError::OptionCrossConstraintViolation {
                option,
                value,
                counterpart,
                bound,
            }),
            None => Ok(value),
        }
    }

    pub fn check_threshold(&self, value: i64) -> Result<i64> {
        self.check(ControlOption::FailedConnectionsThreshold, value)
    }

    pub fn check_min_delay(&self, value: i64) -> Result<i64> {
        self.check(ControlOption::MinConnectionDelay, value)
    }

    pub fn check_max_delay(&self, value: i64) -> Result<i64> {
        self.check(ControlOption::MaxConnectionDelay, value)
    }

    /// Store a checked value without notifying anyone
    pub(crate) fn store(&self, option: ControlOption, value: i64) {
        self.cell(option).store(value, Ordering::SeqCst);
    }

    /// Commit a checked value and broadcast it to interested subscribers
    pub fn update(&self, option: ControlOption, value: i64, coordinator: &EventCoordinator) {
        self.store(option, value);
        info!(option = %option, value, "System variable updated");
        coordinator.notify_config_change(option, value);
    }
}

/// Process-wide status counters, one per [`StatId`]
#[derive(Debug, Default)]
pub struct Statistics {
    counters: [AtomicU64; StatId::COUNT],
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stat: StatId) -> u64 {
        self.counters[stat.index()].load(Ordering::SeqCst)
    }

    pub(crate) fn increment(&self, stat: StatId) {
        self.counters[stat.index()].fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn reset(&self, stat: StatId) {
        self.counters[stat.index()].store(0, Ordering::SeqCst);
    }
}

//! Delay policy applied to accounts with repeated failed logins.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{RwLock, RwLockReadGuard};
use tracing::{debug, error, warn};

use crate::config::{ConnectionControlConfig, DISABLE_THRESHOLD, MAX_DELAY, MIN_DELAY};
use crate::error::{ConnectionControlError, Result};
use crate::models::{
    AuthOutcome, ConnectionEvent, ControlOption, DelayAuditEvent, OptionSet, StatAction, StatId,
};
use crate::services::account_key::key_for_connection;
use crate::services::coordinator::{ConnectionEventObserver, StatReporter};
use crate::services::failed_attempts::FailedAttemptsList;
use crate::services::wait::conditional_wait;

/// Threshold and delay bounds cached by the delay action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayLimits {
    pub threshold: i64,
    pub min_delay: i64,
    pub max_delay: i64,
}

impl DelayLimits {
    /// Delay in milliseconds for an account with `count` recorded failures
    ///
    /// `(count + 1 - threshold) * 1000`, clamped to `[min_delay, max_delay]`;
    /// `max_delay` wins if the bounds are inverted and is used outright when
    /// the proposal cannot be computed.
    pub fn wait_time(&self, count: u64) -> u64 {
        let proposed = i64::try_from(count)
            .ok()
            .and_then(|c| c.checked_add(1))
            .and_then(|c| c.checked_sub(self.threshold))
            .and_then(|c| c.checked_mul(1000));

        let wait = match proposed {
            Some(ms) if ms >= 0 => ms.max(self.min_delay).min(self.max_delay),
            _ => self.max_delay,
        };
        u64::try_from(wait).unwrap_or(0)
    }

    /// Whether an account with `count` failures must wait before its outcome is applied
    pub fn triggers_delay(&self, count: u64) -> bool {
        self.threshold > DISABLE_THRESHOLD
            && i64::try_from(count).map_or(true, |c| c >= self.threshold)
    }
}

impl From<&ConnectionControlConfig> for DelayLimits {
    fn from(config: &ConnectionControlConfig) -> Self {
        Self {
            threshold: config.failed_connections_threshold,
            min_delay: config.min_connection_delay,
            max_delay: config.max_connection_delay,
        }
    }
}

/// Subscriber enforcing progressively longer delays after repeated failures
///
/// Once an account reaches the threshold, every further connect or
/// change-user attempt waits `(failures + 1 - threshold)` seconds (clamped to
/// the configured bounds) before its outcome is recorded. A failure increments
/// the account's counter; a success clears it.
pub struct DelayAction {
    limits: RwLock<DelayLimits>,
    failed_attempts: Arc<FailedAttemptsList>,
}

impl DelayAction {
    /// Options whose changes the delay action subscribes to
    pub fn interested_options() -> OptionSet {
        OptionSet::all()
    }

    /// Status counters the delay action produces
    pub const PRODUCES: [StatId; 1] = [StatId::DelayGenerated];

    pub fn new(limits: DelayLimits, failed_attempts: Arc<FailedAttemptsList>) -> Self {
        Self {
            limits: RwLock::new(limits),
            failed_attempts,
        }
    }

    pub fn limits(&self) -> DelayLimits {
        *self.limits.read()
    }

    /// Delay that the next event of an account with `count` failures would get
    pub fn wait_time(&self, count: u64) -> Duration {
        Duration::from_millis(self.limits.read().wait_time(count))
    }

    /// Stop imposing delays; used when the component shuts down
    pub fn disable(&self) {
        self.limits.write().threshold = DISABLE_THRESHOLD;
    }

    fn set_delay(limits: &mut DelayLimits, option: ControlOption, value: i64) -> Result<()> {
        if !(MIN_DELAY..=MAX_DELAY).contains(&value) {
            return Err(ConnectionControlError::OptionOutOfRange { option, value });
        }

        match option {
            ControlOption::MinConnectionDelay if value > limits.max_delay => {
                Err(ConnectionControlError::OptionCrossConstraintViolation {
                    option,
                    value,
                    counterpart: ControlOption::MaxConnectionDelay,
                    bound: limits.max_delay,
                })
            }
            ControlOption::MaxConnectionDelay if value < limits.min_delay => {
                Err(ConnectionControlError::OptionCrossConstraintViolation {
                    option,
                    value,
                    counterpart: ControlOption::MinConnectionDelay,
                    bound: limits.min_delay,
                })
            }
            ControlOption::MinConnectionDelay => {
                limits.min_delay = value;
                Ok(())
            }
            ControlOption::MaxConnectionDelay => {
                limits.max_delay = value;
                Ok(())
            }
            ControlOption::FailedConnectionsThreshold => {
                Err(ConnectionControlError::UnknownOption(option.name().to_string()))
            }
        }
    }
}

impl ConnectionEventObserver for DelayAction {
    fn notify_event(&self, reporter: &StatReporter<'_>, event: &ConnectionEvent<'_>) -> Result<()> {
        if !event.subclass.is_authentication() {
            return Ok(());
        }

        let mut limits_guard = self.limits.read();
        let limits = *limits_guard;

        if limits.threshold <= DISABLE_THRESHOLD {
            return Ok(());
        }

        let key = match key_for_connection(event.connection) {
            Ok(key) => key,
            Err(e) => {
                warn!(error = %e, "Connection not counted: no account identity available");
                return Ok(());
            }
        };

        let current_count = self.failed_attempts.count(&key);

        if limits.triggers_delay(current_count) {
            // The decision is made before the outcome is known, so successful
            // logins past the threshold wait too.
            let wait_ms = limits.wait_time(current_count);
            if let Err(e) = reporter.report(StatId::DelayGenerated, StatAction::Increment) {
                error!(error = %e, "Failed to update delay generated counter");
            }

            debug!(
                target: "connection_control",
                account = %key,
                failed_attempts = current_count,
                wait_ms,
                "Delaying connection"
            );

            // Readers of the limits must not be blocked for the whole delay.
            let wait_outcome = RwLockReadGuard::unlocked(&mut limits_guard, || {
                conditional_wait(
                    event.connection.kill_switch(),
                    Duration::from_millis(wait_ms),
                )
            });

            DelayAuditEvent::new(
                key.to_string(),
                event.subclass,
                event.outcome,
                current_count,
                limits.threshold,
                wait_ms,
                wait_outcome,
            )
            .log();
        }

        match event.outcome {
            AuthOutcome::Failure => self.failed_attempts.define(&key),
            AuthOutcome::Success => {
                if current_count > 0 && self.failed_attempts.undefine(&key) {
                    debug!(
                        target: "connection_control",
                        account = %key,
                        "Failed login counter already cleared, likely by a concurrent reset"
                    );
                }
            }
        }

        drop(limits_guard);
        Ok(())
    }

    fn notify_option(
        &self,
        reporter: &StatReporter<'_>,
        option: ControlOption,
        value: i64,
    ) -> Result<()> {
        let mut limits = self.limits.write();

        match option {
            ControlOption::FailedConnectionsThreshold => {
                limits.threshold = value.max(DISABLE_THRESHOLD);
                reporter
                    .report(StatId::DelayGenerated, StatAction::Reset)
                    .inspect_err(|e| error!(error = %e, "Failed to reset delay generated counter"))
            }
            ControlOption::MinConnectionDelay | ControlOption::MaxConnectionDelay => {
                Self::set_delay(&mut limits, option, value).inspect_err(|e| {
                    error!(option = %option, value, error = %e, "Failed to set connection delay")
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountKey, Connection, SecurityContext};
    use crate::services::coordinator::EventCoordinator;
    use crate::services::variables::Statistics;
    use std::time::Instant;

    fn limits(threshold: i64, min_delay: i64, max_delay: i64) -> DelayLimits {
        DelayLimits {
            threshold,
            min_delay,
            max_delay,
        }
    }

    struct Fixture {
        coordinator: EventCoordinator,
        action: Arc<DelayAction>,
        stats: Arc<Statistics>,
        list: Arc<FailedAttemptsList>,
    }

    fn fixture(l: DelayLimits) -> Fixture {
        let stats = Arc::new(Statistics::new());
        let list = Arc::new(FailedAttemptsList::new());
        let mut coordinator = EventCoordinator::new(Arc::clone(&stats), Arc::clone(&list));
        let action = Arc::new(DelayAction::new(l, Arc::clone(&list)));
        coordinator
            .register_subscriber(
                action.clone(),
                DelayAction::interested_options(),
                &DelayAction::PRODUCES,
            )
            .unwrap();
        Fixture {
            coordinator,
            action,
            stats,
            list,
        }
    }

    /// A connection whose waits return at once
    fn killed_connection(user: &str, host: &str) -> Connection {
        let conn = Connection::new(SecurityContext::new(user, host));
        conn.kill_handle().kill();
        conn
    }

    #[test]
    fn test_wait_time_formula_and_clamping() {
        let l = limits(3, 1000, 10_000);
        assert_eq!(l.wait_time(3), 1000);
        assert_eq!(l.wait_time(4), 2000);
        assert_eq!(l.wait_time(5), 3000);
        assert_eq!(l.wait_time(100), 10_000);

        // Below the minimum the lower clamp applies
        assert_eq!(limits(3, 5000, 10_000).wait_time(3), 5000);
    }

    #[test]
    fn test_wait_time_prefers_max_when_bounds_inverted_or_overflowing() {
        assert_eq!(limits(3, 9000, 4000).wait_time(3), 4000);
        assert_eq!(limits(1, 1000, 7000).wait_time(u64::MAX), 7000);
    }

    #[test]
    fn test_triggers_delay_only_at_or_above_enabled_threshold() {
        let l = limits(3, 1000, 10_000);
        assert!(!l.triggers_delay(0));
        assert!(!l.triggers_delay(2));
        assert!(l.triggers_delay(3));
        assert!(!limits(0, 1000, 10_000).triggers_delay(1_000));
    }

    #[test]
    fn test_failures_below_threshold_are_counted_without_delay() {
        let f = fixture(limits(3, 1000, 10_000));
        let conn = Connection::new(SecurityContext::new("u", "h"));

        let start = Instant::now();
        for _ in 0..3 {
            f.coordinator
                .notify_event(&ConnectionEvent::connect(AuthOutcome::Failure, &conn));
        }
        assert!(start.elapsed() < Duration::from_millis(900));
        assert_eq!(f.list.count(&AccountKey::from("'u'@'h'")), 3);
        assert_eq!(f.stats.get(StatId::DelayGenerated), 0);
    }

    #[test]
    fn test_delay_counted_and_success_clears_entry() {
        let f = fixture(limits(2, 1000, 10_000));
        let conn = killed_connection("u", "h");
        let key = AccountKey::from("'u'@'h'");

        for _ in 0..3 {
            f.coordinator
                .notify_event(&ConnectionEvent::connect(AuthOutcome::Failure, &conn));
        }
        assert_eq!(f.list.count(&key), 3);
        assert_eq!(f.stats.get(StatId::DelayGenerated), 1);

        f.coordinator
            .notify_event(&ConnectionEvent::change_user(AuthOutcome::Success, &conn));
        assert_eq!(f.stats.get(StatId::DelayGenerated), 2);
        assert_eq!(f.list.count(&key), 0);
    }

    #[test]
    fn test_non_authentication_events_are_ignored() {
        let f = fixture(limits(1, 1000, 10_000));
        let conn = killed_connection("u", "h");
        f.coordinator.notify_event(&ConnectionEvent::new(
            crate::models::EventSubclass::Disconnect,
            AuthOutcome::Failure,
            &conn,
        ));
        assert_eq!(f.list.size(), 0);
    }

    #[test]
    fn test_missing_security_context_is_neither_delayed_nor_counted() {
        let f = fixture(limits(1, 1000, 10_000));
        let conn = Connection::without_security_context();
        f.coordinator
            .notify_event(&ConnectionEvent::connect(AuthOutcome::Failure, &conn));
        assert_eq!(f.list.size(), 0);
        assert_eq!(f.stats.get(StatId::DelayGenerated), 0);
    }

    #[test]
    fn test_threshold_change_resets_counter_and_map() {
        let f = fixture(limits(1, 1000, 10_000));
        let conn = killed_connection("u", "h");
        for _ in 0..3 {
            f.coordinator
                .notify_event(&ConnectionEvent::connect(AuthOutcome::Failure, &conn));
        }
        assert_eq!(f.stats.get(StatId::DelayGenerated), 2);

        f.coordinator
            .notify_config_change(ControlOption::FailedConnectionsThreshold, 5);
        assert_eq!(f.action.limits().threshold, 5);
        assert_eq!(f.stats.get(StatId::DelayGenerated), 0);
        assert_eq!(f.list.size(), 0);
    }

    #[test]
    fn test_delay_bounds_respect_each_other() {
        let f = fixture(limits(3, 5000, 5000));
        f.coordinator
            .notify_config_change(ControlOption::MinConnectionDelay, 6000);
        assert_eq!(f.action.limits().min_delay, 5000);

        f.coordinator
            .notify_config_change(ControlOption::MaxConnectionDelay, 8000);
        f.coordinator
            .notify_config_change(ControlOption::MinConnectionDelay, 6000);
        assert_eq!(f.action.limits(), limits(3, 6000, 8000));
    }

    #[test]
    fn test_real_wait_is_at_least_min_delay() {
        let f = fixture(limits(1, 1000, 1000));
        let conn = Connection::new(SecurityContext::new("slow", "h"));
        f.coordinator
            .notify_event(&ConnectionEvent::connect(AuthOutcome::Failure, &conn));

        let start = Instant::now();
        f.coordinator
            .notify_event(&ConnectionEvent::connect(AuthOutcome::Failure, &conn));
        assert!(start.elapsed() >= Duration::from_millis(1000));
        assert_eq!(f.list.count(&AccountKey::from("'slow'@'h'")), 2);
    }

    #[test]
    fn test_disable_stops_delays() {
        let f = fixture(limits(1, 1000, 10_000));
        f.action.disable();
        assert_eq!(f.action.limits().threshold, DISABLE_THRESHOLD);
    }
}

//! Fan-out of connection events and option changes to subscribers.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{ConnectionControlError, Result};
use crate::models::{ConnectionEvent, ControlOption, OptionSet, StatAction, StatId};
use crate::services::failed_attempts::FailedAttemptsList;
use crate::services::variables::Statistics;

/// A subscriber of the event coordinator
pub trait ConnectionEventObserver: Send + Sync {
    /// Handle a connection event reported by the host
    fn notify_event(&self, reporter: &StatReporter<'_>, event: &ConnectionEvent<'_>) -> Result<()>;

    /// Handle a committed change of a system variable
    fn notify_option(
        &self,
        reporter: &StatReporter<'_>,
        option: ControlOption,
        value: i64,
    ) -> Result<()>;
}

/// Registration handle of a subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(usize);

struct Subscriber {
    id: SubscriberId,
    observer: Arc<dyn ConnectionEventObserver>,
    options: OptionSet,
}

/// Capability handed to a subscriber during a notification; reports status
/// counter changes on behalf of that subscriber only.
pub struct StatReporter<'a> {
    coordinator: &'a EventCoordinator,
    subscriber: SubscriberId,
}

impl StatReporter<'_> {
    pub fn report(&self, stat: StatId, action: StatAction) -> Result<()> {
        self.coordinator.report_stat(self.subscriber, stat, action)
    }
}

/// Registry of subscribers and sole writer of the status counters
///
/// Subscribers register while the coordinator is still exclusively owned
/// (component initialization); afterwards it is only used through shared
/// references, so the subscriber list needs no lock.
pub struct EventCoordinator {
    subscribers: Vec<Subscriber>,
    stat_producers: [Option<SubscriberId>; StatId::COUNT],
    statistics: Arc<Statistics>,
    failed_attempts: Arc<FailedAttemptsList>,
}

impl fmt::Debug for EventCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventCoordinator")
            .field("subscribers", &self.subscribers.len())
            .field("stat_producers", &self.stat_producers)
            .finish()
    }
}

impl EventCoordinator {
    pub fn new(statistics: Arc<Statistics>, failed_attempts: Arc<FailedAttemptsList>) -> Self {
        Self {
            subscribers: Vec::new(),
            stat_producers: [None; StatId::COUNT],
            statistics,
            failed_attempts,
        }
    }

    /// Add a subscriber
    ///
    /// `options` selects which option changes it receives; `produces` lists the
    /// status counters it becomes the only writer of. If any of those counters
    /// already has a producer, nothing is registered.
    pub fn register_subscriber(
        &mut self,
        observer: Arc<dyn ConnectionEventObserver>,
        options: OptionSet,
        produces: &[StatId],
    ) -> Result<SubscriberId> {
        if let Some(claimed) = produces
            .iter()
            .find(|stat| self.stat_producers[stat.index()].is_some())
        {
            return Err(ConnectionControlError::StatAlreadyClaimed(*claimed));
        }

        let id = SubscriberId(self.subscribers.len());
        self.subscribers.push(Subscriber {
            id,
            observer,
            options,
        });
        for stat in produces {
            self.stat_producers[stat.index()] = Some(id);
        }

        debug!(subscriber = id.0, produces = ?produces, "Subscriber registered");
        Ok(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver a connection event to every subscriber in registration order
    pub fn notify_event(&self, event: &ConnectionEvent<'_>) {
        for subscriber in &self.subscribers {
            let reporter = self.reporter(subscriber.id);
            if let Err(e) = subscriber.observer.notify_event(&reporter, event) {
                warn!(
                    subscriber = subscriber.id.0,
                    error = %e,
                    "Subscriber failed to handle connection event"
                );
            }
        }
    }

    /// Deliver an option change to the subscribers interested in `option`
    pub fn notify_config_change(&self, option: ControlOption, value: i64) {
        for subscriber in self
            .subscribers
            .iter()
            .filter(|s| s.options.contains(option))
        {
            let reporter = self.reporter(subscriber.id);
            if let Err(e) = subscriber.observer.notify_option(&reporter, option, value) {
                warn!(
                    subscriber = subscriber.id.0,
                    option = %option,
                    value,
                    error = %e,
                    "Subscriber failed to apply option change"
                );
            }
        }
    }

    /// Apply `action` to `stat` if `subscriber` is its registered producer
    ///
    /// Resetting the delay counter also clears every failed login counter.
    pub fn report_stat(&self, subscriber: SubscriberId, stat: StatId, action: StatAction) -> Result<()> {
        if self.stat_producers[stat.index()] != Some(subscriber) {
            return Err(ConnectionControlError::StatNotOwned(stat));
        }

        match action {
            StatAction::Increment => self.statistics.increment(stat),
            StatAction::Reset => {
                self.statistics.reset(stat);
                self.failed_attempts.reset();
            }
        }
        Ok(())
    }

    fn reporter(&self, subscriber: SubscriberId) -> StatReporter<'_> {
        StatReporter {
            coordinator: self,
            subscriber,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountKey, AuthOutcome, Connection, SecurityContext};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<AuthOutcome>>,
        options: Mutex<Vec<(ControlOption, i64)>>,
        fail: bool,
        bump_on_event: bool,
    }

    impl ConnectionEventObserver for Recorder {
        fn notify_event(&self, reporter: &StatReporter<'_>, event: &ConnectionEvent<'_>) -> Result<()> {
            self.events.lock().push(event.outcome);
            if self.bump_on_event {
                reporter.report(StatId::DelayGenerated, StatAction::Increment)?;
            }
            if self.fail {
                return Err(ConnectionControlError::SubscriberReportedError("boom".into()));
            }
            Ok(())
        }

        fn notify_option(
            &self,
            _reporter: &StatReporter<'_>,
            option: ControlOption,
            value: i64,
        ) -> Result<()> {
            self.options.lock().push((option, value));
            if self.fail {
                return Err(ConnectionControlError::SubscriberReportedError("boom".into()));
            }
            Ok(())
        }
    }

    fn coordinator() -> (EventCoordinator, Arc<Statistics>, Arc<FailedAttemptsList>) {
        let stats = Arc::new(Statistics::new());
        let list = Arc::new(FailedAttemptsList::new());
        (
            EventCoordinator::new(Arc::clone(&stats), Arc::clone(&list)),
            stats,
            list,
        )
    }

    #[test]
    fn test_second_producer_for_stat_is_rejected_atomically() {
        let (mut coordinator, _, _) = coordinator();
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());

        let first_id = coordinator
            .register_subscriber(first, OptionSet::all(), &[StatId::DelayGenerated])
            .unwrap();
        let err = coordinator
            .register_subscriber(second, OptionSet::all(), &[StatId::DelayGenerated])
            .unwrap_err();

        assert_eq!(err, ConnectionControlError::StatAlreadyClaimed(StatId::DelayGenerated));
        assert_eq!(coordinator.subscriber_count(), 1);
        assert!(coordinator
            .report_stat(first_id, StatId::DelayGenerated, StatAction::Increment)
            .is_ok());
    }

    #[test]
    fn test_only_producer_may_report() {
        let (mut coordinator, stats, _) = coordinator();
        let producer = coordinator
            .register_subscriber(Arc::new(Recorder::default()), OptionSet::empty(), &[StatId::DelayGenerated])
            .unwrap();
        let bystander = coordinator
            .register_subscriber(Arc::new(Recorder::default()), OptionSet::empty(), &[])
            .unwrap();

        assert_eq!(
            coordinator.report_stat(bystander, StatId::DelayGenerated, StatAction::Increment),
            Err(ConnectionControlError::StatNotOwned(StatId::DelayGenerated))
        );
        coordinator
            .report_stat(producer, StatId::DelayGenerated, StatAction::Increment)
            .unwrap();
        assert_eq!(stats.get(StatId::DelayGenerated), 1);
    }

    #[test]
    fn test_reset_clears_counter_and_failed_attempts() {
        let (mut coordinator, stats, list) = coordinator();
        let id = coordinator
            .register_subscriber(Arc::new(Recorder::default()), OptionSet::empty(), &[StatId::DelayGenerated])
            .unwrap();
        list.define(&AccountKey::from("'u'@'h'"));
        coordinator
            .report_stat(id, StatId::DelayGenerated, StatAction::Increment)
            .unwrap();

        coordinator
            .report_stat(id, StatId::DelayGenerated, StatAction::Reset)
            .unwrap();
        assert_eq!(stats.get(StatId::DelayGenerated), 0);
        assert_eq!(list.size(), 0);
    }

    #[test]
    fn test_failing_subscriber_does_not_stop_fan_out() {
        let (mut coordinator, stats, _) = coordinator();
        let failing = Arc::new(Recorder {
            fail: true,
            ..Default::default()
        });
        let healthy = Arc::new(Recorder {
            bump_on_event: true,
            ..Default::default()
        });
        coordinator
            .register_subscriber(failing.clone(), OptionSet::all(), &[])
            .unwrap();
        coordinator
            .register_subscriber(healthy.clone(), OptionSet::all(), &[StatId::DelayGenerated])
            .unwrap();

        let conn = Connection::new(SecurityContext::new("u", "h"));
        coordinator.notify_event(&ConnectionEvent::connect(AuthOutcome::Failure, &conn));

        assert_eq!(failing.events.lock().len(), 1);
        assert_eq!(healthy.events.lock().len(), 1);
        assert_eq!(stats.get(StatId::DelayGenerated), 1);
    }

    #[test]
    fn test_option_changes_go_only_to_interested_subscribers() {
        let (mut coordinator, _, _) = coordinator();
        let thresholds = Arc::new(Recorder::default());
        let delays = Arc::new(Recorder::default());
        coordinator
            .register_subscriber(
                thresholds.clone(),
                OptionSet::empty().with(ControlOption::FailedConnectionsThreshold),
                &[],
            )
            .unwrap();
        coordinator
            .register_subscriber(
                delays.clone(),
                OptionSet::empty()
                    .with(ControlOption::MinConnectionDelay)
                    .with(ControlOption::MaxConnectionDelay),
                &[],
            )
            .unwrap();

        coordinator.notify_config_change(ControlOption::MaxConnectionDelay, 9000);
        coordinator.notify_config_change(ControlOption::FailedConnectionsThreshold, 4);

        assert_eq!(
            *thresholds.options.lock(),
            vec![(ControlOption::FailedConnectionsThreshold, 4)]
        );
        assert_eq!(*delays.options.lock(), vec![(ControlOption::MaxConnectionDelay, 9000)]);
    }
}

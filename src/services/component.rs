//! Component lifecycle and the entry points the host calls into.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info};

use crate::config::ConnectionControlConfig;
use crate::error::Result;
use crate::models::{AccountKey, ConnectionEvent, ControlOption, FailedLoginAttempt, StatId};
use crate::services::coordinator::EventCoordinator;
use crate::services::delay::{DelayAction, DelayLimits};
use crate::services::failed_attempts::FailedAttemptsList;
use crate::services::host::{HostServices, VariableDefinition};
use crate::services::table::{TableCursor, TableShare};
use crate::services::variables::{Statistics, SystemVariables};

/// Host registrations made by `init`, undone in reverse on failure and at unload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Registration {
    Table,
    Variables,
    StatusVariable,
}

impl Registration {
    fn undo(self, host: &dyn HostServices) -> Result<()> {
        match self {
            Registration::Table => host.unregister_table(&TableShare::FAILED_LOGIN_ATTEMPTS),
            Registration::Variables => host.unregister_variables(&variable_definitions()),
            Registration::StatusVariable => {
                host.unregister_status_variable(StatId::DelayGenerated)
            }
        }
    }
}

fn variable_definitions() -> Vec<VariableDefinition> {
    ControlOption::ALL
        .into_iter()
        .map(VariableDefinition::from)
        .collect()
}

/// The loaded connection control component
///
/// Owns the failed login counters, the status counters, the committed
/// system variables, the event coordinator and the delay action. Dropping it
/// without calling [`ConnectionControl::deinit`] leaves the host registrations
/// in place.
pub struct ConnectionControl {
    host: Arc<dyn HostServices>,
    failed_attempts: Arc<FailedAttemptsList>,
    statistics: Arc<Statistics>,
    variables: SystemVariables,
    coordinator: EventCoordinator,
    delay_action: Arc<DelayAction>,
    config_lock: Mutex<()>,
}

impl fmt::Debug for ConnectionControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionControl")
            .field("variables", &self.variables)
            .field("coordinator", &self.coordinator)
            .field("delay_action", &self.delay_action.limits())
            .finish()
    }
}

impl ConnectionControl {
    /// Load the component
    ///
    /// Registers the observability table, the system variables and the
    /// status variable with `host`, then wires the delay action into a fresh
    /// event coordinator. If any step fails, the steps already completed are
    /// undone in reverse order and the error is returned.
    pub fn init(host: Arc<dyn HostServices>, config: ConnectionControlConfig) -> Result<Self> {
        config.validate()?;

        let mut completed = Vec::with_capacity(3);
        match Self::load(host.as_ref(), config, &mut completed) {
            Ok((failed_attempts, statistics, coordinator, delay_action)) => {
                info!(
                    threshold = config.failed_connections_threshold,
                    min_delay = config.min_connection_delay,
                    max_delay = config.max_connection_delay,
                    "Connection control initialized"
                );
                Ok(Self {
                    host,
                    failed_attempts,
                    statistics,
                    variables: SystemVariables::new(&config),
                    coordinator,
                    delay_action,
                    config_lock: Mutex::new(()),
                })
            }
            Err(e) => {
                error!(error = %e, "Connection control failed to initialize");
                for step in completed.into_iter().rev() {
                    if let Err(undo) = step.undo(host.as_ref()) {
                        error!(step = ?step, error = %undo, "Failed to roll back registration");
                    }
                }
                Err(e)
            }
        }
    }

    #[allow(clippy::type_complexity)]
    fn load(
        host: &dyn HostServices,
        config: ConnectionControlConfig,
        completed: &mut Vec<Registration>,
    ) -> Result<(
        Arc<FailedAttemptsList>,
        Arc<Statistics>,
        EventCoordinator,
        Arc<DelayAction>,
    )> {
        host.register_table(&TableShare::FAILED_LOGIN_ATTEMPTS)?;
        completed.push(Registration::Table);

        host.register_variables(&variable_definitions())?;
        completed.push(Registration::Variables);

        host.register_status_variable(StatId::DelayGenerated)?;
        completed.push(Registration::StatusVariable);

        let failed_attempts = Arc::new(FailedAttemptsList::new());
        let statistics = Arc::new(Statistics::new());
        let mut coordinator =
            EventCoordinator::new(Arc::clone(&statistics), Arc::clone(&failed_attempts));

        let delay_action = Arc::new(DelayAction::new(
            DelayLimits::from(&config),
            Arc::clone(&failed_attempts),
        ));
        coordinator.register_subscriber(
            delay_action.clone(),
            DelayAction::interested_options(),
            &DelayAction::PRODUCES,
        )?;

        Ok((failed_attempts, statistics, coordinator, delay_action))
    }

    /// Unload the component, undoing every registration
    ///
    /// Individual failures are logged and do not stop the remaining steps.
    pub fn deinit(self) {
        self.delay_action.disable();

        for step in [
            Registration::StatusVariable,
            Registration::Variables,
            Registration::Table,
        ] {
            if let Err(e) = step.undo(self.host.as_ref()) {
                error!(step = ?step, error = %e, "Failed to unregister during shutdown");
            }
        }

        self.failed_attempts.reset();
        info!("Connection control deinitialized");
    }

    /// Feed a connection event from the host
    ///
    /// May block the calling thread for the imposed delay. Never fails;
    /// subscriber errors are logged.
    pub fn on_connection_event(&self, event: &ConnectionEvent<'_>) {
        self.coordinator.notify_event(event);
    }

    /// Validate a proposed value for the variable called `name`
    pub fn check_variable(&self, name: &str, value: i64) -> Result<ControlOption> {
        let option: ControlOption = name.parse()?;
        self.variables.check(option, value)?;
        Ok(option)
    }

    /// Commit an already checked value and notify subscribers
    pub fn update_variable(&self, name: &str, value: i64) -> Result<ControlOption> {
        let option: ControlOption = name.parse()?;
        self.variables.update(option, value, &self.coordinator);
        Ok(option)
    }

    /// Check then update as one step; concurrent calls are serialized
    pub fn set_variable(&self, name: &str, value: i64) -> Result<ControlOption> {
        let _guard = self.config_lock.lock();
        let option = self.check_variable(name, value)?;
        self.variables.update(option, value, &self.coordinator);
        Ok(option)
    }

    /// Committed values of the three system variables
    pub fn variables(&self) -> ConnectionControlConfig {
        ConnectionControlConfig {
            failed_connections_threshold: self.variables.threshold(),
            min_connection_delay: self.variables.min_delay(),
            max_connection_delay: self.variables.max_delay(),
        }
    }

    /// Read callback of `Component_connection_control_delay_generated`
    pub fn delay_generated(&self) -> u64 {
        self.statistics.get(StatId::DelayGenerated)
    }

    /// Open a cursor over a snapshot of the failed login attempts table
    pub fn open_table(&self) -> TableCursor {
        TableCursor::open(&self.failed_attempts)
    }

    /// Row count reported to the host; read live, so it may differ from an open snapshot
    pub fn table_row_count(&self) -> usize {
        self.failed_attempts.size()
    }

    pub fn failed_login_attempts(&self) -> Vec<FailedLoginAttempt> {
        let mut cursor = self.open_table();
        let mut rows = Vec::with_capacity(cursor.len());
        cursor.rnd_init();
        while let Some(row) = cursor.rnd_next() {
            rows.push(row.clone());
        }
        rows
    }

    pub fn failed_attempts_for(&self, key: &AccountKey) -> u64 {
        self.failed_attempts.count(key)
    }

    pub fn delay_action(&self) -> &DelayAction {
        &self.delay_action
    }
}

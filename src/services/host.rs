//! Registration services the component requires from its host.

use std::collections::BTreeSet;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::OptionBounds;
use crate::error::{ConnectionControlError, Result};
use crate::models::{ControlOption, StatId};
use crate::services::table::TableShare;

/// A system variable as announced to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub bounds: OptionBounds,
}

impl From<ControlOption> for VariableDefinition {
    fn from(option: ControlOption) -> Self {
        Self {
            name: option.name(),
            description: option.description(),
            bounds: OptionBounds::of(option),
        }
    }
}

/// Registration calls the component makes while loading and unloading
pub trait HostServices: Send + Sync {
    fn register_table(&self, share: &TableShare) -> Result<()>;
    fn unregister_table(&self, share: &TableShare) -> Result<()>;

    fn register_variables(&self, variables: &[VariableDefinition]) -> Result<()>;
    fn unregister_variables(&self, variables: &[VariableDefinition]) -> Result<()>;

    fn register_status_variable(&self, stat: StatId) -> Result<()>;
    fn unregister_status_variable(&self, stat: StatId) -> Result<()>;
}

/// Host that keeps its registrations in memory
///
/// Any registration whose name was passed to [`InProcessHost::refuse`] fails,
/// which lets callers exercise the component's load failure handling.
#[derive(Debug, Default)]
pub struct InProcessHost {
    registered: Mutex<BTreeSet<String>>,
    refused: Mutex<BTreeSet<String>>,
}

impl InProcessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make registration of `name` fail from now on
    pub fn refuse(&self, name: impl Into<String>) {
        self.refused.lock().insert(name.into());
    }

    pub fn with_refusal(self, name: impl Into<String>) -> Self {
        self.refuse(name);
        self
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.lock().contains(name)
    }

    /// Names currently registered, sorted
    pub fn registrations(&self) -> Vec<String> {
        self.registered.lock().iter().cloned().collect()
    }

    fn register(&self, step: &'static str, name: &str) -> Result<()> {
        if self.refused.lock().contains(name) {
            return Err(ConnectionControlError::Registration {
                step,
                reason: format!("host refused '{}'", name),
            });
        }
        if !self.registered.lock().insert(name.to_string()) {
            return Err(ConnectionControlError::Registration {
                step,
                reason: format!("'{}' is already registered", name),
            });
        }
        debug!(name, "Registered with host");
        Ok(())
    }

    fn unregister(&self, step: &'static str, name: &str) -> Result<()> {
        if !self.registered.lock().remove(name) {
            return Err(ConnectionControlError::Registration {
                step,
                reason: format!("'{}' is not registered", name),
            });
        }
        debug!(name, "Unregistered from host");
        Ok(())
    }
}

impl HostServices for InProcessHost {
    fn register_table(&self, share: &TableShare) -> Result<()> {
        self.register("register table", share.name)?;
        info!(table = share.name, read_only = share.read_only, "Table registered");
        Ok(())
    }

    fn unregister_table(&self, share: &TableShare) -> Result<()> {
        self.unregister("unregister table", share.name)
    }

    /// All or nothing: a refused variable rolls back the ones registered before it
    fn register_variables(&self, variables: &[VariableDefinition]) -> Result<()> {
        for (done, variable) in variables.iter().enumerate() {
            if let Err(e) = self.register("register system variables", variable.name) {
                for registered in &variables[..done] {
                    let _ = self.unregister("unregister system variables", registered.name);
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn unregister_variables(&self, variables: &[VariableDefinition]) -> Result<()> {
        let mut first_error = None;
        for variable in variables {
            if let Err(e) = self.unregister("unregister system variables", variable.name) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn register_status_variable(&self, stat: StatId) -> Result<()> {
        self.register("register status variable", stat.status_name())
    }

    fn unregister_status_variable(&self, stat: StatId) -> Result<()> {
        self.unregister("unregister status variable", stat.status_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variables() -> Vec<VariableDefinition> {
        ControlOption::ALL.into_iter().map(VariableDefinition::from).collect()
    }

    #[test]
    fn test_register_and_unregister_round_trip() {
        let host = InProcessHost::new();
        host.register_table(&TableShare::FAILED_LOGIN_ATTEMPTS).unwrap();
        host.register_status_variable(StatId::DelayGenerated).unwrap();
        assert!(host.is_registered("connection_control_failed_login_attempts"));
        assert!(host.is_registered("Component_connection_control_delay_generated"));

        host.unregister_table(&TableShare::FAILED_LOGIN_ATTEMPTS).unwrap();
        host.unregister_status_variable(StatId::DelayGenerated).unwrap();
        assert!(host.registrations().is_empty());
    }

    #[test]
    fn test_refused_variable_rolls_back_the_group() {
        let host = InProcessHost::new()
            .with_refusal(ControlOption::MaxConnectionDelay.name());

        let err = host.register_variables(&all_variables()).unwrap_err();
        assert!(matches!(err, ConnectionControlError::Registration { .. }));
        assert!(host.registrations().is_empty());
    }

    #[test]
    fn test_double_registration_and_missing_unregistration_fail() {
        let host = InProcessHost::new();
        host.register_status_variable(StatId::DelayGenerated).unwrap();
        assert!(host.register_status_variable(StatId::DelayGenerated).is_err());

        assert!(host.unregister_table(&TableShare::FAILED_LOGIN_ATTEMPTS).is_err());
    }

    #[test]
    fn test_variable_definition_carries_bounds() {
        let definition = VariableDefinition::from(ControlOption::MinConnectionDelay);
        assert_eq!(definition.name, "component_connection_control.min_connection_delay");
        assert_eq!(definition.bounds, OptionBounds::of(ControlOption::MinConnectionDelay));
    }
}

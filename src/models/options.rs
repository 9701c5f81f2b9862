//! Identifiers for system variables, status variables and their actions.

use std::fmt;
use std::str::FromStr;

use crate::error::ConnectionControlError;

/// Prefix under which the component registers its system variables
pub const VARIABLE_PREFIX: &str = "component_connection_control";

/// System variables owned by the component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControlOption {
    FailedConnectionsThreshold,
    MinConnectionDelay,
    MaxConnectionDelay,
}

impl ControlOption {
    pub const ALL: [ControlOption; 3] = [
        ControlOption::FailedConnectionsThreshold,
        ControlOption::MinConnectionDelay,
        ControlOption::MaxConnectionDelay,
    ];

    /// Variable name without the component prefix
    pub fn short_name(self) -> &'static str {
        match self {
            ControlOption::FailedConnectionsThreshold => "failed_connections_threshold",
            ControlOption::MinConnectionDelay => "min_connection_delay",
            ControlOption::MaxConnectionDelay => "max_connection_delay",
        }
    }

    /// Fully qualified variable name, e.g. `component_connection_control.min_connection_delay`
    pub fn name(self) -> &'static str {
        match self {
            ControlOption::FailedConnectionsThreshold => {
                "component_connection_control.failed_connections_threshold"
            }
            ControlOption::MinConnectionDelay => "component_connection_control.min_connection_delay",
            ControlOption::MaxConnectionDelay => "component_connection_control.max_connection_delay",
        }
    }

    /// Help text registered alongside the variable
    pub fn description(self) -> &'static str {
        match self {
            ControlOption::FailedConnectionsThreshold => {
                "Failed connection threshold to trigger delay. Default is 3."
            }
            ControlOption::MinConnectionDelay => {
                "Minimum delay in msec to be introduced. Default is 1000."
            }
            ControlOption::MaxConnectionDelay => {
                "Maximum delay in msec to be introduced. Default is 2147483647."
            }
        }
    }

    fn bit(self) -> u8 {
        match self {
            ControlOption::FailedConnectionsThreshold => 1 << 0,
            ControlOption::MinConnectionDelay => 1 << 1,
            ControlOption::MaxConnectionDelay => 1 << 2,
        }
    }
}

impl fmt::Display for ControlOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ControlOption {
    type Err = ConnectionControlError;

    /// Accepts both the qualified and the short variable name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let short = match trimmed.split_once('.') {
            Some((prefix, rest)) if prefix.eq_ignore_ascii_case(VARIABLE_PREFIX) => rest,
            Some(_) => return Err(ConnectionControlError::UnknownOption(s.to_string())),
            None => trimmed,
        };

        ControlOption::ALL
            .into_iter()
            .find(|option| option.short_name().eq_ignore_ascii_case(short))
            .ok_or_else(|| ConnectionControlError::UnknownOption(s.to_string()))
    }
}

/// Set of options a subscriber wants change notifications for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionSet(u8);

impl OptionSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        ControlOption::ALL.into_iter().collect()
    }

    pub fn with(mut self, option: ControlOption) -> Self {
        self.0 |= option.bit();
        self
    }

    pub fn contains(&self, option: ControlOption) -> bool {
        self.0 & option.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<ControlOption> for OptionSet {
    fn from_iter<I: IntoIterator<Item = ControlOption>>(iter: I) -> Self {
        iter.into_iter().fold(OptionSet::empty(), OptionSet::with)
    }
}

/// Name of the status variable exposing the delay counter
pub const DELAY_GENERATED_STATUS_NAME: &str = "Component_connection_control_delay_generated";

/// Status counters maintained by the component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatId {
    DelayGenerated,
}

impl StatId {
    pub const COUNT: usize = 1;

    pub fn index(self) -> usize {
        match self {
            StatId::DelayGenerated => 0,
        }
    }

    pub fn status_name(self) -> &'static str {
        match self {
            StatId::DelayGenerated => DELAY_GENERATED_STATUS_NAME,
        }
    }
}

impl fmt::Display for StatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status_name())
    }
}

/// Mutation a producer can apply to one of its status counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatAction {
    Increment,
    Reset,
}

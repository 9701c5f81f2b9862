//! Connection control option bounds and startup configuration.

use std::env;

use crate::error::{ConnectionControlError, Result};
use crate::models::ControlOption;

/// Lowest accepted threshold; also the value that disables delays
pub const MIN_THRESHOLD: i64 = 0;
pub const DISABLE_THRESHOLD: i64 = 0;
pub const MAX_THRESHOLD: i64 = i32::MAX as i64;
pub const DEFAULT_THRESHOLD: i64 = 3;

/// Delay bounds in milliseconds
pub const MIN_DELAY: i64 = 1000;
pub const MAX_DELAY: i64 = i32::MAX as i64;
pub const DEFAULT_MIN_DELAY: i64 = 1000;
pub const DEFAULT_MAX_DELAY: i64 = i32::MAX as i64;

/// Declared range and default of one system variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionBounds {
    pub min: i64,
    pub max: i64,
    pub default: i64,
}

impl OptionBounds {
    pub fn of(option: ControlOption) -> Self {
        match option {
            ControlOption::FailedConnectionsThreshold => Self {
                min: MIN_THRESHOLD,
                max: MAX_THRESHOLD,
                default: DEFAULT_THRESHOLD,
            },
            ControlOption::MinConnectionDelay => Self {
                min: MIN_DELAY,
                max: MAX_DELAY,
                default: DEFAULT_MIN_DELAY,
            },
            ControlOption::MaxConnectionDelay => Self {
                min: MIN_DELAY,
                max: MAX_DELAY,
                default: DEFAULT_MAX_DELAY,
            },
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Values the component starts with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionControlConfig {
    pub failed_connections_threshold: i64,
    pub min_connection_delay: i64,
    pub max_connection_delay: i64,
}

impl Default for ConnectionControlConfig {
    fn default() -> Self {
        Self {
            failed_connections_threshold: DEFAULT_THRESHOLD,
            min_connection_delay: DEFAULT_MIN_DELAY,
            max_connection_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl ConnectionControlConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let failed_connections_threshold = env::var("CONNECTION_CONTROL_FAILED_CONNECTIONS_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_THRESHOLD);

        let min_connection_delay = env::var("CONNECTION_CONTROL_MIN_CONNECTION_DELAY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MIN_DELAY);

        let max_connection_delay = env::var("CONNECTION_CONTROL_MAX_CONNECTION_DELAY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_DELAY);

        Self {
            failed_connections_threshold,
            min_connection_delay,
            max_connection_delay,
        }
    }

    pub fn get(&self, option: ControlOption) -> i64 {
        match option {
            ControlOption::FailedConnectionsThreshold => self.failed_connections_threshold,
            ControlOption::MinConnectionDelay => self.min_connection_delay,
            ControlOption::MaxConnectionDelay => self.max_connection_delay,
        }
    }

    /// Check every value against its range and the min/max ordering
    pub fn validate(&self) -> Result<()> {
        for option in ControlOption::ALL {
            let value = self.get(option);
            if !OptionBounds::of(option).contains(value) {
                return Err(ConnectionControlError::OptionOutOfRange { option, value });
            }
        }
        if self.min_connection_delay > self.max_connection_delay {
            return Err(ConnectionControlError::OptionCrossConstraintViolation {
                option: ControlOption::MinConnectionDelay,
                value: self.min_connection_delay,
                counterpart: ControlOption::MaxConnectionDelay,
                bound: self.max_connection_delay,
            });
        }
        Ok(())
    }
}

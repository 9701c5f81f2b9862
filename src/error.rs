//! Error taxonomy for the connection control component.

use crate::models::{ControlOption, StatId};

/// Convenience alias used throughout the crate.
pub type Result<T, E = ConnectionControlError> = std::result::Result<T, E>;

/// Errors raised by the connection control component
///
/// Errors produced inside a per-event callback are logged and absorbed by the
/// caller. Errors produced on configuration or initialization paths are
/// returned so the host can reject the change or refuse to load.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionControlError {
    #[error("Out of memory while {0}")]
    OutOfMemory(&'static str),

    #[error("Value {value} is out of range for {option}")]
    OptionOutOfRange { option: ControlOption, value: i64 },

    #[error("Value {value} for {option} conflicts with {counterpart} = {bound}")]
    OptionCrossConstraintViolation {
        option: ControlOption,
        value: i64,
        counterpart: ControlOption,
        bound: i64,
    },

    #[error("Security context is not available for this connection")]
    MissingSecurityContext,

    #[error("Subscriber reported an error: {0}")]
    SubscriberReportedError(String),

    #[error("Status variable {0} already has a producer")]
    StatAlreadyClaimed(StatId),

    #[error("Subscriber is not the producer of status variable {0}")]
    StatNotOwned(StatId),

    #[error("Unknown system variable: {0}")]
    UnknownOption(String),

    #[error("Failed to {step}: {reason}")]
    Registration { step: &'static str, reason: String },
}

impl ConnectionControlError {
    /// Whether the error is a rejected option value (as opposed to an internal failure)
    pub fn is_rejected_value(&self) -> bool {
        matches!(
            self,
            ConnectionControlError::OptionOutOfRange { .. }
                | ConnectionControlError::OptionCrossConstraintViolation { .. }
                | ConnectionControlError::UnknownOption(_)
        )
    }

    /// Short message suitable for an API response
    pub fn user_message(&self) -> String {
        match self {
            ConnectionControlError::OptionOutOfRange { option, .. } => {
                format!("Value is outside the allowed range for {}", option)
            }
            ConnectionControlError::OptionCrossConstraintViolation {
                option, counterpart, ..
            } => format!("{} must stay consistent with {}", option, counterpart),
            ConnectionControlError::UnknownOption(name) => {
                format!("Unknown system variable '{}'", name)
            }
            _ => "Internal error in connection control".to_string(),
        }
    }
}

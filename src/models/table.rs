//! Row and column types of the failed login attempts table.

use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

/// Name under which the observability table is registered
pub const FAILED_LOGIN_ATTEMPTS_TABLE: &str = "connection_control_failed_login_attempts";

/// Column definition of the observability table
pub const FAILED_LOGIN_ATTEMPTS_DEFINITION: &str =
    "USERHOST VARCHAR(6553) NOT NULL, FAILED_ATTEMPTS INT NOT NULL";

/// One row of `connection_control_failed_login_attempts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Apiv2Schema)]
pub struct FailedLoginAttempt {
    /// Account key, `'user'@'host'`
    #[serde(rename = "USERHOST")]
    pub userhost: String,
    /// Consecutive failed logins recorded for the account
    #[serde(rename = "FAILED_ATTEMPTS")]
    pub failed_attempts: u64,
}

/// Value of a single column read from the current row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnValue<'a> {
    Varchar(&'a str),
    Unsigned(u64),
}

impl FailedLoginAttempt {
    pub const USERHOST_COLUMN: usize = 0;
    pub const FAILED_ATTEMPTS_COLUMN: usize = 1;

    pub fn column(&self, index: usize) -> Option<ColumnValue<'_>> {
        match index {
            Self::USERHOST_COLUMN => Some(ColumnValue::Varchar(&self.userhost)),
            Self::FAILED_ATTEMPTS_COLUMN => Some(ColumnValue::Unsigned(self.failed_attempts)),
            _ => None,
        }
    }
}

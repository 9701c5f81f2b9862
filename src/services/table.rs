//! Read-only observability table over the failed login counters.

use tracing::warn;

use crate::models::{
    ColumnValue, FAILED_LOGIN_ATTEMPTS_DEFINITION, FAILED_LOGIN_ATTEMPTS_TABLE, FailedLoginAttempt,
};
use crate::services::failed_attempts::FailedAttemptsList;

/// Registration record of a table exposed to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableShare {
    pub name: &'static str,
    pub definition: &'static str,
    pub read_only: bool,
}

impl TableShare {
    pub const FAILED_LOGIN_ATTEMPTS: TableShare = TableShare {
        name: FAILED_LOGIN_ATTEMPTS_TABLE,
        definition: FAILED_LOGIN_ATTEMPTS_DEFINITION,
        read_only: true,
    };
}

/// Cursor over a snapshot of the failed login counters
///
/// The snapshot is taken when the cursor is opened; later changes to the
/// counters are not visible through it.
#[derive(Debug)]
pub struct TableCursor {
    rows: Vec<FailedLoginAttempt>,
    position: usize,
    before_first_row: bool,
}

impl TableCursor {
    /// Open a cursor; an unallocatable snapshot yields an empty table
    pub fn open(failed_attempts: &FailedAttemptsList) -> Self {
        let rows = failed_attempts.snapshot().unwrap_or_else(|e| {
            warn!(
                table = FAILED_LOGIN_ATTEMPTS_TABLE,
                error = %e,
                "Failed to snapshot failed login attempts"
            );
            Vec::new()
        });

        Self {
            rows,
            position: 0,
            before_first_row: true,
        }
    }

    /// Rewind to before the first row
    ///
    /// Returns `true` when the table has no rows.
    pub fn rnd_init(&mut self) -> bool {
        self.reset_position();
        self.rows.is_empty()
    }

    /// Advance to the next row and return it, `None` at the end
    pub fn rnd_next(&mut self) -> Option<&FailedLoginAttempt> {
        if self.before_first_row {
            self.before_first_row = false;
        } else if self.position < self.rows.len() {
            self.position += 1;
        }
        self.rows.get(self.position)
    }

    /// Positioned reads behave like sequential ones
    pub fn rnd_pos(&mut self) -> Option<&FailedLoginAttempt> {
        self.rnd_next()
    }

    /// Value of column `index` of the current row
    pub fn read_column(&self, index: usize) -> Option<ColumnValue<'_>> {
        if self.before_first_row {
            return None;
        }
        self.rows.get(self.position)?.column(index)
    }

    pub fn reset_position(&mut self) {
        self.position = 0;
        self.before_first_row = true;
    }

    /// Rows held by the snapshot
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Release the snapshot and hand its rows back
    pub fn close(self) -> Vec<FailedLoginAttempt> {
        self.rows
    }
}

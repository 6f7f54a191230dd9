use thiserror::Error;

use crate::models::{BillingPeriod, RecordError};
use crate::store::{StoreError, Table};

/// Why a settlement run produced no result.
///
/// None of these are fatal: the caller shows the message and carries on.
#[derive(Error, Debug)]
pub enum AllocationError {
    #[error("No invoice data recorded yet. Import an invoice first.")]
    MissingInvoiceData,

    #[error("No sessions configured for {0}")]
    NoSessionsForPeriod(BillingPeriod),

    #[error("No attendance recorded for the sessions in {0}")]
    NoAttendanceForPeriod(BillingPeriod),

    #[error("Malformed {table} row {row}: {reason}")]
    MalformedRecord {
        table: Table,
        /// One-based, as shown to the user
        row: usize,
        reason: RecordError,
    },

    #[error("Could not read the records: {0}")]
    Store(#[from] StoreError),
}

impl AllocationError {
    /// Build from a zero-based row index
    pub fn malformed(table: Table, index: usize, reason: RecordError) -> Self {
        AllocationError::MalformedRecord {
            table,
            row: index + 1,
            reason,
        }
    }
}

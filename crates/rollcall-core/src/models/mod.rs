//! Data models for club records.
//!
//! Everything in the store is an untyped row of cells. This module contains
//! the typed records and their row conversions:
//!
//! - `AttendanceRecord`, `Response`: one Yes/No answer for a session date
//! - `InvoiceRecord`: an imported invoice amount
//! - `SessionDate`, `BillingPeriod`: the configured session calendar

pub mod attendance;
pub mod invoice;
pub mod parse;
pub mod session;

pub use attendance::{AttendanceRecord, Response};
pub use invoice::{InvoiceRecord, InvoiceSource};
pub use parse::RecordError;
pub use session::{BillingPeriod, SessionDate};

/// A single row in a table: one string per cell.
pub type Row = Vec<String>;

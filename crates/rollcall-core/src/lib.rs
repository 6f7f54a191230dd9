//! Core library for rollcall.
//!
//! Club attendance is registered into an append-only table store; a monthly
//! invoice is split over the sessions it bills for and among the people who
//! attended them.
//!
//! - `models`: typed records and their row layouts
//! - `store`: the append/read-all table interface and its backends
//! - `allocation`: the monthly cost allocator
//! - `attendance`: registration and net-attendance resolution
//! - `invoice`: invoice amount extraction and import
//! - `schedule`, `stats`: session calendar and read-only statistics

pub mod allocation;
pub mod attendance;
pub mod config;
pub mod invoice;
pub mod models;
pub mod schedule;
pub mod stats;
pub mod store;
pub mod utils;

pub use allocation::{AllocationError, AllocationReport, Allocator, MonthlyAllocation};
pub use config::Config;
pub use models::{AttendanceRecord, BillingPeriod, InvoiceRecord, Response, SessionDate};
pub use store::{JsonStore, MemoryStore, Table, TableStore};

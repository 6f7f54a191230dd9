//! Monthly cost allocation.
//!
//! The last imported invoice bills for the calendar month before the one it
//! arrived in. Its amount is split equally over that month's configured
//! sessions, and each session's cost is split equally among the people who
//! net-attended it.

pub mod allocator;
pub mod error;

pub use allocator::{
    allocate, AllocationReport, Allocator, DayShare, MonthlyAllocation, PersonShare,
};
pub use error::AllocationError;

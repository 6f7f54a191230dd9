//! Utility functions for number and string formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{format_amount, format_money, truncate_string};

//! Lenient parsing of cell values.
//!
//! Rows come from a hand-edited table, so dates show up in a few spellings.
//! Anything not listed here is rejected rather than guessed.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

/// Canonical format for timestamps written to the store
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Canonical format for dates written to the store
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("missing column {0}")]
    MissingColumn(usize),

    #[error("unparseable date: {0:?}")]
    InvalidDate(String),

    #[error("unparseable timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("non-numeric amount: {0:?}")]
    InvalidAmount(String),

    #[error("unknown response: {0:?} (expected Yes or No)")]
    InvalidResponse(String),
}

/// Fetch a cell by index, failing if the row is too short.
pub fn cell(row: &[String], index: usize) -> Result<&str, RecordError> {
    row.get(index)
        .map(|s| s.trim())
        .ok_or(RecordError::MissingColumn(index))
}

/// Parse a calendar date.
///
/// Accepts `YYYY-MM-DD`, `YYYY.MM.DD` (with or without a trailing dot) and
/// `YYYY/MM/DD`, optionally followed by a time part after a space or `T`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let head: String = trimmed.chars().take(10).collect();
    let rest = trimmed[head.len()..].trim_start_matches('.');
    if !(rest.is_empty() || rest.starts_with(' ') || rest.starts_with('T')) {
        return None;
    }

    let normalized = head.replace(['.', '/'], "-");
    NaiveDate::parse_from_str(&normalized, DATE_FORMAT).ok()
}

/// Parse a timestamp. A bare date is read as midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();

    for format in [TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(ts);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }

    // Only a bare date may fall through; "2024-02-03 nonsense" is rejected
    if trimmed.chars().count() > 11 {
        return None;
    }
    parse_date(trimmed).map(|d| d.and_time(NaiveTime::MIN))
}

/// Parse a money amount, ignoring spaces used as thousands separators.
pub fn parse_amount(value: &str) -> Option<f64> {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();
    // Plain decimal notation only: no sign, exponent or "inf"/"NaN"
    let digits_and_point = compact.chars().all(|c| c.is_ascii_digit() || c == '.');
    if !digits_and_point
        || compact.matches('.').count() > 1
        || !compact.chars().any(|c| c.is_ascii_digit())
    {
        return None;
    }

    match compact.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => Some(amount),
        _ => None,
    }
}

//! Invoice amount extraction and import.
//!
//! Invoices arrive as documents whose text has already been extracted. The
//! payable total is found by its label ("Végösszeg: 30 000 Ft" and friends);
//! everything else on the invoice is ignored.

use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{InvoiceRecord, InvoiceSource, Row};
use crate::store::{StoreError, Table, TableStore};

/// Labels that introduce the payable total
pub const AMOUNT_LABELS: &[&str] = &["Végösszeg", "Fizetendő", "Total due", "Amount due"];

static AMOUNT_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn amount_pattern() -> Option<&'static Regex> {
    AMOUNT_PATTERN
        .get_or_init(|| {
            let labels = AMOUNT_LABELS
                .iter()
                .map(|l| regex::escape(l))
                .collect::<Vec<_>>()
                .join("|");
            // Thousands may be grouped with spaces or dots; \s covers no-break spaces
            let pattern = format!(r"(?i)(?:{})\s*:?\s*([\d\s.]+?)\s*(?:Ft|HUF)\b", labels);
            Regex::new(&pattern).ok()
        })
        .as_ref()
}

#[derive(Error, Debug)]
pub enum InvoiceError {
    #[error("No payable total found (looked for: {})", AMOUNT_LABELS.join(", "))]
    AmountNotFound,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Failed to save invoice: {0}")]
    Store(#[from] StoreError),
}

/// Find the labelled total in invoice text and return it as whole currency
/// units. Separators are dropped, only digits are kept.
pub fn extract_amount(text: &str) -> Option<u64> {
    let captures = amount_pattern()?.captures(text)?;
    let digits: String = captures
        .get(1)?
        .as_str()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Extract the total from `text` and append it as an auto-imported invoice.
pub fn import_invoice_text(
    store: &impl TableStore,
    text: &str,
    received_at: NaiveDateTime,
) -> Result<InvoiceRecord, InvoiceError> {
    let amount = extract_amount(text).ok_or(InvoiceError::AmountNotFound)?;
    let record = InvoiceRecord::imported(amount, received_at);
    store.append_rows(Table::Invoices, &[record.to_row()])?;
    info!(amount, "Invoice imported");
    Ok(record)
}

/// Append an amount typed in by an admin.
pub fn add_manual_invoice(
    store: &impl TableStore,
    amount: &str,
    received_at: NaiveDateTime,
) -> Result<InvoiceRecord, InvoiceError> {
    let value = crate::models::parse::parse_amount(amount)
        .filter(|v| *v > 0.0)
        .ok_or_else(|| InvoiceError::InvalidAmount(amount.to_string()))?;
    let record = InvoiceRecord::new(received_at, value, InvoiceSource::Manual);
    store.append_rows(Table::Invoices, &[record.to_row()])?;
    info!(amount = value, "Manual invoice recorded");
    Ok(record)
}

/// One line of invoice history. Rows that fail to parse are kept verbatim so
/// the history view can still show them.
#[derive(Debug, Clone, PartialEq)]
pub enum InvoiceEntry {
    Parsed(InvoiceRecord),
    Unreadable(Row),
}

/// Every invoice row in append order (the last one is the one settled)
pub fn invoice_history(store: &impl TableStore) -> Result<Vec<InvoiceEntry>, StoreError> {
    let rows = store.read_all_rows(Table::Invoices)?;
    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| match InvoiceRecord::from_row(&row) {
            Ok(record) => InvoiceEntry::Parsed(record),
            Err(e) => {
                debug!(row = i + 1, error = %e, "Unreadable invoice row");
                InvoiceEntry::Unreadable(row)
            }
        })
        .collect())
}

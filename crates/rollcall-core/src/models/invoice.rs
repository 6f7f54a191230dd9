use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::parse::{cell, parse_amount, parse_timestamp, RecordError, TIMESTAMP_FORMAT};
use super::Row;

/// Where an invoice row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceSource {
    /// Amount extracted from invoice text
    AutoImport,
    /// Amount typed in by an admin
    Manual,
}

impl InvoiceSource {
    pub fn tag(&self) -> &'static str {
        match self {
            InvoiceSource::AutoImport => "Email Auto-Import",
            InvoiceSource::Manual => "Manual",
        }
    }
}

/// An invoice amount received for the club's court/hall rental.
///
/// Only the most recent record is ever settled; older ones are history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub received_at: NaiveDateTime,
    pub amount: f64,
    pub source: String,
}

impl InvoiceRecord {
    const RECEIVED_AT: usize = 0;
    const AMOUNT: usize = 1;
    const SOURCE: usize = 2;

    pub fn new(received_at: NaiveDateTime, amount: f64, source: InvoiceSource) -> Self {
        Self {
            received_at,
            amount,
            source: source.tag().to_string(),
        }
    }

    /// Record for an amount pulled out of invoice text
    pub fn imported(amount: u64, received_at: NaiveDateTime) -> Self {
        Self::new(received_at, amount as f64, InvoiceSource::AutoImport)
    }

    /// Layout: `[received_at, amount, source]`. The source column is optional.
    pub fn from_row(row: &[String]) -> Result<Self, RecordError> {
        let raw = cell(row, Self::RECEIVED_AT)?;
        let received_at =
            parse_timestamp(raw).ok_or_else(|| RecordError::InvalidTimestamp(raw.to_string()))?;

        let raw = cell(row, Self::AMOUNT)?;
        let amount = parse_amount(raw).ok_or_else(|| RecordError::InvalidAmount(raw.to_string()))?;

        let source = cell(row, Self::SOURCE).unwrap_or_default().to_string();

        Ok(Self {
            received_at,
            amount,
            source,
        })
    }

    pub fn to_row(&self) -> Row {
        let amount = if self.amount.fract() == 0.0 {
            format!("{:.0}", self.amount)
        } else {
            self.amount.to_string()
        };
        vec![
            self.received_at.format(TIMESTAMP_FORMAT).to_string(),
            amount,
            self.source.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_row_with_spaced_amount() {
        let invoice =
            InvoiceRecord::from_row(&row(&["2024-02-03 09:00:00", "30 000", "Email Auto-Import"]))
                .unwrap();
        assert_eq!(invoice.amount, 30000.0);
        assert_eq!(invoice.received_at.date(), NaiveDate::from_ymd_opt(2024, 2, 3).unwrap());
        assert_eq!(invoice.source, "Email Auto-Import");
    }

    #[test]
    fn test_from_row_without_source() {
        let invoice = InvoiceRecord::from_row(&row(&["2024-02-03", "1500"])).unwrap();
        assert_eq!(invoice.source, "");
    }

    #[test]
    fn test_from_row_malformed_amount() {
        assert_eq!(
            InvoiceRecord::from_row(&row(&["2024-02-03", "thirty"])),
            Err(RecordError::InvalidAmount("thirty".to_string()))
        );
    }

    #[test]
    fn test_imported_row() {
        let at = NaiveDate::from_ymd_opt(2024, 2, 3)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(
            InvoiceRecord::imported(30000, at).to_row(),
            row(&["2024-02-03 09:00:00", "30000", "Email Auto-Import"])
        );
        let manual = InvoiceRecord::new(at, 12.5, InvoiceSource::Manual);
        assert_eq!(manual.to_row()[1], "12.5");
        assert_eq!(manual.to_row()[2], "Manual");
    }
}

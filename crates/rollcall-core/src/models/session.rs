use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::parse::{parse_date, RecordError, DATE_FORMAT};
use super::Row;

/// A date on which a club session is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionDate(pub NaiveDate);

impl SessionDate {
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Parse each non-empty cell of a settings row as a date. A header
    /// cell such as "Dátum" yields an error for that cell only.
    pub fn parse_cells(row: &[String]) -> impl Iterator<Item = Result<Self, RecordError>> + '_ {
        row.iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(|c| {
                parse_date(c)
                    .map(SessionDate)
                    .ok_or_else(|| RecordError::InvalidDate(c.to_string()))
            })
    }

    pub fn to_row(&self) -> Row {
        vec![self.0.format(DATE_FORMAT).to_string()]
    }
}

impl std::fmt::Display for SessionDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

/// A calendar month an invoice bills for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub year: i32,
    pub month: u32,
}

impl BillingPeriod {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// The month before `date`'s month. January rolls back to December.
    pub fn preceding(date: NaiveDate) -> Self {
        if date.month() == 1 {
            Self::new(date.year() - 1, 12)
        } else {
            Self::new(date.year(), date.month() - 1)
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(first) => write!(f, "{}", first.format("%B %Y")),
            None => write!(f, "{}-{:02}", self.year, self.month),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_preceding_same_year() {
        for month in 2..=12 {
            let period = BillingPeriod::preceding(ymd(2024, month, 15));
            assert_eq!(period, BillingPeriod::new(2024, month - 1));
        }
    }

    #[test]
    fn test_preceding_january_rolls_back() {
        assert_eq!(
            BillingPeriod::preceding(ymd(2024, 1, 3)),
            BillingPeriod::new(2023, 12)
        );
    }

    #[test]
    fn test_contains() {
        let period = BillingPeriod::new(2024, 1);
        assert!(period.contains(ymd(2024, 1, 31)));
        assert!(!period.contains(ymd(2023, 1, 2)));
        assert!(!period.contains(ymd(2024, 2, 1)));
    }

    #[test]
    fn test_display() {
        assert_eq!(BillingPeriod::new(2023, 12).to_string(), "December 2023");
    }

    #[test]
    fn test_parse_cells() {
        let row = vec![
            "Dátum".to_string(),
            "2024-01-02".to_string(),
            "".to_string(),
            "2024.01.09.".to_string(),
        ];
        let cells: Vec<_> = SessionDate::parse_cells(&row).collect();
        assert_eq!(
            cells,
            vec![
                Err(RecordError::InvalidDate("Dátum".to_string())),
                Ok(SessionDate(ymd(2024, 1, 2))),
                Ok(SessionDate(ymd(2024, 1, 9))),
            ]
        );
    }
}

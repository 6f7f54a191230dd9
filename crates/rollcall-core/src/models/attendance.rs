use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::parse::{cell, parse_date, parse_timestamp, RecordError, DATE_FORMAT, TIMESTAMP_FORMAT};
use super::Row;

/// Answer to "are you coming?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Response {
    Yes,
    No,
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Response::Yes => write!(f, "Yes"),
            Response::No => write!(f, "No"),
        }
    }
}

impl FromStr for Response {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("yes") || value.eq_ignore_ascii_case("y") {
            Ok(Response::Yes)
        } else if value.eq_ignore_ascii_case("no") || value.eq_ignore_ascii_case("n") {
            Ok(Response::No)
        } else {
            Err(RecordError::InvalidResponse(value.to_string()))
        }
    }
}

impl Response {
    /// Flip between Yes and No (form toggle)
    pub fn toggled(self) -> Self {
        match self {
            Response::Yes => Response::No,
            Response::No => Response::Yes,
        }
    }
}

/// One registration row. Several may exist for the same person and date;
/// see [`crate::attendance::net_status`] for how they are reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub person_name: String,
    pub response: Response,
    pub recorded_at: NaiveDateTime,
    pub session_date: NaiveDate,
}

impl AttendanceRecord {
    const NAME: usize = 0;
    const RESPONSE: usize = 1;
    const RECORDED_AT: usize = 2;
    const SESSION_DATE: usize = 3;

    pub fn new(
        person_name: impl Into<String>,
        response: Response,
        recorded_at: NaiveDateTime,
        session_date: NaiveDate,
    ) -> Self {
        Self {
            person_name: person_name.into(),
            response,
            recorded_at,
            session_date,
        }
    }

    /// Layout: `[person_name, response, recorded_at, session_date]`.
    ///
    /// `recorded_at` is informational only. When it is missing or
    /// unreadable it becomes midnight of the session date.
    pub fn from_row(row: &[String]) -> Result<Self, RecordError> {
        let session_date = Self::session_date_of(row)?;
        let recorded_at = row
            .get(Self::RECORDED_AT)
            .and_then(|raw| parse_timestamp(raw))
            .unwrap_or_else(|| session_date.and_time(NaiveTime::MIN));

        Ok(Self {
            person_name: cell(row, Self::NAME)?.to_string(),
            response: cell(row, Self::RESPONSE)?.parse()?,
            recorded_at,
            session_date,
        })
    }

    /// Read only the session date column of a row
    pub fn session_date_of(row: &[String]) -> Result<NaiveDate, RecordError> {
        let raw = cell(row, Self::SESSION_DATE)?;
        parse_date(raw).ok_or_else(|| RecordError::InvalidDate(raw.to_string()))
    }

    pub fn to_row(&self) -> Row {
        vec![
            self.person_name.clone(),
            self.response.to_string(),
            self.recorded_at.format(TIMESTAMP_FORMAT).to_string(),
            self.session_date.format(DATE_FORMAT).to_string(),
        ]
    }

    /// True for `"<host> - <guest>"` rows created alongside a host's Yes
    pub fn is_guest(&self) -> bool {
        self.person_name.contains(" - ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_response_from_str() {
        assert_eq!("Yes".parse::<Response>(), Ok(Response::Yes));
        assert_eq!("yes".parse::<Response>(), Ok(Response::Yes));
        assert_eq!(" N ".parse::<Response>(), Ok(Response::No));
        assert_eq!(
            "maybe".parse::<Response>(),
            Err(RecordError::InvalidResponse("maybe".to_string()))
        );
    }

    #[test]
    fn test_from_row() {
        let stored = row(&["Alice", "Yes", "2024-01-01 10:00:00", "2024-01-02"]);
        let record = AttendanceRecord::from_row(&stored).unwrap();
        assert_eq!(record.person_name, "Alice");
        assert_eq!(record.response, Response::Yes);
        assert_eq!(record.session_date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert!(!record.is_guest());
    }

    #[test]
    fn test_from_row_rejects_short_and_bad_rows() {
        assert_eq!(
            AttendanceRecord::from_row(&row(&["Alice", "Yes"])),
            Err(RecordError::MissingColumn(3))
        );
        assert_eq!(
            AttendanceRecord::from_row(&row(&["Alice", "Maybe", "", "2024-01-02"])),
            Err(RecordError::InvalidResponse("Maybe".to_string()))
        );
        assert_eq!(
            AttendanceRecord::from_row(&row(&["Alice", "Yes", "2024-01-01 10:00:00", "soon"])),
            Err(RecordError::InvalidDate("soon".to_string()))
        );
    }

    #[test]
    fn test_from_row_tolerates_bad_recorded_at() {
        let record =
            AttendanceRecord::from_row(&row(&["Alice", "No", "yesterday", "2024-01-02"])).unwrap();
        assert_eq!(record.response, Response::No);
        assert_eq!(
            record.recorded_at,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_time(NaiveTime::MIN)
        );

        let short = AttendanceRecord::from_row(&row(&["Alice", "Yes", "", "2024-01-02"])).unwrap();
        assert_eq!(short.recorded_at.date(), short.session_date);
    }

    #[test]
    fn test_row_layout_survives_store() {
        let stored = row(&["Bob - Carl", "No", "2024-01-01 10:00:00", "2024-01-09"]);
        let original = AttendanceRecord::from_row(&stored).unwrap();
        assert_eq!(original.to_row(), stored);
        assert!(original.is_guest());
    }
}

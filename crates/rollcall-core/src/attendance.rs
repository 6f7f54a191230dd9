//! Attendance registration and net-attendance resolution.
//!
//! A person may answer several times for the same session (sign up, then
//! cancel). The net status only looks at which answers exist, never at their
//! order: a single No cancels any number of Yes answers.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{AttendanceRecord, BillingPeriod, RecordError, Response, Row};
use crate::store::{StoreError, Table, TableStore};

/// Most guests one member can bring along in a single submission
pub const MAX_GUESTS: usize = 10;

/// Reconciled status of one person for one session date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetStatus {
    Attending,
    NotAttending,
    /// No record at all for this person and date
    Unknown,
}

/// Net status of `person` on `date`: attending iff there is at least one Yes
/// and no No.
pub fn net_status(records: &[AttendanceRecord], person: &str, date: NaiveDate) -> NetStatus {
    let mut seen_yes = false;
    for record in records
        .iter()
        .filter(|r| r.session_date == date && r.person_name == person)
    {
        match record.response {
            Response::No => return NetStatus::NotAttending,
            Response::Yes => seen_yes = true,
        }
    }

    if seen_yes {
        NetStatus::Attending
    } else {
        NetStatus::Unknown
    }
}

/// Everyone whose net status on `date` is attending, in name order.
pub fn net_attendees(records: &[AttendanceRecord], date: NaiveDate) -> BTreeSet<String> {
    let mut answers: BTreeMap<&str, (bool, bool)> = BTreeMap::new();
    for record in records.iter().filter(|r| r.session_date == date) {
        let entry = answers.entry(record.person_name.as_str()).or_default();
        match record.response {
            Response::Yes => entry.0 = true,
            Response::No => entry.1 = true,
        }
    }

    answers
        .into_iter()
        .filter(|(_, (yes, no))| *yes && !*no)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// The attendance records that bear on one billing period.
///
/// Rows whose session date is unreadable are skipped with a warning, and rows
/// for other months are skipped. A row inside the period with an unreadable
/// name or response is an error, since it could change who pays. The error
/// carries the zero-based row index. `recorded_at` is never required.
pub fn records_for_period(
    rows: &[Row],
    period: BillingPeriod,
) -> Result<Vec<AttendanceRecord>, (usize, RecordError)> {
    let mut records = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        match AttendanceRecord::session_date_of(row) {
            Ok(date) if period.contains(date) => {
                records.push(AttendanceRecord::from_row(row).map_err(|e| (i, e))?);
            }
            Ok(_) => {}
            Err(e) => warn!(row = i + 1, error = %e, "Skipping attendance row"),
        }
    }
    Ok(records)
}

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Please choose a name")]
    MissingName,

    #[error("{0} is not on the roster")]
    NotOnRoster(String),

    #[error("At most {max} guests per registration (got {got})")]
    TooManyGuests { max: usize, got: usize },

    #[error("No attendees selected")]
    NobodySelected,

    #[error("Failed to save registration: {0}")]
    Store(#[from] StoreError),
}

/// One filled-in attendance form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub response: Response,
    pub session_date: NaiveDate,
    pub guests: Vec<String>,
}

impl Submission {
    /// Check the form against the roster. An empty roster accepts any name.
    pub fn validate(&self, roster: &[String]) -> Result<(), RegistrationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(RegistrationError::MissingName);
        }
        if !roster.is_empty() && !roster.iter().any(|r| r == name) {
            return Err(RegistrationError::NotOnRoster(name.to_string()));
        }
        if self.guests.len() > MAX_GUESTS {
            return Err(RegistrationError::TooManyGuests {
                max: MAX_GUESTS,
                got: self.guests.len(),
            });
        }
        Ok(())
    }

    /// The member's own record, plus one `"<name> - <guest>"` Yes record per
    /// non-blank guest when the answer is Yes.
    pub fn records(&self, recorded_at: NaiveDateTime) -> Vec<AttendanceRecord> {
        let name = self.name.trim();
        let mut records = vec![AttendanceRecord::new(
            name,
            self.response,
            recorded_at,
            self.session_date,
        )];

        if self.response == Response::Yes {
            records.extend(
                self.guests
                    .iter()
                    .map(|g| g.trim())
                    .filter(|g| !g.is_empty())
                    .map(|g| {
                        AttendanceRecord::new(
                            format!("{} - {}", name, g),
                            Response::Yes,
                            recorded_at,
                            self.session_date,
                        )
                    }),
            );
        }

        records
    }

    /// Validate and append. Returns the number of rows written.
    pub fn submit(
        &self,
        store: &impl TableStore,
        roster: &[String],
        recorded_at: NaiveDateTime,
    ) -> Result<usize, RegistrationError> {
        self.validate(roster)?;
        let rows: Vec<Row> = self.records(recorded_at).iter().map(|r| r.to_row()).collect();
        store.append_rows(Table::Attendance, &rows)?;
        info!(
            name = %self.name.trim(),
            response = %self.response,
            date = %self.session_date,
            rows = rows.len(),
            "Attendance registered"
        );
        Ok(rows.len())
    }
}

/// Admin registration: one Yes record per distinct, non-blank name.
pub fn bulk_records(
    names: &[String],
    session_date: NaiveDate,
    recorded_at: NaiveDateTime,
) -> Vec<AttendanceRecord> {
    let unique: BTreeSet<&str> = names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .collect();

    unique
        .into_iter()
        .map(|name| AttendanceRecord::new(name, Response::Yes, recorded_at, session_date))
        .collect()
}

/// Append the admin's selection. Returns the number of people registered.
pub fn bulk_register(
    store: &impl TableStore,
    names: &[String],
    session_date: NaiveDate,
    recorded_at: NaiveDateTime,
) -> Result<usize, RegistrationError> {
    let records = bulk_records(names, session_date, recorded_at);
    if records.is_empty() {
        return Err(RegistrationError::NobodySelected);
    }

    let rows: Vec<Row> = records.iter().map(|r| r.to_row()).collect();
    store.append_rows(Table::Attendance, &rows)?;
    info!(date = %session_date, count = rows.len(), "Bulk attendance registered");
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn at(hour: u32) -> NaiveDateTime {
        ymd(2024, 1, 1).and_hms_opt(hour, 0, 0).unwrap()
    }

    fn record(name: &str, response: Response, hour: u32, date: NaiveDate) -> AttendanceRecord {
        AttendanceRecord::new(name, response, at(hour), date)
    }

    #[test]
    fn test_no_wins_regardless_of_order() {
        let day = ymd(2024, 1, 9);
        let yes_then_no = vec![
            record("Bob", Response::Yes, 8, day),
            record("Bob", Response::No, 9, day),
        ];
        let no_then_yes = vec![
            record("Bob", Response::No, 8, day),
            record("Bob", Response::Yes, 9, day),
        ];

        assert_eq!(net_status(&yes_then_no, "Bob", day), NetStatus::NotAttending);
        assert_eq!(net_status(&no_then_yes, "Bob", day), NetStatus::NotAttending);
        assert!(net_attendees(&yes_then_no, day).is_empty());
        assert!(net_attendees(&no_then_yes, day).is_empty());
    }

    #[test]
    fn test_net_attendees_per_date() {
        let d1 = ymd(2024, 1, 2);
        let d2 = ymd(2024, 1, 9);
        let records = vec![
            record("Bob", Response::Yes, 8, d1),
            record("Alice", Response::Yes, 8, d1),
            record("Alice", Response::Yes, 9, d1),
            record("Carl", Response::No, 8, d1),
            record("Alice", Response::Yes, 8, d2),
        ];

        let attendees: Vec<String> = net_attendees(&records, d1).into_iter().collect();
        assert_eq!(attendees, vec!["Alice".to_string(), "Bob".to_string()]);
        assert_eq!(net_status(&records, "Carl", d1), NetStatus::NotAttending);
        assert_eq!(net_status(&records, "Bob", d2), NetStatus::Unknown);
        assert_eq!(net_attendees(&records, d2).len(), 1);
    }

    #[test]
    fn test_submission_adds_guest_rows_for_yes() {
        let submission = Submission {
            name: "Alice".to_string(),
            response: Response::Yes,
            session_date: ymd(2024, 1, 9),
            guests: vec!["Dora".to_string(), "  ".to_string(), "Emil".to_string()],
        };
        let records = submission.records(at(10));
        let names: Vec<&str> = records.iter().map(|r| r.person_name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Alice - Dora", "Alice - Emil"]);
        assert!(records.iter().all(|r| r.response == Response::Yes));
    }

    #[test]
    fn test_submission_ignores_guests_for_no() {
        let submission = Submission {
            name: "Alice".to_string(),
            response: Response::No,
            session_date: ymd(2024, 1, 9),
            guests: vec!["Dora".to_string()],
        };
        assert_eq!(submission.records(at(10)).len(), 1);
    }

    #[test]
    fn test_submission_validation() {
        let roster = vec!["Alice".to_string(), "Bob".to_string()];
        let mut submission = Submission {
            name: " ".to_string(),
            response: Response::Yes,
            session_date: ymd(2024, 1, 9),
            guests: Vec::new(),
        };
        assert!(matches!(
            submission.validate(&roster),
            Err(RegistrationError::MissingName)
        ));

        submission.name = "Mallory".to_string();
        assert!(matches!(
            submission.validate(&roster),
            Err(RegistrationError::NotOnRoster(_))
        ));
        assert!(submission.validate(&[]).is_ok());

        submission.name = "Bob".to_string();
        submission.guests = vec!["g".to_string(); MAX_GUESTS + 1];
        assert!(matches!(
            submission.validate(&roster),
            Err(RegistrationError::TooManyGuests { got: 11, .. })
        ));
    }

    #[test]
    fn test_submit_appends_rows() {
        let store = MemoryStore::new();
        let submission = Submission {
            name: "Alice".to_string(),
            response: Response::Yes,
            session_date: ymd(2024, 1, 9),
            guests: vec!["Dora".to_string()],
        };
        assert_eq!(submission.submit(&store, &[], at(10)).unwrap(), 2);

        let rows = store.read_all_rows(Table::Attendance).unwrap();
        let parsed: Vec<AttendanceRecord> = rows
            .iter()
            .map(|row| AttendanceRecord::from_row(row).unwrap())
            .collect();
        assert_eq!(parsed, submission.records(at(10)));
    }

    #[test]
    fn test_bulk_register_dedupes_names() {
        let store = MemoryStore::new();
        let names = vec![
            "Bob".to_string(),
            "Alice".to_string(),
            "Bob".to_string(),
            "".to_string(),
        ];
        assert_eq!(bulk_register(&store, &names, ymd(2024, 1, 9), at(10)).unwrap(), 2);
        assert!(matches!(
            bulk_register(&store, &[], ymd(2024, 1, 9), at(10)),
            Err(RegistrationError::NobodySelected)
        ));
        assert_eq!(store.read_all_rows(Table::Attendance).unwrap().len(), 2);
    }

    #[test]
    fn test_records_for_period_skips_other_months_and_bad_dates() {
        let rows = vec![
            row(&["Zed", "Yes", "sometime", "2022-03-01"]),
            row(&["Old", "Perhaps", "2023-12-01 10:00:00", "2023-12-05"]),
            row(&["Ann", "Yes", "2024-01-01 10:00:00", "whenever"]),
            row(&["Alice", "Yes", "not a time", "2024-01-02"]),
            row(&["Bob", "No"]),
        ];
        let records = records_for_period(&rows, BillingPeriod::new(2024, 1)).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].person_name, "Alice");
        assert_eq!(records[0].recorded_at, ymd(2024, 1, 2).and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn test_records_for_period_rejects_bad_answer_inside_period() {
        let rows = vec![
            row(&["Alice", "Yes", "2024-01-01 10:00:00", "2024-01-02"]),
            row(&["Bob", "Perhaps", "2024-01-01 10:00:00", "2024-01-02"]),
        ];
        let (index, err) = records_for_period(&rows, BillingPeriod::new(2024, 1)).unwrap_err();
        assert_eq!(index, 1);
        assert_eq!(err, RecordError::InvalidResponse("Perhaps".to_string()));
    }
}

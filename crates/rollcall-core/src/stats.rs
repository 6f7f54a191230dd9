//! Read-only attendance statistics.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::attendance::net_attendees;
use crate::models::AttendanceRecord;

/// One line of the leaderboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub sessions: usize,
}

/// Net attendee count for one date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Headcount {
    pub date: NaiveDate,
    pub attendees: usize,
    /// How many of the attendees came as someone's guest
    pub guests: usize,
}

/// Number of people net-attending `date`.
pub fn headcount(records: &[AttendanceRecord], date: NaiveDate) -> usize {
    net_attendees(records, date).len()
}

/// Net attendees of `date` recorded as `"<host> - <guest>"` rows.
pub fn guest_headcount(records: &[AttendanceRecord], date: NaiveDate) -> usize {
    let attendees = net_attendees(records, date);
    records
        .iter()
        .filter(|r| r.session_date == date && r.is_guest())
        .map(|r| r.person_name.as_str())
        .filter(|name| attendees.contains(*name))
        .collect::<BTreeSet<_>>()
        .len()
}

fn recorded_dates(records: &[AttendanceRecord]) -> BTreeSet<NaiveDate> {
    records.iter().map(|r| r.session_date).collect()
}

/// Sessions attended per person, most first; ties by name.
pub fn leaderboard(records: &[AttendanceRecord]) -> Vec<LeaderboardEntry> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for date in recorded_dates(records) {
        for name in net_attendees(records, date) {
            *counts.entry(name).or_default() += 1;
        }
    }

    let mut entries: Vec<LeaderboardEntry> = counts
        .into_iter()
        .map(|(name, sessions)| LeaderboardEntry { name, sessions })
        .collect();
    // BTreeMap order is by name, and the sort is stable
    entries.sort_by(|a, b| b.sessions.cmp(&a.sessions));
    entries
}

/// Attendee count for every date that has any record, ascending by date.
pub fn session_headcounts(records: &[AttendanceRecord]) -> Vec<Headcount> {
    recorded_dates(records)
        .into_iter()
        .map(|date| Headcount {
            date,
            attendees: headcount(records, date),
            guests: guest_headcount(records, date),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Response;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(name: &str, response: Response, date: NaiveDate) -> AttendanceRecord {
        AttendanceRecord::new(name, response, ymd(2024, 1, 1).and_hms_opt(8, 0, 0).unwrap(), date)
    }

    fn sample() -> Vec<AttendanceRecord> {
        let d1 = ymd(2024, 1, 2);
        let d2 = ymd(2024, 1, 9);
        let d3 = ymd(2024, 1, 16);
        vec![
            rec("Bob", Response::Yes, d1),
            rec("Alice", Response::Yes, d1),
            rec("Alice", Response::Yes, d2),
            rec("Bob", Response::Yes, d2),
            rec("Bob", Response::No, d2),
            rec("Carl", Response::Yes, d2),
            rec("Alice", Response::Yes, d3),
            rec("Carl", Response::No, d3),
            rec("Alice - Dora", Response::Yes, d3),
            rec("Alice - Dora", Response::Yes, d3),
            rec("Bob - Eve", Response::Yes, d2),
            rec("Bob - Eve", Response::No, d2),
        ]
    }

    #[test]
    fn test_headcount() {
        let records = sample();
        assert_eq!(headcount(&records, ymd(2024, 1, 2)), 2);
        assert_eq!(headcount(&records, ymd(2024, 1, 9)), 2);
        assert_eq!(headcount(&records, ymd(2024, 1, 23)), 0);
    }

    #[test]
    fn test_leaderboard_order() {
        let board = leaderboard(&sample());
        let view: Vec<(&str, usize)> = board
            .iter()
            .map(|e| (e.name.as_str(), e.sessions))
            .collect();
        assert_eq!(
            view,
            vec![("Alice", 3), ("Alice - Dora", 1), ("Bob", 1), ("Carl", 1)]
        );
    }

    #[test]
    fn test_session_headcounts() {
        let counts = session_headcounts(&sample());
        let view: Vec<(usize, usize)> = counts.iter().map(|h| (h.attendees, h.guests)).collect();
        assert_eq!(view, vec![(2, 0), (2, 0), (2, 1)]);
        assert_eq!(counts[0].date, ymd(2024, 1, 2));
    }

    #[test]
    fn test_guest_headcount_counts_net_attending_guests_once() {
        let records = sample();
        assert_eq!(guest_headcount(&records, ymd(2024, 1, 16)), 1);
        // Eve's No cancels her Yes
        assert_eq!(guest_headcount(&records, ymd(2024, 1, 9)), 0);
        assert_eq!(guest_headcount(&records, ymd(2024, 1, 2)), 0);
    }

    #[test]
    fn test_empty_records() {
        assert!(leaderboard(&[]).is_empty());
        assert!(session_headcounts(&[]).is_empty());
    }
}

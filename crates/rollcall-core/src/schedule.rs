//! Weekly session calendar helpers and the configured session list.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use tracing::info;

use crate::models::{Row, SessionDate};
use crate::store::{StoreError, Table, TableStore};

/// The most recent `weekday` on or before `today`.
pub fn last_session_on_or_before(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let back = (7 + today.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    today - Duration::days(i64::from(back))
}

/// Session dates around `today`, ascending: the most recent session and
/// `past - 1` weeks before it, then `future` weeks after it.
pub fn session_dates_around(
    today: NaiveDate,
    weekday: Weekday,
    past: usize,
    future: usize,
) -> Vec<NaiveDate> {
    let anchor = last_session_on_or_before(today, weekday);

    let mut dates: Vec<NaiveDate> = (0..past)
        .rev()
        .map(|weeks| anchor - Duration::weeks(weeks as i64))
        .collect();
    dates.extend((1..=future).map(|weeks| anchor + Duration::weeks(weeks as i64)));
    dates
}

/// The session a plain "I'm coming" registration is for: one week after the
/// most recent session. On the session weekday itself that is next week.
pub fn next_session(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    last_session_on_or_before(today, weekday) + Duration::weeks(1)
}

/// Add dates to the configured session list. Returns how many were new.
pub fn add_session_dates(
    store: &impl TableStore,
    dates: &[NaiveDate],
) -> Result<usize, StoreError> {
    let existing = configured_sessions(store)?;
    let mut fresh: Vec<SessionDate> = dates
        .iter()
        .copied()
        .map(SessionDate)
        .filter(|d| !existing.contains(d))
        .collect();
    fresh.sort();
    fresh.dedup();

    if !fresh.is_empty() {
        let rows: Vec<Row> = fresh.iter().map(SessionDate::to_row).collect();
        store.append_rows(Table::SessionDates, &rows)?;
        info!(added = fresh.len(), "Session dates added");
    }
    Ok(fresh.len())
}

/// Every readable date in the session list, sorted and deduplicated.
/// Unreadable cells are skipped here; settlement logs them.
pub fn configured_sessions(store: &impl TableStore) -> Result<Vec<SessionDate>, StoreError> {
    let rows = store.read_all_rows(Table::SessionDates)?;
    let mut dates: Vec<SessionDate> = rows
        .iter()
        .flat_map(|row| SessionDate::parse_cells(row))
        .flatten()
        .collect();
    dates.sort();
    dates.dedup();
    Ok(dates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_last_session_on_or_before() {
        // 2024-01-09 is a Tuesday
        assert_eq!(last_session_on_or_before(ymd(2024, 1, 9), Weekday::Tue), ymd(2024, 1, 9));
        assert_eq!(last_session_on_or_before(ymd(2024, 1, 10), Weekday::Tue), ymd(2024, 1, 9));
        assert_eq!(last_session_on_or_before(ymd(2024, 1, 8), Weekday::Tue), ymd(2024, 1, 2));
        assert_eq!(last_session_on_or_before(ymd(2024, 1, 14), Weekday::Sun), ymd(2024, 1, 14));
    }

    #[test]
    fn test_session_dates_around() {
        let dates = session_dates_around(ymd(2024, 1, 11), Weekday::Tue, 3, 2);
        assert_eq!(
            dates,
            vec![
                ymd(2023, 12, 26),
                ymd(2024, 1, 2),
                ymd(2024, 1, 9),
                ymd(2024, 1, 16),
                ymd(2024, 1, 23),
            ]
        );
        assert!(dates.iter().all(|d| d.weekday() == Weekday::Tue));
    }

    #[test]
    fn test_session_dates_around_future_only() {
        assert_eq!(
            session_dates_around(ymd(2024, 1, 11), Weekday::Tue, 0, 1),
            vec![ymd(2024, 1, 16)]
        );
    }

    #[test]
    fn test_next_session() {
        assert_eq!(next_session(ymd(2024, 1, 10), Weekday::Tue), ymd(2024, 1, 16));
        assert_eq!(next_session(ymd(2024, 1, 9), Weekday::Tue), ymd(2024, 1, 16));
        assert_eq!(next_session(ymd(2024, 1, 8), Weekday::Tue), ymd(2024, 1, 9));
    }

    #[test]
    fn test_add_session_dates_skips_known() {
        let store = MemoryStore::new();
        let dates = [ymd(2024, 1, 9), ymd(2024, 1, 2), ymd(2024, 1, 9)];
        assert_eq!(add_session_dates(&store, &dates).unwrap(), 2);
        assert_eq!(add_session_dates(&store, &[ymd(2024, 1, 2), ymd(2024, 1, 16)]).unwrap(), 1);
        assert_eq!(add_session_dates(&store, &[ymd(2024, 1, 16)]).unwrap(), 0);

        let dates: Vec<NaiveDate> = configured_sessions(&store)
            .unwrap()
            .iter()
            .map(SessionDate::date)
            .collect();
        assert_eq!(dates, vec![ymd(2024, 1, 2), ymd(2024, 1, 9), ymd(2024, 1, 16)]);
    }

    #[test]
    fn test_configured_sessions_skips_unreadable_cells() {
        let store = MemoryStore::new();
        let rows: Vec<Row> = vec![
            vec!["Dátum".into()],
            vec!["2024-01-09".into(), "soon".into(), "2024-01-02".into()],
        ];
        store.append_rows(Table::SessionDates, &rows).unwrap();

        let dates: Vec<NaiveDate> = configured_sessions(&store)
            .unwrap()
            .iter()
            .map(SessionDate::date)
            .collect();
        assert_eq!(dates, vec![ymd(2024, 1, 2), ymd(2024, 1, 9)]);
    }
}

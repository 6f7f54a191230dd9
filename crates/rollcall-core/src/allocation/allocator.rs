use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::AllocationError;
use crate::attendance::{self, net_attendees};
use crate::models::{AttendanceRecord, BillingPeriod, InvoiceRecord, SessionDate};
use crate::store::{Table, TableStore};
use crate::utils::format_money;

/// What one person owes for the period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonShare {
    pub name: String,
    pub total: f64,
    /// Number of sessions in the period this person attended
    pub sessions: usize,
}

/// Cost breakdown for one session date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayShare {
    pub date: NaiveDate,
    pub session_cost: f64,
    pub attendees: Vec<String>,
    /// Zero when nobody attended
    pub per_person: f64,
}

impl DayShare {
    pub fn attendee_count(&self) -> usize {
        self.attendees.len()
    }
}

/// Result of splitting one invoice over the sessions of its billing period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAllocation {
    pub period: BillingPeriod,
    pub invoice: InvoiceRecord,
    pub per_session_cost: f64,
    /// Sorted by name
    pub people: Vec<PersonShare>,
    /// Sorted by date, including sessions nobody attended
    pub days: Vec<DayShare>,
}

impl MonthlyAllocation {
    pub fn status_message(&self, currency: &str) -> String {
        format!(
            "Settled {} ({})",
            self.period,
            format_money(self.invoice.amount, currency)
        )
    }

    /// Sum of everyone's share. Equals the invoice amount unless some
    /// session had no attendees.
    pub fn charged_total(&self) -> f64 {
        self.people.iter().map(|p| p.total).sum()
    }

    pub fn share_of(&self, name: &str) -> Option<&PersonShare> {
        self.people.iter().find(|p| p.name == name)
    }
}

/// Split the most recent invoice over the sessions of the month before it.
///
/// Pure: the same three collections always give the same result.
pub fn allocate(
    attendance: &[AttendanceRecord],
    invoices: &[InvoiceRecord],
    sessions: &[SessionDate],
) -> Result<MonthlyAllocation, AllocationError> {
    let invoice = invoices.last().ok_or(AllocationError::MissingInvoiceData)?;
    let period = BillingPeriod::preceding(invoice.received_at.date());

    let dates: BTreeSet<NaiveDate> = sessions
        .iter()
        .map(SessionDate::date)
        .filter(|d| period.contains(*d))
        .collect();
    if dates.is_empty() {
        return Err(AllocationError::NoSessionsForPeriod(period));
    }

    let per_session_cost = invoice.amount / dates.len() as f64;
    debug!(%period, sessions = dates.len(), per_session_cost, "Resolved billing period");

    let mut days = Vec::with_capacity(dates.len());
    let mut totals: BTreeMap<String, (f64, usize)> = BTreeMap::new();

    for date in dates {
        let attendees: Vec<String> = net_attendees(attendance, date).into_iter().collect();
        let per_person = if attendees.is_empty() {
            0.0
        } else {
            per_session_cost / attendees.len() as f64
        };

        for name in &attendees {
            let entry = totals.entry(name.clone()).or_default();
            entry.0 += per_person;
            entry.1 += 1;
        }

        days.push(DayShare {
            date,
            session_cost: per_session_cost,
            attendees,
            per_person,
        });
    }

    if totals.is_empty() {
        return Err(AllocationError::NoAttendanceForPeriod(period));
    }

    let people = totals
        .into_iter()
        .map(|(name, (total, sessions))| PersonShare {
            name,
            total,
            sessions,
        })
        .collect();

    Ok(MonthlyAllocation {
        period,
        invoice: invoice.clone(),
        per_session_cost,
        people,
        days,
    })
}

/// Message plus optional result, ready for display.
#[derive(Debug, Clone)]
pub struct AllocationReport {
    pub message: String,
    pub allocation: Option<MonthlyAllocation>,
}

impl AllocationReport {
    pub fn is_success(&self) -> bool {
        self.allocation.is_some()
    }
}

/// Store-backed settlement runs.
#[derive(Debug, Clone)]
pub struct Allocator {
    currency: String,
}

impl Allocator {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
        }
    }

    /// Read a fresh snapshot and settle it.
    ///
    /// Only the last invoice row must parse; older invoices are history and
    /// may hold anything. Unreadable session-date cells (a header, say) are
    /// skipped with a warning, and attendance rows are filtered to the
    /// billing period first (see [`attendance::records_for_period`]).
    pub fn try_settle(
        &self,
        store: &impl TableStore,
    ) -> Result<MonthlyAllocation, AllocationError> {
        let invoice_rows = store.read_all_rows(Table::Invoices)?;
        let invoice = match invoice_rows.last() {
            Some(row) => InvoiceRecord::from_row(row).map_err(|e| {
                AllocationError::malformed(Table::Invoices, invoice_rows.len() - 1, e)
            })?,
            None => return Err(AllocationError::MissingInvoiceData),
        };
        let period = BillingPeriod::preceding(invoice.received_at.date());

        let mut sessions = Vec::new();
        for (i, row) in store.read_all_rows(Table::SessionDates)?.iter().enumerate() {
            for cell in SessionDate::parse_cells(row) {
                match cell {
                    Ok(date) => sessions.push(date),
                    Err(e) => warn!(row = i + 1, error = %e, "Skipping session date cell"),
                }
            }
        }

        let attendance_rows = store.read_all_rows(Table::Attendance)?;
        let attendance = attendance::records_for_period(&attendance_rows, period)
            .map_err(|(i, e)| AllocationError::malformed(Table::Attendance, i, e))?;

        allocate(&attendance, std::slice::from_ref(&invoice), &sessions)
    }

    /// Like [`Self::try_settle`], but every failure becomes the report message.
    pub fn settle(&self, store: &impl TableStore) -> AllocationReport {
        match self.try_settle(store) {
            Ok(allocation) => {
                let message = allocation.status_message(&self.currency);
                info!(
                    period = %allocation.period,
                    invoice = allocation.invoice.amount,
                    people = allocation.people.len(),
                    "Settlement computed"
                );
                AllocationReport {
                    message,
                    allocation: Some(allocation),
                }
            }
            Err(e) => {
                warn!(error = %e, "Settlement failed");
                AllocationReport {
                    message: e.to_string(),
                    allocation: None,
                }
            }
        }
    }
}

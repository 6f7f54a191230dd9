//! Application state management for rollcall.
//!
//! This module contains the core `App` struct that holds the UI state, the
//! loaded record snapshot and the store handle. Every action re-reads the
//! store, so what is shown is always the last full read.

use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use rollcall_core::allocation::{AllocationReport, Allocator};
use rollcall_core::attendance::{self, NetStatus, Submission, MAX_GUESTS};
use rollcall_core::invoice::{self, InvoiceEntry};
use rollcall_core::schedule;
use rollcall_core::stats::{self, Headcount, LeaderboardEntry};
use rollcall_core::{AttendanceRecord, Config, JsonStore, Response, SessionDate};

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for free-text name input
const MAX_NAME_LENGTH: usize = 40;

/// Maximum length for the manual invoice amount input
const MAX_AMOUNT_LENGTH: usize = 16;

/// Number of rows to scroll on page up/down
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Register,
    Admin,
    Accounting,
    Invoices,
    Stats,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Register,
        Tab::Admin,
        Tab::Accounting,
        Tab::Invoices,
        Tab::Stats,
    ];

    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Register => "Register",
            Tab::Admin => "Admin",
            Tab::Accounting => "Accounting",
            Tab::Invoices => "Invoices",
            Tab::Stats => "Stats",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Register => Tab::Admin,
            Tab::Admin => Tab::Accounting,
            Tab::Accounting => Tab::Invoices,
            Tab::Invoices => Tab::Stats,
            Tab::Stats => Tab::Register,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Register => Tab::Stats,
            Tab::Admin => Tab::Register,
            Tab::Accounting => Tab::Admin,
            Tab::Invoices => Tab::Accounting,
            Tab::Stats => Tab::Invoices,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    EnteringInvoice,
    ConfirmingQuit,
    Quitting,
}

/// Focusable fields of the registration form, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterField {
    Name,
    Response,
    Date,
    GuestCount,
    Guest(usize),
    Submit,
}

/// Check if a character can be added to a name field.
pub fn can_add_name_char(current_len: usize, c: char) -> bool {
    current_len < MAX_NAME_LENGTH && !c.is_control()
}

/// Check if a character can be added to the invoice amount input.
pub fn can_add_amount_char(current_len: usize, c: char) -> bool {
    current_len < MAX_AMOUNT_LENGTH && (c.is_ascii_digit() || c == ' ' || c == '.')
}

/// State of the member registration form
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub focus: RegisterField,
    pub name_index: usize,
    /// Typed name, used instead of the roster when the roster is empty
    pub typed_name: Option<String>,
    pub response: Response,
    /// Selectable session dates and the chosen one
    pub dates: Vec<NaiveDate>,
    pub date_index: usize,
    pub guests: Vec<String>,
}

impl RegisterForm {
    /// `free_name` turns the name field into a text input.
    pub fn new(dates: Vec<NaiveDate>, default_date: NaiveDate, free_name: bool) -> Self {
        let date_index = dates.iter().position(|d| *d == default_date).unwrap_or(0);
        Self {
            focus: RegisterField::Name,
            name_index: 0,
            typed_name: free_name.then(String::new),
            response: Response::Yes,
            dates,
            date_index,
            guests: Vec::new(),
        }
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.dates.get(self.date_index).copied()
    }

    /// Text buffer of the focused field, if it takes typed characters
    pub fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            RegisterField::Name => self.typed_name.as_mut(),
            RegisterField::Guest(i) => self.guests.get_mut(i),
            _ => None,
        }
    }

    pub fn focus_is_text(&self) -> bool {
        match self.focus {
            RegisterField::Name => self.typed_name.is_some(),
            RegisterField::Guest(_) => true,
            _ => false,
        }
    }

    /// Type `c` into the focused text field if it fits
    pub fn push_char(&mut self, c: char) {
        if let Some(text) = self.focused_text_mut() {
            if can_add_name_char(text.chars().count(), c) {
                text.push(c);
            }
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(text) = self.focused_text_mut() {
            text.pop();
        }
    }

    /// Fields currently shown. Guest fields only exist for a Yes.
    pub fn fields(&self) -> Vec<RegisterField> {
        let mut fields = vec![RegisterField::Name, RegisterField::Response, RegisterField::Date];
        if self.response == Response::Yes {
            fields.push(RegisterField::GuestCount);
            fields.extend((0..self.guests.len()).map(RegisterField::Guest));
        }
        fields.push(RegisterField::Submit);
        fields
    }

    pub fn focus_next(&mut self) {
        let fields = self.fields();
        let i = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(i + 1) % fields.len()];
    }

    pub fn focus_prev(&mut self) {
        let fields = self.fields();
        let i = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(i + fields.len() - 1) % fields.len()];
    }

    pub fn set_guest_count(&mut self, count: usize) {
        self.guests.resize(count.min(MAX_GUESTS), String::new());
    }

    /// Clear answers after a successful submit, keeping the chosen name
    pub fn reset(&mut self) {
        self.response = Response::Yes;
        self.guests.clear();
        self.focus = RegisterField::Name;
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub store: JsonStore,
    allocator: Allocator,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub register: RegisterForm,

    // Admin tab state
    pub admin_selection: usize,
    pub admin_checked: Vec<bool>,
    pub admin_date_index: usize,

    // Invoice tab state
    pub invoice_selection: usize,
    pub invoice_input: String,

    // Stats tab state
    pub stats_selection: usize,

    // Loaded snapshot
    pub attendance: Vec<AttendanceRecord>,
    pub sessions: Vec<SessionDate>,
    pub invoices: Vec<InvoiceEntry>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub headcounts: Vec<Headcount>,
    pub next_session: NaiveDate,
    pub next_headcount: usize,
    pub report: Option<AllocationReport>,

    // Status message
    pub status_message: Option<String>,
    pub store_age: String,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Result<Self> {
        let data_dir = config.data_dir()?;
        debug!(?data_dir, "Data directory configured");
        let store = JsonStore::new(data_dir)?;
        let allocator = Allocator::new(config.currency.clone());

        let today = Local::now().date_naive();
        let weekday = config.weekday();
        let next_session = schedule::next_session(today, weekday);
        let dates = schedule::session_dates_around(
            today,
            weekday,
            config.past_sessions,
            config.future_sessions,
        );
        let admin_date_index = dates.iter().rposition(|d| *d <= today).unwrap_or(0);
        let register = RegisterForm::new(dates, next_session, config.roster.is_empty());
        let admin_checked = vec![false; config.roster.len()];

        let mut app = Self {
            config,
            store,
            allocator,

            state: AppState::Normal,
            current_tab: Tab::Register,
            register,

            admin_selection: 0,
            admin_checked,
            admin_date_index,

            invoice_selection: 0,
            invoice_input: String::new(),

            stats_selection: 0,

            attendance: Vec::new(),
            sessions: Vec::new(),
            invoices: Vec::new(),
            leaderboard: Vec::new(),
            headcounts: Vec::new(),
            next_session,
            next_headcount: 0,
            report: None,

            status_message: None,
            store_age: "never".to_string(),
        };
        app.reload();
        Ok(app)
    }

    fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    // =========================================================================
    // Snapshot
    // =========================================================================

    /// Re-read every table. Read failures are shown, not propagated.
    pub fn reload(&mut self) {
        use rollcall_core::TableStore;

        match self.store.read_all_rows(rollcall_core::Table::Attendance) {
            Ok(rows) => {
                // Unreadable legacy rows are left out of the snapshot
                self.attendance = rows
                    .iter()
                    .filter_map(|row| AttendanceRecord::from_row(row).ok())
                    .collect();
            }
            Err(e) => {
                warn!(error = %e, "Failed to read attendance");
                self.status_message = Some(e.to_string());
            }
        }

        match schedule::configured_sessions(&self.store) {
            Ok(sessions) => self.sessions = sessions,
            Err(e) => warn!(error = %e, "Failed to read session dates"),
        }

        match invoice::invoice_history(&self.store) {
            Ok(invoices) => self.invoices = invoices,
            Err(e) => warn!(error = %e, "Failed to read invoices"),
        }

        self.leaderboard = stats::leaderboard(&self.attendance);
        self.headcounts = stats::session_headcounts(&self.attendance);
        self.next_headcount = stats::headcount(&self.attendance, self.next_session);
        self.store_age = self.store.last_updated();
        self.clamp_selections();
        debug!(
            attendance = self.attendance.len(),
            sessions = self.sessions.len(),
            invoices = self.invoices.len(),
            "Snapshot reloaded"
        );
    }

    fn clamp_selections(&mut self) {
        let last = |len: usize| len.saturating_sub(1);
        self.invoice_selection = self.invoice_selection.min(last(self.invoices.len()));
        self.stats_selection = self.stats_selection.min(last(self.leaderboard.len()));
        self.admin_selection = self.admin_selection.min(last(self.config.roster.len()));
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Name currently chosen on the form: the typed one when the roster
    /// is empty, otherwise the selected roster entry.
    pub fn register_name(&self) -> Option<&str> {
        match &self.register.typed_name {
            Some(typed) => Some(typed.trim()).filter(|name| !name.is_empty()),
            None => self
                .config
                .roster
                .get(self.register.name_index)
                .map(|s| s.as_str()),
        }
    }

    /// The chosen member's current answer for the chosen date
    pub fn register_status(&self) -> Option<NetStatus> {
        let name = self.register_name()?;
        let date = self.register.selected_date()?;
        Some(attendance::net_status(&self.attendance, name, date))
    }

    /// The chosen member's payable from the last successful settlement
    pub fn register_last_share(&self) -> Option<f64> {
        let name = self.register_name()?;
        let allocation = self.report.as_ref()?.allocation.as_ref()?;
        allocation.share_of(name).map(|share| share.total)
    }

    pub fn cycle_register_name(&mut self, forward: bool) {
        let len = self.config.roster.len();
        if len == 0 {
            return;
        }
        self.register.name_index = if forward {
            (self.register.name_index + 1) % len
        } else {
            (self.register.name_index + len - 1) % len
        };
    }

    pub fn submit_registration(&mut self) {
        let Some(name) = self.register_name().map(|s| s.to_string()) else {
            self.status_message = Some("Type a name first".to_string());
            return;
        };
        let Some(session_date) = self.register.selected_date() else {
            self.status_message = Some("No session date selected".to_string());
            return;
        };

        let submission = Submission {
            name: name.clone(),
            response: self.register.response,
            session_date,
            guests: self.register.guests.clone(),
        };

        match submission.submit(&self.store, &self.config.roster, Self::now()) {
            Ok(rows) => {
                self.status_message = Some(format!(
                    "Thanks, {}! Saved {} for {} ({} row{})",
                    name,
                    submission.response,
                    session_date,
                    rows,
                    if rows == 1 { "" } else { "s" }
                ));
                self.register.reset();
                self.reload();
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                self.status_message = Some(e.to_string());
            }
        }
    }

    // =========================================================================
    // Admin
    // =========================================================================

    pub fn admin_date(&self) -> Option<NaiveDate> {
        self.register.dates.get(self.admin_date_index).copied()
    }

    pub fn toggle_admin_checked(&mut self) {
        if let Some(checked) = self.admin_checked.get_mut(self.admin_selection) {
            *checked = !*checked;
        }
    }

    pub fn admin_selected_names(&self) -> Vec<String> {
        self.config
            .roster
            .iter()
            .zip(&self.admin_checked)
            .filter(|(_, checked)| **checked)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn bulk_register(&mut self) {
        let Some(date) = self.admin_date() else {
            return;
        };
        let names = self.admin_selected_names();

        match attendance::bulk_register(&self.store, &names, date, Self::now()) {
            Ok(count) => {
                self.status_message = Some(format!("Registered {} people for {}", count, date));
                self.admin_checked.iter_mut().for_each(|c| *c = false);
                self.reload();
            }
            Err(e) => {
                warn!(error = %e, "Bulk registration failed");
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Add the admin tab's date to the configured session list
    pub fn add_admin_date_as_session(&mut self) {
        let Some(date) = self.admin_date() else {
            return;
        };
        match schedule::add_session_dates(&self.store, &[date]) {
            Ok(0) => self.status_message = Some(format!("{} is already a session date", date)),
            Ok(_) => {
                self.status_message = Some(format!("Added session date {}", date));
                self.reload();
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    // =========================================================================
    // Accounting
    // =========================================================================

    pub fn settle(&mut self) {
        self.reload();
        let report = self.allocator.settle(&self.store);
        info!(success = report.is_success(), message = %report.message, "Settlement run");
        self.status_message = Some(report.message.clone());
        self.report = Some(report);
    }

    // =========================================================================
    // Invoices
    // =========================================================================

    pub fn start_invoice_entry(&mut self) {
        self.invoice_input.clear();
        self.state = AppState::EnteringInvoice;
    }

    pub fn save_manual_invoice(&mut self) {
        match invoice::add_manual_invoice(&self.store, &self.invoice_input, Self::now()) {
            Ok(record) => {
                self.status_message = Some(format!(
                    "Recorded invoice of {}",
                    rollcall_core::utils::format_money(record.amount, &self.config.currency)
                ));
                self.state = AppState::Normal;
                self.reload();
                self.invoice_selection = self.invoices.len().saturating_sub(1);
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn app_in(dir: &std::path::Path, roster: &[&str]) -> App {
        let config = Config {
            roster: roster.iter().map(|s| s.to_string()).collect(),
            data_dir: Some(dir.to_path_buf()),
            ..Config::default()
        };
        App::new(config).unwrap()
    }

    fn form() -> RegisterForm {
        let dates = vec![ymd(2024, 1, 2), ymd(2024, 1, 9), ymd(2024, 1, 16)];
        RegisterForm::new(dates, ymd(2024, 1, 16), false)
    }

    // -------------------------------------------------------------------------
    // Tab Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_tab_next() {
        assert_eq!(Tab::Register.next(), Tab::Admin);
        assert_eq!(Tab::Admin.next(), Tab::Accounting);
        assert_eq!(Tab::Accounting.next(), Tab::Invoices);
        assert_eq!(Tab::Invoices.next(), Tab::Stats);
        assert_eq!(Tab::Stats.next(), Tab::Register); // Wraps around
    }

    #[test]
    fn test_tab_prev() {
        for tab in Tab::ALL {
            assert_eq!(tab.next().prev(), tab);
        }
    }

    // -------------------------------------------------------------------------
    // Register Form Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_form_defaults_to_next_session() {
        let form = form();
        assert_eq!(form.selected_date(), Some(ymd(2024, 1, 16)));
        assert_eq!(form.response, Response::Yes);
    }

    #[test]
    fn test_guest_fields_only_for_yes() {
        let mut form = form();
        form.set_guest_count(2);
        assert!(form.fields().contains(&RegisterField::Guest(1)));

        form.response = Response::No;
        assert_eq!(
            form.fields(),
            vec![
                RegisterField::Name,
                RegisterField::Response,
                RegisterField::Date,
                RegisterField::Submit
            ]
        );
    }

    #[test]
    fn test_focus_cycles() {
        let mut form = form();
        form.set_guest_count(1);
        form.focus_prev();
        assert_eq!(form.focus, RegisterField::Submit);
        form.focus_prev();
        assert_eq!(form.focus, RegisterField::Guest(0));
        form.focus_next();
        form.focus_next();
        assert_eq!(form.focus, RegisterField::Name);
    }

    #[test]
    fn test_guest_count_is_capped() {
        let mut form = form();
        form.set_guest_count(50);
        assert_eq!(form.guests.len(), MAX_GUESTS);
        form.set_guest_count(0);
        assert!(form.guests.is_empty());
    }

    #[test]
    fn test_name_is_typed_when_roster_is_empty() {
        let mut form = RegisterForm::new(vec![ymd(2024, 1, 2)], ymd(2024, 1, 2), true);
        assert_eq!(form.focus, RegisterField::Name);
        assert!(form.focus_is_text());

        for c in "Zoé".chars() {
            form.push_char(c);
        }
        form.push_char('\t');
        form.pop_char();
        form.push_char('e');
        assert_eq!(form.typed_name.as_deref(), Some("Zoe"));

        form.focus_next();
        assert!(!form.focus_is_text());
        form.push_char('x');
        assert_eq!(form.typed_name.as_deref(), Some("Zoe"));
    }

    #[test]
    fn test_roster_name_field_is_not_text() {
        let mut form = form();
        assert!(!form.focus_is_text());
        form.push_char('a');
        assert_eq!(form.typed_name, None);

        form.set_guest_count(1);
        form.focus = RegisterField::Guest(0);
        assert!(form.focus_is_text());
        form.push_char('K');
        assert_eq!(form.guests, vec!["K"]);
    }

    #[test]
    fn test_typed_name_is_capped() {
        let mut form = RegisterForm::new(vec![ymd(2024, 1, 2)], ymd(2024, 1, 2), true);
        for _ in 0..MAX_NAME_LENGTH + 5 {
            form.push_char('a');
        }
        assert_eq!(form.typed_name.map(|n| n.len()), Some(MAX_NAME_LENGTH));
    }

    #[test]
    fn test_typed_name_registers_with_empty_roster() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), &[]);
        assert_eq!(app.register_name(), None);
        assert_eq!(app.register_status(), None);

        for c in " Zoe ".chars() {
            app.register.push_char(c);
        }
        assert_eq!(app.register_name(), Some("Zoe"));
        assert_eq!(app.register_status(), Some(NetStatus::Unknown));

        app.submit_registration();
        assert_eq!(app.attendance.len(), 1);
        assert_eq!(app.attendance[0].person_name, "Zoe");
        assert_eq!(app.register_status(), Some(NetStatus::Attending));
        // The typed name survives the form reset
        assert_eq!(app.register_name(), Some("Zoe"));
    }

    #[test]
    fn test_roster_name_is_not_typed() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), &["Alice", "Bob"]);
        assert_eq!(app.register_name(), Some("Alice"));
        app.cycle_register_name(false);
        assert_eq!(app.register_name(), Some("Bob"));
        assert!(app.register.typed_name.is_none());
    }

    #[test]
    fn test_last_share_comes_from_settlement() {
        use rollcall_core::{Table, TableStore};

        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), &["Alice", "Bob"]);
        assert_eq!(app.register_last_share(), None);

        let row = |cells: &[&str]| cells.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        app.store
            .append_rows(Table::SessionDates, &[row(&["2024-01-02"])])
            .unwrap();
        app.store
            .append_rows(
                Table::Attendance,
                &[row(&["Alice", "Yes", "2024-01-01 10:00:00", "2024-01-02"])],
            )
            .unwrap();
        app.store
            .append_rows(Table::Invoices, &[row(&["2024-02-03", "9000"])])
            .unwrap();

        app.settle();
        assert_eq!(app.register_last_share(), Some(9000.0));
        app.cycle_register_name(true);
        assert_eq!(app.register_last_share(), None);
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_name_char() {
        assert!(can_add_name_char(0, 'á'));
        assert!(can_add_name_char(39, 'z'));
        assert!(!can_add_name_char(40, 'a'));
        assert!(!can_add_name_char(0, '\n'));
    }

    #[test]
    fn test_can_add_amount_char() {
        assert!(can_add_amount_char(0, '3'));
        assert!(can_add_amount_char(2, ' '));
        assert!(!can_add_amount_char(0, 'x'));
        assert!(!can_add_amount_char(16, '1'));
    }
}

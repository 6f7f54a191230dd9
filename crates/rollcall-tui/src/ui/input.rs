//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{can_add_amount_char, App, AppState, RegisterField, Tab, PAGE_SCROLL_SIZE};

/// Move a list selection by `delta`, clamped to `0..len`.
fn move_selection(selection: &mut usize, len: usize, delta: isize) {
    if len == 0 {
        *selection = 0;
        return;
    }
    let max = len as isize - 1;
    *selection = (*selection as isize + delta).clamp(0, max) as usize;
}

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    if matches!(app.state, AppState::EnteringInvoice) {
        handle_invoice_entry(app, key);
        return Ok(false);
    }

    // A focused text field takes every printable key
    if app.current_tab == Tab::Register && app.register.focus_is_text() {
        handle_register_text_input(app, key);
        return Ok(false);
    }

    // Global keys
    match key.code {
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char(c @ '1'..='5') => {
            let index = c as usize - '1' as usize;
            app.current_tab = Tab::ALL[index];
            app.status_message = None;
            return Ok(false);
        }
        KeyCode::Char('u') => {
            app.reload();
            app.status_message = Some("Reloaded".to_string());
            return Ok(false);
        }
        _ => {}
    }

    let handled = match app.current_tab {
        Tab::Register => handle_register_input(app, key),
        Tab::Admin => handle_admin_input(app, key),
        Tab::Accounting => handle_accounting_input(app, key),
        Tab::Invoices => handle_invoices_input(app, key),
        Tab::Stats => handle_stats_input(app, key),
    };

    if !handled {
        match key.code {
            KeyCode::Left => app.current_tab = app.current_tab.prev(),
            KeyCode::Right => app.current_tab = app.current_tab.next(),
            _ => {}
        }
    }

    Ok(false)
}

// ============================================================================
// Overlays
// ============================================================================

fn handle_invoice_entry(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.invoice_input.clear();
            app.state = AppState::Normal;
        }
        KeyCode::Enter => app.save_manual_invoice(),
        KeyCode::Backspace => {
            app.invoice_input.pop();
        }
        KeyCode::Char(c) if can_add_amount_char(app.invoice_input.len(), c) => {
            app.invoice_input.push(c);
        }
        _ => {}
    }
}

// ============================================================================
// Register Tab
// ============================================================================

/// Typed name or guest name fields
fn handle_register_text_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.register.focus = RegisterField::Submit,
        KeyCode::Tab | KeyCode::Down => app.register.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.register.focus_prev(),
        KeyCode::Enter => app.submit_registration(),
        KeyCode::Backspace => app.register.pop_char(),
        KeyCode::Char(c) => app.register.push_char(c),
        _ => {}
    }
}

/// Returns true when the key was consumed.
fn handle_register_input(app: &mut App, key: KeyEvent) -> bool {
    let forward = match key.code {
        KeyCode::Tab | KeyCode::Down => {
            app.register.focus_next();
            return true;
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.register.focus_prev();
            return true;
        }
        KeyCode::Enter => {
            app.submit_registration();
            return true;
        }
        KeyCode::Char(' ') if app.register.focus == RegisterField::Response => {
            app.register.response = app.register.response.toggled();
            return true;
        }
        KeyCode::Right => true,
        KeyCode::Left => false,
        _ => return false,
    };

    if app.register.focus == RegisterField::Name {
        app.cycle_register_name(forward);
        return true;
    }

    let form = &mut app.register;
    match form.focus {
        RegisterField::Response => form.response = form.response.toggled(),
        RegisterField::Date => {
            let delta = if forward { 1 } else { -1 };
            move_selection(&mut form.date_index, form.dates.len(), delta);
        }
        RegisterField::GuestCount => {
            let count = if forward {
                form.guests.len() + 1
            } else {
                form.guests.len().saturating_sub(1)
            };
            form.set_guest_count(count);
        }
        // Arrow keys on the button fall through to tab switching
        RegisterField::Name | RegisterField::Guest(_) | RegisterField::Submit => return false,
    }
    true
}

// ============================================================================
// Admin Tab
// ============================================================================

fn handle_admin_input(app: &mut App, key: KeyEvent) -> bool {
    let roster_len = app.config.roster.len();
    match key.code {
        KeyCode::Up => move_selection(&mut app.admin_selection, roster_len, -1),
        KeyCode::Down => move_selection(&mut app.admin_selection, roster_len, 1),
        KeyCode::PageUp => {
            move_selection(&mut app.admin_selection, roster_len, -(PAGE_SCROLL_SIZE as isize))
        }
        KeyCode::PageDown => {
            move_selection(&mut app.admin_selection, roster_len, PAGE_SCROLL_SIZE as isize)
        }
        KeyCode::Left => move_selection(&mut app.admin_date_index, app.register.dates.len(), -1),
        KeyCode::Right => move_selection(&mut app.admin_date_index, app.register.dates.len(), 1),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_admin_checked(),
        KeyCode::Char('r') => app.bulk_register(),
        KeyCode::Char('a') => app.add_admin_date_as_session(),
        _ => return false,
    }
    true
}

// ============================================================================
// Accounting, Invoices and Stats Tabs
// ============================================================================

fn handle_accounting_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('s') => {
            app.settle();
            true
        }
        _ => false,
    }
}

fn handle_invoices_input(app: &mut App, key: KeyEvent) -> bool {
    let len = app.invoices.len();
    match key.code {
        KeyCode::Up => move_selection(&mut app.invoice_selection, len, -1),
        KeyCode::Down => move_selection(&mut app.invoice_selection, len, 1),
        KeyCode::Home => app.invoice_selection = 0,
        KeyCode::End => app.invoice_selection = len.saturating_sub(1),
        KeyCode::Char('m') => app.start_invoice_entry(),
        _ => return false,
    }
    true
}

fn handle_stats_input(app: &mut App, key: KeyEvent) -> bool {
    let len = app.leaderboard.len();
    match key.code {
        KeyCode::Up => move_selection(&mut app.stats_selection, len, -1),
        KeyCode::Down => move_selection(&mut app.stats_selection, len, 1),
        KeyCode::PageUp => {
            move_selection(&mut app.stats_selection, len, -(PAGE_SCROLL_SIZE as isize))
        }
        KeyCode::PageDown => {
            move_selection(&mut app.stats_selection, len, PAGE_SCROLL_SIZE as isize)
        }
        _ => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_selection_clamps() {
        let mut sel = 0;
        move_selection(&mut sel, 5, -1);
        assert_eq!(sel, 0);
        move_selection(&mut sel, 5, 3);
        assert_eq!(sel, 3);
        move_selection(&mut sel, 5, PAGE_SCROLL_SIZE as isize);
        assert_eq!(sel, 4);
    }

    #[test]
    fn test_move_selection_empty_list() {
        let mut sel = 7;
        move_selection(&mut sel, 0, 1);
        assert_eq!(sel, 0);
    }
}

//! rollcall - club attendance and cost splitting in the terminal.
//!
//! Members register for the weekly session, an admin records the monthly
//! court invoice, and settlement splits that invoice over the sessions and
//! the people who attended them.

mod app;
mod ui;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rollcall_core::models::parse::parse_date;
use rollcall_core::utils::{format_amount, format_money};
use rollcall_core::{invoice, schedule, Allocator, Config, JsonStore};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Prefix of the daily log file written while the TUI owns the terminal
const LOG_FILE_PREFIX: &str = "rollcall.log";

/// Initialize the tracing subscriber for logging.
///
/// With a log directory, output goes to a daily file there so it cannot
/// scribble over the TUI. Otherwise it goes to stderr.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load()?;

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1].starts_with("--") {
        init_tracing(None);
        return run_command(&config, &args[1], &args[2..]);
    }

    let data_dir = config.data_dir()?;
    let _guard = init_tracing(Some(&data_dir));
    info!(club = %config.club_name, "rollcall starting");

    // Create app before touching the terminal so setup errors print normally
    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("rollcall shutting down");
    Ok(())
}

// ============================================================================
// CLI Commands
// ============================================================================

fn run_command(config: &Config, command: &str, rest: &[String]) -> Result<()> {
    let store = JsonStore::new(config.data_dir()?)?;
    let now = Local::now().naive_local();

    match command {
        "--settle" => settle(config, &store, rest.iter().any(|a| a == "--json")),
        "--import-invoice" => {
            let path = rest
                .first()
                .ok_or_else(|| anyhow::anyhow!("Usage: rollcall --import-invoice <file>"))?;
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read invoice file: {}", path))?;
            let record = invoice::import_invoice_text(&store, &text, now)?;
            println!("Imported invoice of {}", format_money(record.amount, &config.currency));
            Ok(())
        }
        "--add-invoice" => {
            let amount = rest
                .first()
                .ok_or_else(|| anyhow::anyhow!("Usage: rollcall --add-invoice <amount>"))?;
            let record = invoice::add_manual_invoice(&store, amount, now)?;
            println!("Recorded invoice of {}", format_money(record.amount, &config.currency));
            Ok(())
        }
        "--add-session" => {
            if rest.is_empty() {
                anyhow::bail!("Usage: rollcall --add-session <YYYY-MM-DD>...");
            }
            let dates = rest
                .iter()
                .map(|s| parse_date(s).ok_or_else(|| anyhow::anyhow!("Invalid date: {}", s)))
                .collect::<Result<Vec<NaiveDate>>>()?;
            let added = schedule::add_session_dates(&store, &dates)?;
            println!("Added {} session date(s)", added);
            Ok(())
        }
        "--init-config" => {
            let (path, written) = Config::init_default()?;
            if written {
                println!("Wrote default config to {}", path.display());
            } else {
                println!("Config already exists at {}", path.display());
            }
            Ok(())
        }
        "--help" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown option: {}", other)
        }
    }
}

fn print_usage() {
    eprintln!("Usage: rollcall [OPTION]");
    eprintln!();
    eprintln!("Without an option the terminal interface starts.");
    eprintln!();
    eprintln!("  --settle [--json]          Split the latest invoice and print the shares");
    eprintln!("  --import-invoice <file>    Extract the total from an invoice text file");
    eprintln!("  --add-invoice <amount>     Record an invoice amount by hand");
    eprintln!("  --add-session <date>...    Add session dates (YYYY-MM-DD)");
    eprintln!("  --init-config              Write a default config file to fill in the roster");
}

/// Print the settlement of the latest invoice to stdout
fn settle(config: &Config, store: &JsonStore, json: bool) -> Result<()> {
    let report = Allocator::new(config.currency.clone()).settle(store);
    let Some(allocation) = report.allocation else {
        anyhow::bail!(report.message);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&allocation)?);
        return Ok(());
    }

    println!("{}", report.message);
    println!();
    println!(
        "{} sessions, {} per session",
        allocation.days.len(),
        format_money(allocation.per_session_cost, &config.currency)
    );
    println!();
    println!("{:<30} {:>8} {:>14}", "Name", "Sessions", "Payable");
    for person in &allocation.people {
        println!(
            "{:<30} {:>8} {:>14}",
            person.name,
            person.sessions,
            format_amount(person.total)
        );
    }
    Ok(())
}

// ============================================================================
// Event Loop
// ============================================================================

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

/// How many recent sessions the headcount view shows
const RECENT_SESSIONS: usize = 12;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_leaderboard(frame, app, chunks[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(chunks[1]);

    render_next_session(frame, app, right[0]);
    render_headcounts(frame, app, right[1]);
}

fn render_leaderboard(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([Cell::from("#"), Cell::from("Name"), Cell::from("Sessions")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = app
        .leaderboard
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            Row::new(vec![
                Cell::from((i + 1).to_string()),
                Cell::from(entry.name.as_str()),
                Cell::from(entry.sessions.to_string()),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [Constraint::Length(4), Constraint::Fill(1), Constraint::Length(9)];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(" Leaderboard ")
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !app.leaderboard.is_empty() {
        state.select(Some(app.stats_selection));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_next_session(frame: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" Next session ", styles::muted_style()),
        Span::styled(
            app.next_session.format("%a %Y-%m-%d").to_string(),
            styles::highlight_style(),
        ),
        Span::styled(": ", styles::muted_style()),
        Span::styled(format!("{} coming", app.next_headcount), styles::success_style()),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_headcounts(frame: &mut Frame, app: &App, area: Rect) {
    let skip = app.headcounts.len().saturating_sub(RECENT_SESSIONS);
    let recent = &app.headcounts[skip..];
    let peak = recent.iter().map(|h| h.attendees).max().unwrap_or(0).max(1);
    // Room for the bar after date, count and guest columns and borders
    let bar_room = (area.width as usize).saturating_sub(30).max(1);

    let rows: Vec<Row> = recent
        .iter()
        .rev()
        .map(|h| {
            let style = if h.date == app.next_session {
                styles::highlight_style()
            } else {
                styles::list_item_style()
            };
            let bar = "■".repeat(h.attendees * bar_room / peak);
            let guests = match h.guests {
                0 => String::new(),
                n => format!("+{}g", n),
            };
            Row::new(vec![
                Cell::from(h.date.format("%Y-%m-%d").to_string()),
                Cell::from(h.attendees.to_string()),
                Cell::from(guests).style(styles::muted_style()),
                Cell::from(bar).style(styles::title_style()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(5),
        Constraint::Length(6),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths).block(
        Block::default()
            .title(" Headcount per session ")
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );
    frame.render_widget(table, area);
}

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use rollcall_core::attendance::{net_status, NetStatus};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_roster(frame, app, chunks[0]);
    render_sessions(frame, app, chunks[1]);
}

fn render_roster(frame: &mut Frame, app: &App, area: Rect) {
    let date = app.admin_date();

    let header = Row::new([Cell::from(""), Cell::from("Name"), Cell::from("Status")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = app
        .config
        .roster
        .iter()
        .zip(&app.admin_checked)
        .enumerate()
        .map(|(i, (name, checked))| {
            let style = if i == app.admin_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let status = date.map(|d| net_status(&app.attendance, name, d));
            let status_cell = match status {
                Some(NetStatus::Attending) => Cell::from("coming").style(styles::success_style()),
                Some(NetStatus::NotAttending) => {
                    Cell::from("not coming").style(styles::error_style())
                }
                _ => Cell::from("-").style(styles::muted_style()),
            };
            Row::new(vec![
                Cell::from(if *checked { "[x]" } else { "[ ]" }),
                Cell::from(name.as_str()),
                status_cell,
            ])
            .style(style)
        })
        .collect();

    let widths = [Constraint::Length(4), Constraint::Fill(1), Constraint::Length(12)];

    let date_label = date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
    let title = format!(
        " Bulk register for ◀ {} ▶ ({} selected) ",
        date_label,
        app.admin_checked.iter().filter(|c| **c).count()
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.admin_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_sessions(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    if app.sessions.is_empty() {
        lines.push(Line::from(Span::styled(
            " No session dates configured",
            styles::muted_style(),
        )));
    }
    let admin_date = app.admin_date();
    for session in app.sessions.iter().rev() {
        let style = if Some(session.date()) == admin_date {
            styles::highlight_style()
        } else {
            styles::list_item_style()
        };
        lines.push(Line::from(Span::styled(format!(" {}", session), style)));
    }

    let title = format!(" Session dates ({}) ", app.sessions.len());
    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

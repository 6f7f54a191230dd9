use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use rollcall_core::utils::{format_amount, format_money, truncate_string};
use rollcall_core::MonthlyAllocation;

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(5)])
        .split(area);

    render_summary(frame, app, chunks[0]);

    match app.report.as_ref().and_then(|r| r.allocation.as_ref()) {
        Some(allocation) => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[1]);
            render_people(frame, app, allocation, columns[0]);
            render_days(frame, allocation, columns[1]);
        }
        None => {
            let hint = Paragraph::new(Line::from(Span::styled(
                " Press [s] to split the latest invoice among attendees",
                styles::muted_style(),
            )))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(styles::border_style(false)),
            );
            frame.render_widget(hint, chunks[1]);
        }
    }
}

fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();
    match app.report {
        Some(ref report) => {
            let style = if report.is_success() {
                styles::success_style()
            } else {
                styles::error_style()
            };
            lines.push(Line::from(Span::styled(format!(" {}", report.message), style)));
            if let Some(ref allocation) = report.allocation {
                let uncharged = allocation.invoice.amount - allocation.charged_total();
                let mut detail = vec![
                    Span::styled(" Per session: ", styles::muted_style()),
                    Span::raw(format_money(allocation.per_session_cost, &app.config.currency)),
                    Span::styled("   Sessions: ", styles::muted_style()),
                    Span::raw(allocation.days.len().to_string()),
                ];
                if uncharged > 0.005 {
                    detail.push(Span::styled("   Uncharged: ", styles::muted_style()));
                    detail.push(Span::styled(
                        format_money(uncharged, &app.config.currency),
                        styles::highlight_style(),
                    ));
                }
                lines.push(Line::from(detail));
            }
        }
        None => lines.push(Line::from(Span::styled(
            " Not settled yet",
            styles::muted_style(),
        ))),
    }

    let block = Block::default()
        .title(" Settlement ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_people(frame: &mut Frame, app: &App, allocation: &MonthlyAllocation, area: Rect) {
    let header = Row::new([Cell::from("Name"), Cell::from("Sessions"), Cell::from("Payable")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = allocation
        .people
        .iter()
        .map(|person| {
            Row::new(vec![
                Cell::from(truncate_string(&person.name, 28)),
                Cell::from(person.sessions.to_string()),
                Cell::from(format_money(person.total, &app.config.currency)),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [Constraint::Fill(1), Constraint::Length(9), Constraint::Length(14)];
    let title = format!(" Payable ({} people) ", allocation.people.len());

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );
    frame.render_widget(table, area);
}

fn render_days(frame: &mut Frame, allocation: &MonthlyAllocation, area: Rect) {
    let header = Row::new([
        Cell::from("Date"),
        Cell::from("Cost"),
        Cell::from("People"),
        Cell::from("Each"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = allocation
        .days
        .iter()
        .map(|day| {
            let style = if day.attendee_count() == 0 {
                styles::muted_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                Cell::from(day.date.format("%Y-%m-%d").to_string()),
                Cell::from(format_amount(day.session_cost)),
                Cell::from(day.attendee_count().to_string()),
                Cell::from(format_amount(day.per_person)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(7),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!(" {} by session ", allocation.period))
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );
    frame.render_widget(table, area);
}

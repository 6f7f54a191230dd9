use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use rollcall_core::invoice::InvoiceEntry;
use rollcall_core::models::parse::TIMESTAMP_FORMAT;
use rollcall_core::utils::format_money;

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([
        Cell::from("#"),
        Cell::from("Received"),
        Cell::from("Amount"),
        Cell::from("Source"),
    ])
    .style(styles::title_style())
    .height(1);

    let last = app.invoices.len().saturating_sub(1);
    let rows: Vec<Row> = app
        .invoices
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let style = if i == last {
                styles::highlight_style()
            } else {
                styles::list_item_style()
            };
            match entry {
                InvoiceEntry::Parsed(record) => Row::new(vec![
                    Cell::from((i + 1).to_string()),
                    Cell::from(record.received_at.format(TIMESTAMP_FORMAT).to_string()),
                    Cell::from(format_money(record.amount, &app.config.currency)),
                    Cell::from(record.source.clone()),
                ])
                .style(style),
                InvoiceEntry::Unreadable(row) => Row::new(vec![
                    Cell::from((i + 1).to_string()),
                    Cell::from(row.join(" | ")),
                    Cell::from("unreadable"),
                    Cell::from(""),
                ])
                .style(styles::error_style()),
            }
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Length(21),
        Constraint::Length(16),
        Constraint::Fill(1),
    ];

    let title = format!(
        " Invoices ({}) - the last one is settled ",
        app.invoices.len()
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
    if !app.invoices.is_empty() {
        state.select(Some(app.invoice_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

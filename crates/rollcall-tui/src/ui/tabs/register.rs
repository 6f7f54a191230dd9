use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use rollcall_core::attendance::{net_attendees, NetStatus, MAX_GUESTS};
use rollcall_core::utils::format_money;
use rollcall_core::Response;

use crate::app::{App, RegisterField};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_form(frame, app, chunks[0]);
    render_attendees(frame, app, chunks[1]);
}

/// One `label: < value >` line, highlighted when focused
fn field_line<'a>(label: &'a str, value: Span<'a>, focused: bool) -> Line<'a> {
    let marker = if focused { "▶ " } else { "  " };
    let (open, close) = if focused { ("◀ ", " ▶") } else { ("  ", "  ") };
    let label_style = if focused {
        styles::selected_style()
    } else {
        styles::muted_style()
    };
    Line::from(vec![
        Span::styled(marker, styles::highlight_style()),
        Span::styled(format!("{:<10}", label), label_style),
        Span::styled(open, styles::muted_style()),
        value,
        Span::styled(close, styles::muted_style()),
    ])
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.register;
    let mut lines = vec![Line::from("")];

    let name_focused = form.focus == RegisterField::Name;
    match &form.typed_name {
        Some(typed) => {
            let cursor = if name_focused { "▌" } else { "" };
            let marker = if name_focused { "▶ " } else { "  " };
            let label_style = if name_focused {
                styles::selected_style()
            } else {
                styles::muted_style()
            };
            lines.push(Line::from(vec![
                Span::styled(marker, styles::highlight_style()),
                Span::styled(format!("{:<10}", "Name"), label_style),
                Span::styled("[", styles::muted_style()),
                Span::styled(format!("{}{}", typed, cursor), styles::input_style()),
                Span::styled("]", styles::muted_style()),
            ]));
        }
        None => {
            let name = match app.register_name() {
                Some(name) => Span::styled(name.to_string(), styles::list_item_style()),
                None => Span::styled("-", styles::muted_style()),
            };
            lines.push(field_line("Name", name, name_focused));
        }
    }

    let response = Span::styled(
        form.response.to_string(),
        styles::response_style(form.response == Response::Yes),
    );
    lines.push(field_line("Coming?", response, form.focus == RegisterField::Response));

    let date = match form.selected_date() {
        Some(date) if date == app.next_session => format!("{} (next session)", date),
        Some(date) => date.to_string(),
        None => "-".to_string(),
    };
    lines.push(field_line(
        "Date",
        Span::styled(date, styles::list_item_style()),
        form.focus == RegisterField::Date,
    ));

    if form.response == Response::Yes {
        lines.push(field_line(
            "Guests",
            Span::styled(
                format!("{} / {}", form.guests.len(), MAX_GUESTS),
                styles::list_item_style(),
            ),
            form.focus == RegisterField::GuestCount,
        ));

        for (i, guest) in form.guests.iter().enumerate() {
            let focused = form.focus == RegisterField::Guest(i);
            let cursor = if focused { "▌" } else { "" };
            let marker = if focused { "▶ " } else { "  " };
            lines.push(Line::from(vec![
                Span::styled(marker, styles::highlight_style()),
                Span::styled(format!("  Guest {:<2} [", i + 1), styles::muted_style()),
                Span::styled(format!("{}{}", guest, cursor), styles::input_style()),
                Span::styled("]", styles::muted_style()),
            ]));
        }
    }

    lines.push(Line::from(""));
    let button = if form.focus == RegisterField::Submit {
        Span::styled(" ▶ Submit ◀ ", styles::selected_style())
    } else {
        Span::styled("   Submit   ", styles::list_item_style())
    };
    lines.push(Line::from(vec![Span::raw("            ["), button, Span::raw("]")]));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Next session ", styles::muted_style()),
        Span::styled(app.next_session.to_string(), styles::highlight_style()),
        Span::styled(format!(": {} coming", app.next_headcount), styles::muted_style()),
    ]));

    let status = match app.register_status() {
        Some(NetStatus::Attending) => Span::styled("coming", styles::success_style()),
        Some(NetStatus::NotAttending) => Span::styled("not coming", styles::error_style()),
        _ => Span::styled("no answer yet", styles::muted_style()),
    };
    lines.push(Line::from(vec![
        Span::styled("  Current answer ", styles::muted_style()),
        status,
    ]));
    if let Some(total) = app.register_last_share() {
        lines.push(Line::from(vec![
            Span::styled("  Last settlement ", styles::muted_style()),
            Span::styled(format_money(total, &app.config.currency), styles::highlight_style()),
        ]));
    }

    let title = format!(" Register for {} ", app.config.club_name);
    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_attendees(frame: &mut Frame, app: &App, area: Rect) {
    let Some(date) = app.register.selected_date() else {
        frame.render_widget(Block::default().borders(Borders::ALL), area);
        return;
    };

    let attendees = net_attendees(&app.attendance, date);
    let items: Vec<ListItem> = if attendees.is_empty() {
        vec![ListItem::new(Span::styled("Nobody yet", styles::muted_style()))]
    } else {
        attendees
            .iter()
            .map(|name| ListItem::new(Span::styled(name.clone(), styles::list_item_style())))
            .collect()
    };

    let title = format!(" Coming on {} ({}) ", date, attendees.len());
    let list = List::new(items).block(
        Block::default()
            .title(title)
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );
    frame.render_widget(list, area);
}

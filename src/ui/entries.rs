//! Submitted entries table

use super::widgets::render_scrollable_table;
use crate::app::App;
use crate::state::{Entry, Focus};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Row, Table},
    Frame,
};

/// Field names across all entries, in the order they were first seen
pub fn entry_columns(entries: &[Entry]) -> Vec<&str> {
    let mut columns: Vec<&str> = Vec::new();
    for name in entries.iter().flat_map(|e| e.values.keys()) {
        if !columns.contains(&name.as_str()) {
            columns.push(name);
        }
    }
    columns
}

fn entry_row<'a>(entry: &Entry, columns: &[&str]) -> Row<'a> {
    let mut cells = Vec::with_capacity(columns.len() + 2);
    cells.push(entry.form_type.label().to_string());
    cells.extend(columns.iter().map(|name| {
        entry
            .value(name)
            .map(ToString::to_string)
            .unwrap_or_default()
    }));
    cells.push(
        entry
            .submitted_at()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
    );
    Row::new(cells)
}

/// Draw the entries table; nothing is drawn when there are no entries
pub fn draw_entries(frame: &mut Frame, area: Rect, app: &App) {
    let entries = app.session.entries();
    if entries.is_empty() {
        return;
    }

    let is_focused = app.state.focus == Focus::Entries;
    let border_color = if is_focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let columns = entry_columns(entries);
    let header_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let header = Row::new(
        std::iter::once("Type")
            .chain(columns.iter().copied())
            .chain(std::iter::once("Submitted")),
    )
    .style(header_style);

    let rows: Vec<Row> = entries.iter().map(|e| entry_row(e, &columns)).collect();

    let mut widths = Vec::with_capacity(columns.len() + 2);
    widths.push(Constraint::Length(20));
    widths.extend(columns.iter().map(|_| Constraint::Min(8)));
    widths.push(Constraint::Length(19));

    let highlight_style = if is_focused {
        Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(" Entries ({}) ", entries.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        )
        .row_highlight_style(highlight_style)
        .highlight_symbol("▶ ");

    let selected = is_focused.then_some(app.state.selected_entry);
    render_scrollable_table(frame, area, table, selected);
}

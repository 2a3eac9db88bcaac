//! Field rendering utilities for forms

use crate::state::{FieldSpec, FieldValue};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Rows taken by one field: bordered input plus its error line
pub const FIELD_HEIGHT: u16 = 4;

/// Text shown inside the input box
fn display_value(field: &FieldSpec, value: Option<&FieldValue>) -> Option<String> {
    let text = value.map(ToString::to_string).unwrap_or_default();
    if text.is_empty() {
        return None;
    }
    if field.kind.is_masked() {
        return Some("•".repeat(text.chars().count()));
    }
    Some(text)
}

/// Draw a configured field with its current answer and validation error
pub fn draw_field(
    frame: &mut Frame,
    area: Rect,
    field: &FieldSpec,
    value: Option<&FieldValue>,
    error: Option<&str>,
    is_active: bool,
) {
    let accent = if error.is_some() { Color::Red } else { Color::Cyan };
    let border_style = if is_active {
        Style::default().fg(accent)
    } else if error.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let cursor = if is_active && !field.kind.is_dropdown() {
        "▌"
    } else {
        ""
    };

    let mut spans = Vec::new();
    if field.kind.is_dropdown() && is_active {
        spans.push(Span::styled("◀ ", Style::default().fg(Color::Cyan)));
    }
    match display_value(field, value) {
        Some(text) => spans.push(Span::raw(text)),
        None => spans.push(Span::styled(
            field.placeholder(),
            Style::default().fg(Color::DarkGray),
        )),
    }
    spans.push(Span::styled(cursor, Style::default().fg(Color::Cyan)));
    if field.kind.is_dropdown() && is_active {
        spans.push(Span::styled(" ▶", Style::default().fg(Color::Cyan)));
    }

    let mut title = vec![Span::raw(format!(" {}", field.label))];
    if field.required {
        title.push(Span::styled(" *", Style::default().fg(Color::Red)));
    }
    title.push(Span::raw(" "));

    let block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_style(border_style);

    let input_area = Rect {
        height: area.height.min(3),
        ..area
    };
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), input_area);

    if let Some(message) = error {
        if area.height > input_area.height {
            let error_area = Rect {
                y: input_area.y + input_area.height,
                height: 1,
                ..area
            };
            let line = Span::styled(
                format!(" {message}"),
                Style::default().fg(Color::Red).add_modifier(Modifier::ITALIC),
            );
            frame.render_widget(Paragraph::new(line), error_area);
        }
    }
}

//! Form rendered from the active field configuration

use super::field_renderer::{draw_field, FIELD_HEIGHT};
use crate::app::App;
use crate::state::{Focus, LoadState};
use crate::ui::components::{render_button, BUTTON_HEIGHT};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// First field to draw so that `focused` stays inside a window of `visible` fields
fn scroll_offset(focused: Option<usize>, visible: usize) -> usize {
    match focused {
        Some(i) if visible > 0 => i.saturating_sub(visible - 1),
        _ => 0,
    }
}

/// Draw the form panel: fields followed by the submit button
pub fn draw_form(frame: &mut Frame, area: Rect, app: &App) {
    let session = &app.session;
    let title = match session.editing() {
        Some(_) => format!(" {} (editing) ", session.form_type().label()),
        None => format!(" {} ", session.form_type().label()),
    };
    let form_focused = matches!(app.state.focus, Focus::Field(_) | Focus::Submit);
    let border_color = if form_focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if session.is_loading() {
        draw_placeholder(frame, inner, "Loading form...", Color::Yellow);
        return;
    }

    let Some(config) = session.config() else {
        let message = match session.load_state() {
            LoadState::LoadFailed(_) => "Form configuration unavailable. Pick a form to retry.",
            _ => "No form loaded",
        };
        draw_placeholder(frame, inner, message, Color::DarkGray);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),                // Fields
            Constraint::Length(BUTTON_HEIGHT), // Submit
        ])
        .split(inner);
    let fields_area = chunks[0];

    let focused = match app.state.focus {
        Focus::Field(i) => Some(i),
        _ => None,
    };
    let visible = usize::from(fields_area.height / FIELD_HEIGHT);
    let offset = scroll_offset(focused, visible);
    let answers = session.answers();

    for (slot, (index, field)) in config
        .fields
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .enumerate()
    {
        let field_area = Rect {
            y: fields_area.y + slot as u16 * FIELD_HEIGHT,
            height: FIELD_HEIGHT,
            ..fields_area
        };
        draw_field(
            frame,
            field_area,
            field,
            answers.get(&field.name),
            session.errors().get(&field.name).map(String::as_str),
            focused == Some(index),
        );
    }

    let button_area = Rect {
        width: chunks[1].width.min(24),
        ..chunks[1]
    };
    let label = if session.editing().is_some() {
        "Update Entry"
    } else {
        "Submit"
    };
    render_button(
        frame,
        button_area,
        label,
        app.state.focus == Focus::Submit,
        true,
        Color::Green,
    );
}

fn draw_placeholder(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    let y_offset = area.height / 2;
    let line_area = Rect {
        y: area.y + y_offset,
        height: area.height.saturating_sub(y_offset).min(1),
        ..area
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(
        message,
        Style::default().fg(color),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(paragraph, line_area);
}

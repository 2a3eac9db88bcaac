//! Layout components (header, progress, status bar)

use crate::app::App;
use crate::platform::SUBMIT_SHORTCUT;
use crate::state::{Focus, FormType, LoadState};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

const TITLE: &str = "Dynamic Form Builder";

/// Screen regions from top to bottom
pub struct ScreenAreas {
    pub header: Rect,
    pub progress: Rect,
    pub body: Rect,
    pub status: Rect,
}

/// Create the main layout
pub fn create_layout(area: Rect) -> ScreenAreas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with form selector
            Constraint::Length(3), // Progress gauge
            Constraint::Min(0),    // Form and entries
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    ScreenAreas {
        header: chunks[0],
        progress: chunks[1],
        body: chunks[2],
        status: chunks[3],
    }
}

/// Split the body into form (left) and entries (right) when there are entries
pub fn split_body(area: Rect, has_entries: bool) -> (Rect, Option<Rect>) {
    if !has_entries {
        return (area, None);
    }
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);
    (chunks[0], Some(chunks[1]))
}

/// Draw the title and form-type selector
pub fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.state.focus == Focus::FormTypeSelector;
    let selected = app.session.selected_form_type();

    let mut spans = vec![Span::styled(
        if is_focused { "◀ " } else { "  " },
        Style::default().fg(Color::Cyan),
    )];
    for (idx, form_type) in FormType::ALL.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
        }
        let style = if form_type == selected && is_focused {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else if form_type == selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", form_type.label()), style));
    }
    spans.push(Span::styled(
        if is_focused { " ▶" } else { "  " },
        Style::default().fg(Color::Cyan),
    ));
    match app.session.load_state() {
        LoadState::Loading(_) => {
            spans.push(Span::styled("  loading…", Style::default().fg(Color::Yellow)));
        }
        LoadState::LoadFailed(failed) => spans.push(Span::styled(
            format!("  load failed: {}", failed.label()),
            Style::default().fg(Color::Red),
        )),
        LoadState::Idle | LoadState::Ready => {}
    }

    let border_color = if is_focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .title(Span::styled(
            format!(" {TITLE} "),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// Draw the required-field progress gauge
pub fn draw_progress(frame: &mut Frame, area: Rect, app: &App) {
    let percent = app.session.progress().round().clamp(0.0, 100.0) as u16;
    let color = if percent == 100 {
        Color::Green
    } else {
        Color::Cyan
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(" Progress ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .percent(percent)
        .label(format!("{percent}%"));

    frame.render_widget(gauge, area);
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::raw(" ")];

    let hints = focus_hints(app);
    spans.push(Span::styled(hints, Style::default().fg(Color::Gray)));

    if app.state.toasts.is_visible() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("Esc:dismiss", Style::default().fg(Color::Gray)));
    }

    if let Some(id) = app.session.editing() {
        spans.push(Span::raw(" | "));
        let short_id: String = id.chars().take(8).collect();
        spans.push(Span::styled(
            format!("editing {short_id}"),
            Style::default().fg(Color::Yellow),
        ));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, area);

    // Render quit hint on the right
    let quit_hint = " ^C:quit ";
    let quit_area = Rect {
        x: area.x + area.width.saturating_sub(quit_hint.len() as u16),
        width: (quit_hint.len() as u16).min(area.width),
        ..area
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

/// Get keyboard hints for the focused element
fn focus_hints(app: &App) -> String {
    match app.state.focus {
        Focus::FormTypeSelector => {
            format!("←/→:form type  Enter:reload  Tab:next  {SUBMIT_SHORTCUT}:submit")
        }
        Focus::Field(_) => match app.focused_field() {
            Some(field) if field.kind.is_dropdown() => {
                format!("←/→:choose  Tab:next  S-Tab:prev  {SUBMIT_SHORTCUT}:submit")
            }
            _ => format!("type to edit  Backspace:erase  Tab:next  {SUBMIT_SHORTCUT}:submit"),
        },
        Focus::Submit => "Enter:submit  Tab:next  S-Tab:prev".to_string(),
        Focus::Entries => "j/k:nav  e:edit  d:delete  Tab:next".to_string(),
    }
}


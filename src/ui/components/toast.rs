//! Toast overlay for notifications

use crate::state::{Notification, NotificationKind};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const MAX_TOAST_WIDTH: u16 = 44;

fn kind_color(kind: NotificationKind) -> Color {
    match kind {
        NotificationKind::Success => Color::Green,
        NotificationKind::Error => Color::Red,
        NotificationKind::Info => Color::Cyan,
    }
}

/// Render a toast in the bottom-right corner of `area`
pub fn render_toast(frame: &mut Frame, area: Rect, notification: &Notification) {
    let padding = 4u16; // 1 char padding plus border on each side
    let max_line_width = MAX_TOAST_WIDTH.min(area.width).saturating_sub(padding) as usize;
    if max_line_width == 0 {
        return;
    }

    let wrapped_lines = wrap_text(&notification.message, max_line_width);
    let content_width = wrapped_lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(notification.kind.label().len()) as u16;
    let width = (content_width + padding).min(area.width);
    let height = (wrapped_lines.len() as u16 + 2).min(area.height);

    let toast_area = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + area.height.saturating_sub(height),
        width,
        height,
    };

    let color = kind_color(notification.kind);
    let lines: Vec<Line> = wrapped_lines
        .into_iter()
        .map(|l| Line::from(Span::raw(format!(" {l}"))))
        .collect();

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", notification.kind.label()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(Color::Black));

    frame.render_widget(Clear, toast_area);
    frame.render_widget(Paragraph::new(lines).block(block), toast_area);
}

/// Wrap text to fit within a maximum width
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        let needed = current_line.chars().count() + word.chars().count() + 1;
        if needed > max_width && !current_line.is_empty() {
            lines.push(std::mem::take(&mut current_line));
        }
        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }
    if !current_line.is_empty() || lines.is_empty() {
        lines.push(current_line);
    }

    lines
}

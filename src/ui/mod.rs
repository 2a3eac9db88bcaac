//! UI module for rendering the TUI

mod components;
mod entries;
mod forms;
mod layout;
mod widgets;

use crate::app::App;
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let areas = layout::create_layout(frame.area());

    layout::draw_header(frame, areas.header, app);
    layout::draw_progress(frame, areas.progress, app);

    let has_entries = !app.session.entries().is_empty();
    let (form_area, entries_area) = layout::split_body(areas.body, has_entries);
    forms::draw_form(frame, form_area, app);
    if let Some(entries_area) = entries_area {
        entries::draw_entries(frame, entries_area, app);
    }

    layout::draw_status_bar(frame, areas.status, app);

    // Toast overlays the bottom-right of the body
    if let Some(notification) = app.state.toasts.current() {
        components::render_toast(frame, areas.body, notification);
    }
}

use crate::app::{App, Screen};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use super::{
    render_catalog_list, render_clear_confirmation, render_detail, render_favorites, render_header,
    render_help_screen, render_search_overlay, render_status_bar,
};

/// Render the complete UI
pub fn render(frame: &mut Frame, app: &App) {
    let size = frame.size();

    // Create main layout: header, content, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    render_header(frame, app, chunks[0]);
    render_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Overlays (drawn last)
    if app.search_open {
        render_search_overlay(frame, app, size);
    }
    if app.confirming_clear {
        render_clear_confirmation(frame, app, size);
    }
    if app.help_open {
        render_help_screen(frame, app, size);
    }
}

/// Render the main content area: the open detail view, or the current screen
fn render_content(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(view) = app.current_detail() {
        render_detail(frame, app, view, area);
        return;
    }

    match app.screen {
        Screen::Favorites => render_favorites(frame, app, area),
        Screen::Characters | Screen::Episodes | Screen::Locations => render_catalog_list(frame, app, area),
    }
}

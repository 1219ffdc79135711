use crate::app::{App, Screen};
use anyhow::Result;
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};
use std::time::Duration;

/// Terminal events
#[derive(Debug, Clone, Copy)]
pub enum Event {
    /// Key press event
    Key(KeyEvent),
    /// Terminal tick event
    Tick,
    /// Mouse event
    Mouse(MouseEvent),
}

/// Event handler for the terminal
pub struct EventHandler {
    /// Tick rate in milliseconds
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new(tick_rate_ms: u64) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    /// Poll for the next event
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                CEvent::Key(key) => return Ok(Event::Key(key)),
                CEvent::Mouse(m) => return Ok(Event::Mouse(m)),
                _ => {}
            }
        }
        Ok(Event::Tick)
    }
}

/// Handle key events for the application
pub fn handle_key_event(key: KeyEvent, app: &mut App) {
    // On Windows, crossterm reports both key press and release events.
    // We only want to handle press events to avoid duplicates.
    if key.kind != KeyEventKind::Press {
        return;
    }

    let keys = app.keys;

    // Help screen takes precedence
    if app.help_open {
        if key.code == KeyCode::Esc || keys.help.matches(&key) {
            app.close_help();
        }
        return;
    }

    if app.confirming_clear {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => app.confirm_clear_all(),
            KeyCode::Char('n') | KeyCode::Esc => app.cancel_clear_all(),
            _ => {}
        }
        return;
    }

    if app.search_open {
        handle_search_input(key, app);
        return;
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    // --- Configurable bindings ---
    if keys.quit.matches(&key) {
        app.quit();
    } else if keys.help.matches(&key) {
        app.open_help();
    } else if keys.toggle_favorite.matches(&key) {
        app.toggle_favorite_selected();
    } else if keys.load_more.matches(&key) {
        app.load_more();
    } else if keys.search.matches(&key) {
        app.open_search();
    } else if keys.open.matches(&key) {
        app.open_selected();
    } else if keys.back.matches(&key) {
        app.go_back();
    } else if keys.next_tab.matches(&key) {
        app.next_tab();
    } else if keys.clear_all.matches(&key) {
        app.request_clear_all();
    } else if keys.open_image.matches(&key) {
        app.open_selected_image();
    } else {
        handle_navigation(key, app);
    }
}

/// Fixed navigation keys
fn handle_navigation(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Up => app.move_up(),
        KeyCode::Down => app.move_down(),
        KeyCode::Home => app.move_to_start(),
        KeyCode::End => app.move_to_end(),
        KeyCode::Left => app.previous_favorites_filter(),
        KeyCode::Right => app.next_favorites_filter(),
        KeyCode::BackTab => app.previous_screen(),
        KeyCode::Esc => app.go_back(),
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            app.select_screen(Screen::ALL[index]);
        }
        _ => {}
    }
}

/// Handle key events while the name filter overlay is open
fn handle_search_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => app.close_search(),
        KeyCode::Enter => app.apply_search(),
        KeyCode::Backspace => {
            app.search_buffer.pop();
        }
        KeyCode::Char(c) => {
            // Allow AltGr combinations (CONTROL+ALT) for special characters
            if !key.modifiers.contains(KeyModifiers::CONTROL) || key.modifiers.contains(KeyModifiers::ALT) {
                app.search_buffer.push(c);
            }
        }
        _ => {}
    }
}

/// Handle mouse events: the wheel moves the selection
pub fn handle_mouse_event(mouse: MouseEvent, app: &mut App) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.move_up(),
        MouseEventKind::ScrollDown => app.move_down(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::test_app;

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), app);
    }

    #[test]
    fn test_event_handler_creation() {
        let handler = EventHandler::new(250);
        assert_eq!(handler.tick_rate, Duration::from_millis(250));
    }

    #[test]
    fn test_number_keys_switch_screens() {
        let (_rt, mut app) = test_app();
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.screen, Screen::Episodes);
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.screen, Screen::Favorites);
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let (_rt, mut app) = test_app();
        press(&mut app, KeyCode::Char('h'));
        assert!(app.help_open);

        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Esc);
        assert!(!app.help_open);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_search_overlay_collects_text() {
        let (_rt, mut app) = test_app();
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('/'));
        assert!(app.search_open);

        for c in "rixk".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.search_buffer, "rick");

        // 'q' is text here, not quit
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Esc);
        assert!(!app.search_open);
    }

    #[test]
    fn test_release_events_are_ignored() {
        let (_rt, mut app) = test_app();
        let mut key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        handle_key_event(key, &mut app);
        assert!(!app.should_quit);
    }
}

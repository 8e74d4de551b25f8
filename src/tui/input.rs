//! Keyboard input handling.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::App;

pub fn handle_input(app: &mut App, key: KeyEvent) {
    // Global quit
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('r') => app.request_refresh(),
        _ => {}
    }
}

//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  Two modes: normal
//! navigation, and search entry (entered with `/`) where printable keys
//! edit the search term live.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::{App, InputMode};

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    match app.input_mode {
        InputMode::Search => match key.code {
            KeyCode::Esc => app.cancel_search(),
            KeyCode::Enter => app.input_mode = InputMode::Normal,
            KeyCode::Backspace => app.pop_search_char(),
            KeyCode::Char(c) => app.push_search_char(c),
            _ => {}
        },
        InputMode::Normal => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
            KeyCode::Tab => app.switch_page(),
            KeyCode::Char('r') => app.refresh_current(),
            KeyCode::Char('/') => app.input_mode = InputMode::Search,
            KeyCode::Char('c') => app.cycle_category(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
            KeyCode::Home | KeyCode::Char('g') => app.select_first(),
            KeyCode::End | KeyCode::Char('G') => app.select_last(),
            _ => {}
        },
    }
}

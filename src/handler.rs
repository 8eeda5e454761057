use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crate::app::{App, InputMode, Mode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Start typing a message
        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.input_mode = InputMode::Editing;
            app.chat_cursor = app.chat_input.chars().count();
        }

        // Template / route alternative selection
        KeyCode::Char('j') | KeyCode::Down => match app.mode {
            Mode::Start => app.template_nav_down(),
            Mode::Route => app.route_nav_down(),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.mode {
            Mode::Start => app.template_nav_up(),
            Mode::Route => app.route_nav_up(),
        },

        // Activate the selected suggested prompt: send it, or toggle
        // between the chat and route views
        KeyCode::Enter => app.activate_selected_template(),

        // Direct view toggles
        KeyCode::Char('r') => app.enter_route_view(),
        KeyCode::Char('b') | KeyCode::Esc => {
            if app.mode == Mode::Route {
                app.leave_route_view();
            }
        }

        // Scrolling
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => match app.mode {
            Mode::Start => app.scroll_chat_down(),
            Mode::Route => app.itinerary_scroll = app.itinerary_scroll.saturating_add(1),
        },
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => match app.mode {
            Mode::Start => app.scroll_chat_up(),
            Mode::Route => app.itinerary_scroll = app.itinerary_scroll.saturating_sub(1),
        },
        KeyCode::Char('g') => match app.mode {
            Mode::Start => app.chat_scroll = 0,
            Mode::Route => app.itinerary_scroll = 0,
        },
        KeyCode::Char('G') => {
            if app.mode == Mode::Start {
                app.scroll_chat_to_bottom();
            }
        }

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            let text = app.chat_input.clone();
            app.send_message(text);
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            if app.chat_cursor > 0 {
                app.chat_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.chat_input.chars().count();
            if app.chat_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.chat_cursor = app.chat_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.chat_input.chars().count();
            app.chat_cursor = (app.chat_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.chat_cursor = 0;
        }
        KeyCode::End => {
            app.chat_cursor = app.chat_input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
            app.chat_input.insert(byte_pos, c);
            app.chat_cursor += 1;
        }
        _ => {}
    }
}

//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, Page, SettingsField};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Nothing to do until the session has been torn down
    if matches!(app.state, AppState::SigningOut) {
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    if !app.is_authenticated() {
        handle_auth_input(app, key);
        return Ok(false);
    }

    if app.dialog.is_open() {
        handle_dialog_input(app, key);
        return Ok(false);
    }

    if matches!(app.state, AppState::EditingSettings) {
        handle_settings_input(app, key);
        return Ok(false);
    }

    handle_normal_input(app, key);
    Ok(false)
}

fn handle_auth_input(app: &mut App, key: KeyEvent) {
    let form = &mut app.auth_form;
    match key.code {
        KeyCode::Esc => app.state = AppState::ConfirmingQuit,
        KeyCode::F(2) => form.toggle_mode(),
        KeyCode::Down | KeyCode::Tab => form.next_field(),
        KeyCode::Up | KeyCode::BackTab => form.prev_field(),
        KeyCode::Enter => app.submit_auth(),
        KeyCode::Backspace => {
            if !form.is_submitting() {
                form.pop_char();
            }
        }
        KeyCode::Char(c) => {
            if !form.is_submitting() {
                form.push_char(c);
            }
        }
        _ => {}
    }
}

fn handle_dialog_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.dialog.cancel(),
        KeyCode::Enter => app.create_key(),
        KeyCode::Backspace => app.dialog.pop_char(),
        KeyCode::Char(c) => app.dialog.push_char(c),
        _ => {}
    }
}

fn handle_settings_input(app: &mut App, key: KeyEvent) {
    let form = &mut app.settings;
    if form.saving {
        return;
    }
    match key.code {
        KeyCode::Esc => app.state = AppState::Normal,
        KeyCode::Down | KeyCode::Tab => form.focus = form.focus.next(),
        KeyCode::Up | KeyCode::BackTab => form.focus = form.focus.prev(),
        KeyCode::Enter => match form.focus {
            SettingsField::Save => app.save_profile(),
            _ => form.focus = form.focus.next(),
        },
        KeyCode::Backspace => form.pop_char(),
        KeyCode::Char(c) => form.push_char(c),
        _ => {}
    }
}

fn handle_normal_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('1') => app.page = Page::Dashboard,
        KeyCode::Char('2') => app.page = Page::Api,
        KeyCode::Char('3') => app.page = Page::Settings,
        KeyCode::Tab | KeyCode::Right => app.page = app.page.next(),
        KeyCode::BackTab | KeyCode::Left => app.page = app.page.prev(),
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('L') => app.logout(),
        KeyCode::Char('r') => {
            app.status_message = None;
            app.refresh();
        }
        _ => match app.page {
            Page::Api => handle_keys_page_input(app, key),
            Page::Settings => {
                if key.code == KeyCode::Char('e') {
                    app.status_message = None;
                    app.settings.focus = SettingsField::Username;
                    app.state = AppState::EditingSettings;
                }
            }
            Page::Dashboard => {}
        },
    }
}

fn handle_keys_page_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.select_next_key(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev_key(),
        KeyCode::Char('c') | KeyCode::Enter => app.copy_selected_key(),
        KeyCode::Char('n') => {
            app.status_message = None;
            app.dialog.open();
        }
        _ => {}
    }
}

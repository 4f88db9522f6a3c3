use std::path::PathBuf;

use anyhow::{anyhow, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, InputMode, PendingSend, StatusKind};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
            poll_pending(app).await;
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

    // The upload popup captures all input while open
    if app.show_upload {
        handle_upload_popup(app, key);
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

        // Back to typing
        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.input_mode = InputMode::Editing;
            app.cursor = app.input.chars().count();
        }

        // Open the upload popup
        KeyCode::Char('u') if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            open_upload_popup(app);
        }

        // Transcript scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_up();
        }
        KeyCode::Char('g') => app.scroll_to_top(),
        KeyCode::Char('G') => app.scroll_to_bottom(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            submit_message(app);
        }
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.cursor);
            app.input.insert(byte_pos, c);
            app.cursor += 1;
        }
        _ => {}
    }
}

fn handle_upload_popup(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.show_upload = false;
            app.upload_input.clear();
            app.upload_cursor = 0;
        }
        KeyCode::Enter => {
            submit_upload(app);
        }
        KeyCode::Backspace => {
            if app.upload_cursor > 0 {
                app.upload_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.upload_input, app.upload_cursor);
                app.upload_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.upload_input.chars().count();
            if app.upload_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.upload_input, app.upload_cursor);
                app.upload_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.upload_cursor = app.upload_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.upload_input.chars().count();
            app.upload_cursor = (app.upload_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.upload_cursor = 0;
        }
        KeyCode::End => {
            app.upload_cursor = app.upload_input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.upload_input, app.upload_cursor);
            app.upload_input.insert(byte_pos, c);
            app.upload_cursor += 1;
        }
        _ => {}
    }
}

fn open_upload_popup(app: &mut App) {
    app.show_upload = true;
    app.upload_input.clear();
    app.upload_cursor = 0;
}

/// Starts a chat round trip: transcript transition first, then the request
/// in a background task keyed by the send token. Blank input does nothing.
fn submit_message(app: &mut App) {
    let message = app.input.trim().to_string();
    let Some(token) = app.session.begin_send(&app.input) else {
        return;
    };

    app.input.clear();
    app.cursor = 0;
    app.scroll_to_bottom();

    let client = app.client.clone();
    app.pending_sends.push(PendingSend {
        token,
        handle: tokio::spawn(async move { client.chat(&message).await }),
    });
}

fn submit_upload(app: &mut App) {
    let trimmed = app.upload_input.trim().to_string();
    if trimmed.is_empty() {
        return;
    }

    app.show_upload = false;
    app.upload_input.clear();
    app.upload_cursor = 0;

    if app.pending_upload.is_some() {
        app.set_status(
            StatusKind::Info,
            "An upload is already in progress.".to_string(),
        );
        return;
    }

    let path = expand_tilde(&trimmed);
    if !path.is_file() {
        app.set_status(StatusKind::Error, format!("No such file: {}", path.display()));
        return;
    }

    app.set_status(StatusKind::Info, format!("Uploading {}...", path.display()));

    let client = app.client.clone();
    app.pending_upload = Some(tokio::spawn(async move { client.upload(&path).await }));
}

/// Collects finished background requests and folds them into the app
/// state. Runs on every tick from the event loop, so completion order does
/// not matter: each chat reply resolves its own tagged placeholder.
async fn poll_pending(app: &mut App) {
    let mut i = 0;
    while i < app.pending_sends.len() {
        if app.pending_sends[i].handle.is_finished() {
            let send = app.pending_sends.remove(i);
            let result = match send.handle.await {
                Ok(result) => result,
                Err(e) => Err(anyhow!("chat task failed: {}", e)),
            };
            app.finish_send(send.token, result);
        } else {
            i += 1;
        }
    }

    let upload_done = app
        .pending_upload
        .as_ref()
        .map(|h| h.is_finished())
        .unwrap_or(false);
    if upload_done {
        if let Some(handle) = app.pending_upload.take() {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(anyhow!("upload task failed: {}", e)),
            };
            app.finish_upload(result);
        }
    }
}

fn expand_tilde(input: &str) -> PathBuf {
    if let Some(rest) = input.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(input)
}

// tradechat — a terminal chat client for marketplace conversations
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};

use super::App;
use crate::chat::HeightBatch;
use crate::feed::FeedEvent;

const MOUSE_SCROLL_LINES: isize = 3;

pub fn handle_terminal_event(app: &mut App, event: Event) {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Mouse(mouse) => handle_mouse(app, mouse),
        Event::Paste(text) => {
            app.input.insert_str(&text);
            app.maybe_send_typing();
        }
        // Resize is picked up by the width sync before the next draw.
        _ => {}
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => app.should_quit = true,
        KeyCode::Tab => app.switch_chat(),
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
            app.input.insert_newline();
        }
        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => app.input.backspace(),
        KeyCode::Delete => app.input.delete_forward(),
        KeyCode::Up if ctrl => app.viewport.scroll_by(-1),
        KeyCode::Down if ctrl => app.viewport.scroll_by(1),
        KeyCode::Up => app.input.move_up(),
        KeyCode::Down => app.input.move_down(),
        KeyCode::Left => app.input.move_left(),
        KeyCode::Right => app.input.move_right(),
        KeyCode::Home => app.input.move_home(),
        KeyCode::End => app.input.move_end(),
        KeyCode::PageUp => {
            let page = app.viewport.page_rows() as isize;
            app.viewport.scroll_by(-page);
        }
        KeyCode::PageDown => {
            let page = app.viewport.page_rows() as isize;
            app.viewport.scroll_by(page);
        }
        KeyCode::Esc => app.jump_to_latest(),
        KeyCode::Char(c) => {
            app.input.insert_char(c);
            app.maybe_send_typing();
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.viewport.scroll_by(-MOUSE_SCROLL_LINES),
        MouseEventKind::ScrollDown => app.viewport.scroll_by(MOUSE_SCROLL_LINES),
        _ => {}
    }
}

/// Fold a feed event in, then re-sync the active session if its chat was
/// the one touched. Events for background chats only update the feed —
/// their sessions are rebuilt from scratch on switch.
pub fn handle_feed_event(app: &mut App, event: FeedEvent) {
    let affected = app.feed.apply_event(event);
    let active = app.session.chat_id().to_owned();
    if affected.as_deref() == Some(active.as_str()) {
        app.sync_messages();
        let loading = app.feed.loading(&active);
        app.session.notify_loading(loading);
    }
}

pub fn handle_height_batch(app: &mut App, batch: HeightBatch) {
    if let Some(request) = app.session.apply_heights(batch, std::time::Instant::now()) {
        app.spawn_measure(request);
    }
}

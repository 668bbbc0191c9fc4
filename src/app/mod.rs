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

pub mod events;
mod input;

pub use input::InputState;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{
    EventStream, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use futures::{FutureExt as _, StreamExt as _};
use tokio::sync::mpsc;

use crate::chat::{
    ChatSession, ChatTuning, HeightBatch, MeasureRequest, SessionCommand, measure_heights,
};
use crate::error::AppError;
use crate::feed::{FeedEvent, MessageFeed};
use crate::ui::{MessageRenderer, viewport::Viewport};

/// Everything the TUI owns: the feed, the active chat session, the
/// viewport, and the composer. One instance per process.
pub struct App {
    pub feed: Box<dyn MessageFeed>,
    pub session: ChatSession,
    pub viewport: Viewport,
    pub input: InputState,
    pub chat_order: Vec<String>,
    pub spinner_frame: usize,
    pub should_quit: bool,
    pub exit_error: Option<AppError>,
    feed_rx: mpsc::UnboundedReceiver<FeedEvent>,
    height_tx: mpsc::UnboundedSender<HeightBatch>,
    height_rx: mpsc::UnboundedReceiver<HeightBatch>,
    last_typing_signal: Option<Instant>,
    synced_once: bool,
}

impl App {
    pub fn new(
        feed: Box<dyn MessageFeed>,
        feed_rx: mpsc::UnboundedReceiver<FeedEvent>,
        current_user_id: &str,
        start_chat: Option<&str>,
        tuning: ChatTuning,
    ) -> Result<Self, AppError> {
        let chat_order: Vec<String> = feed.chats().into_iter().map(|c| c.id).collect();
        let active = match start_chat {
            Some(id) => chat_order
                .iter()
                .find(|c| c.as_str() == id)
                .ok_or(AppError::ChatNotFound)?
                .clone(),
            None => chat_order.first().ok_or(AppError::ChatNotFound)?.clone(),
        };

        let renderer = Arc::new(MessageRenderer::new(current_user_id));
        let (height_tx, height_rx) = mpsc::unbounded_channel();
        Ok(Self {
            session: ChatSession::new(&active, current_user_id, renderer, tuning),
            feed,
            viewport: Viewport::new(),
            input: InputState::new(),
            chat_order,
            spinner_frame: 0,
            should_quit: false,
            exit_error: None,
            feed_rx,
            height_tx,
            height_rx,
            last_typing_signal: None,
            synced_once: false,
        })
    }

    /// Cycle to the next conversation. The old session's render list,
    /// heights, and any in-flight measurement die with it.
    pub fn switch_chat(&mut self) {
        if self.chat_order.len() < 2 {
            return;
        }
        let current = self.session.chat_id();
        let position =
            self.chat_order.iter().position(|c| c.as_str() == current).unwrap_or(0);
        let next = self.chat_order[(position + 1) % self.chat_order.len()].clone();
        self.session.set_chat(&next);
        self.viewport.reset();
        self.sync_messages();
    }

    /// Pull the active chat's snapshot out of the feed and reconcile it.
    pub fn sync_messages(&mut self) {
        let messages = self.feed.messages(self.session.chat_id()).to_vec();
        if let Some(request) = self.session.apply_messages(&messages, Instant::now()) {
            self.spawn_measure(request);
        }
    }

    /// Run a measurement batch off the render path; the result comes back
    /// through the height channel.
    pub fn spawn_measure(&self, request: MeasureRequest) {
        let renderer = self.session.renderer();
        let tuning = self.session.tuning();
        let tx = self.height_tx.clone();
        tokio::spawn(async move {
            let batch = measure_heights(
                renderer,
                request.items,
                request.viewport_width,
                request.generation,
                tuning,
            )
            .await;
            let _ = tx.send(batch);
        });
    }

    pub fn submit_input(&mut self) {
        let body = self.input.text().trim().to_owned();
        if body.is_empty() {
            return;
        }
        let chat_id = self.session.chat_id().to_owned();
        self.feed.send_message(&chat_id, &body);
        self.input.clear();
        // Reconcile right away so the own-message snap lands this frame.
        self.sync_messages();
    }

    /// Forward a typing signal, debounced to one per configured interval.
    pub fn maybe_send_typing(&mut self) {
        let now = Instant::now();
        let debounce = self.session.tuning().typing_debounce;
        if self.last_typing_signal.is_some_and(|last| now.duration_since(last) < debounce) {
            return;
        }
        self.last_typing_signal = Some(now);
        let chat_id = self.session.chat_id().to_owned();
        self.feed.send_typing_signal(&chat_id);
    }

    /// Ease back down to the newest message.
    pub fn jump_to_latest(&mut self) {
        let Some(last) = self.session.items().len().checked_sub(1) else {
            return;
        };
        self.viewport.scroll_to_row(
            &self.session,
            last,
            crate::ui::viewport::Align::End,
            crate::ui::viewport::ScrollBehavior::Smooth,
        );
    }

    /// Post-frame bookkeeping, in delivery order: the scroll observation
    /// feeds the reconciler before the next message mutation is allowed to
    /// consult the stick-to-bottom flag.
    pub fn after_frame(&mut self, now: Instant) {
        if self.viewport.is_mounted() {
            let chat_id = self.session.chat_id().to_owned();
            let command = self.session.observe_scroll(
                self.viewport.offset(),
                self.viewport.max_offset(),
                self.feed.has_more(&chat_id),
                self.feed.loading(&chat_id),
            );
            if let Some((_, last_visible)) = self.viewport.visible_items() {
                self.session.observe_visible_rows(last_visible);
            }
            if command == Some(SessionCommand::LoadMoreHistory) {
                tracing::debug!(chat_id, "requesting one more history page");
                self.feed.load_more_history(&chat_id);
            }
        }
        self.session.on_tick(now);
    }
}

// ---------------------------------------------------------------------------
// TUI event loop
// ---------------------------------------------------------------------------

pub async fn run_tui(app: &mut App) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    // Enable bracketed paste and mouse capture (ignore error on unsupported terminals)
    let _ = crossterm::execute!(
        std::io::stdout(),
        crossterm::event::EnableBracketedPaste,
        crossterm::event::EnableMouseCapture,
        crossterm::event::EnableFocusChange,
        PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
        )
    );

    let mut events = EventStream::new();
    let tick_duration = Duration::from_millis(16);
    let mut last_render = Instant::now();

    loop {
        // Phase 1: wait for at least one event or the next frame tick
        let time_to_next = tick_duration.saturating_sub(last_render.elapsed());
        tokio::select! {
            Some(Ok(event)) = events.next() => {
                events::handle_terminal_event(app, event);
            }
            event = app.feed_rx.recv() => {
                match event {
                    Some(event) => events::handle_feed_event(app, event),
                    None => {
                        app.exit_error = Some(AppError::FeedClosed);
                        app.should_quit = true;
                    }
                }
            }
            Some(batch) = app.height_rx.recv() => {
                events::handle_height_batch(app, batch);
            }
            () = tokio::time::sleep(time_to_next) => {}
        }

        // Phase 2: drain all remaining queued events (non-blocking)
        loop {
            // Terminal events first (keeps typing responsive)
            if let Some(Some(Ok(event))) = events.next().now_or_never() {
                events::handle_terminal_event(app, event);
                continue;
            }
            if let Ok(batch) = app.height_rx.try_recv() {
                events::handle_height_batch(app, batch);
                continue;
            }
            match app.feed_rx.try_recv() {
                Ok(event) => events::handle_feed_event(app, event),
                Err(_) => break,
            }
        }

        if app.should_quit {
            break;
        }

        // Phase 3: geometry, pending adjustments, then render once
        let size = terminal.size()?;
        if let Some(request) = app.session.set_viewport_width(size.width, Instant::now()) {
            app.spawn_measure(request);
        }
        if !app.synced_once {
            app.synced_once = true;
            app.sync_messages();
        }

        let chat_id = app.session.chat_id();
        if !app.feed.typing_users(chat_id).is_empty() || app.feed.loading(chat_id) {
            app.spinner_frame = app.spinner_frame.wrapping_add(1);
        }

        // Adjustments land before paint so the frame never flickers
        // through an unanchored position.
        if app.viewport.is_mounted() && app.session.has_adjustments() {
            let adjustments = app.session.take_adjustments();
            app.viewport.apply(&app.session, &adjustments);
        }

        terminal.draw(|frame| crate::ui::render(frame, app))?;
        app.after_frame(Instant::now());
        last_render = Instant::now();
    }

    // Restore terminal
    let _ = crossterm::execute!(
        std::io::stdout(),
        crossterm::event::DisableBracketedPaste,
        crossterm::event::DisableMouseCapture,
        crossterm::event::DisableFocusChange,
        PopKeyboardEnhancementFlags
    );
    ratatui::restore();

    Ok(())
}

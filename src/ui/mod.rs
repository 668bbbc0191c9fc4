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

mod input;
mod markdown;
pub mod message;
pub mod theme;
pub mod viewport;

pub use message::MessageRenderer;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::App;

/// Cap the composer so the transcript keeps most of the screen.
const MAX_INPUT_HEIGHT: u16 = 6;

pub fn render(frame: &mut Frame, app: &mut App) {
    let frame_area = frame.area();
    let input_rows = app.input.line_count().clamp(1, MAX_INPUT_HEIGHT);
    let chunks = Layout::vertical([
        Constraint::Length(1),          // header
        Constraint::Length(1),          // separator
        Constraint::Min(1),             // transcript
        Constraint::Length(1),          // typing indicator
        Constraint::Length(1),          // separator
        Constraint::Length(input_rows), // composer
        Constraint::Length(1),          // footer
    ])
    .split(frame_area);

    render_header(frame, chunks[0], app);
    render_separator(frame, chunks[1]);
    render_transcript(frame, chunks[2], app);
    render_typing(frame, chunks[3], app);
    render_separator(frame, chunks[4]);
    input::render(frame, chunks[5], app);
    render_footer(frame, chunks[6]);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let active = app.session.chat_id();
    let Some(summary) = app.feed.chats().into_iter().find(|c| c.id == active) else {
        return;
    };

    let mut spans = vec![
        Span::raw("  "),
        Span::styled(
            summary.peer_name.clone(),
            Style::default().fg(theme::ROLE_PEER).add_modifier(Modifier::BOLD),
        ),
    ];
    if summary.peer_online {
        spans.push(Span::styled(
            format!(" {}", theme::PRESENCE_DOT),
            Style::default().fg(theme::PRESENCE_ONLINE),
        ));
    }
    spans.push(Span::styled(
        format!("  {}", summary.listing),
        Style::default().fg(theme::DIM),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);

    let position =
        app.chat_order.iter().position(|c| c.as_str() == active).map_or(0, |p| p + 1);
    let right = Line::from(Span::styled(
        format!("{position}/{}  ", app.chat_order.len()),
        Style::default().fg(theme::DIM),
    ));
    frame.render_widget(Paragraph::new(right).alignment(Alignment::Right), area);
}

fn render_transcript(frame: &mut Frame, area: Rect, app: &mut App) {
    let App { session, viewport, feed, .. } = app;
    viewport.render(frame, area, session);

    if session.items().is_empty() && !feed.loading(session.chat_id()) {
        let hint = Line::from(Span::styled(
            "No messages yet — say hi!",
            Style::default().fg(theme::DIM),
        ));
        frame.render_widget(
            Paragraph::new(hint).alignment(Alignment::Center),
            Rect { height: 1, y: area.y + area.height / 2, ..area },
        );
        return;
    }

    if feed.loading(session.chat_id()) && area.height > 0 {
        let banner = Line::from(Span::styled(
            "loading older messages…",
            Style::default().fg(theme::LOADING),
        ));
        frame.render_widget(
            Paragraph::new(banner).alignment(Alignment::Center),
            Rect { height: 1, ..area },
        );
    }

    let unread = session.unread();
    if unread > 0 && !session.is_at_bottom() && area.height > 1 {
        let plural = if unread == 1 { "" } else { "s" };
        let badge = Line::from(Span::styled(
            format!(" ↓ {unread} new message{plural} "),
            Style::default().fg(theme::UNREAD_BADGE).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(
            Paragraph::new(badge).alignment(Alignment::Right),
            Rect { height: 1, y: area.bottom() - 1, ..area },
        );
    }
}

fn render_typing(frame: &mut Frame, area: Rect, app: &App) {
    let users = app.feed.typing_users(app.session.chat_id());
    if let Some(line) = message::typing_line(&users, app.spinner_frame) {
        let padded = Rect {
            x: area.x + 2,
            width: area.width.saturating_sub(2),
            ..area
        };
        frame.render_widget(Paragraph::new(line), padded);
    }
}

fn render_separator(frame: &mut Frame, area: Rect) {
    if area.height == 0 {
        return;
    }
    let line = Line::from(Span::styled(
        theme::SEPARATOR_CHAR.repeat(usize::from(area.width)),
        Style::default().fg(theme::DIM),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let hints = Line::from(Span::styled(
        "  Tab chats · Enter send · Shift+Enter newline · PgUp/PgDn scroll · Esc latest · Ctrl+C quit",
        Style::default().fg(theme::DIM),
    ));
    frame.render_widget(Paragraph::new(hints), area);
}

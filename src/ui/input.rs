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

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthChar;

use crate::app::App;
use crate::ui::theme;

/// Horizontal padding to match the header/footer inset.
const INPUT_PAD: u16 = 2;

/// Prompt prefix width: "❯ " = 2 columns.
const PROMPT_WIDTH: u16 = 2;

pub(super) fn render(frame: &mut Frame, area: Rect, app: &App) {
    if area.height == 0 {
        return;
    }
    let padded = Rect {
        x: area.x + INPUT_PAD,
        y: area.y,
        width: area.width.saturating_sub(INPUT_PAD * 2),
        height: area.height,
    };

    if app.input.is_empty() {
        let line = Line::from(vec![
            Span::styled(
                format!("{} ", theme::PROMPT_CHAR),
                Style::default().fg(theme::MARKET_TEAL),
            ),
            Span::styled("Type a message…", Style::default().fg(theme::DIM)),
        ]);
        frame.render_widget(Paragraph::new(line), padded);
        frame.set_cursor_position((padded.x + PROMPT_WIDTH, padded.y));
        return;
    }

    // Tail window over the logical lines; no wrapping, chat messages are
    // short and Enter sends anyway.
    let lines: Vec<&str> = app.input.lines().collect();
    let visible_start = lines.len().saturating_sub(usize::from(area.height));
    let rendered: Vec<Line> = lines[visible_start..]
        .iter()
        .enumerate()
        .map(|(row, text)| {
            let prefix = if row == 0 && visible_start == 0 {
                Span::styled(
                    format!("{} ", theme::PROMPT_CHAR),
                    Style::default().fg(theme::MARKET_TEAL),
                )
            } else {
                Span::raw("  ")
            };
            Line::from(vec![prefix, Span::raw((*text).to_owned())])
        })
        .collect();
    frame.render_widget(Paragraph::new(rendered), padded);

    let (cursor_row, cursor_col) = app.input.cursor_position();
    if cursor_row < visible_start {
        return;
    }
    let columns: u16 = lines[cursor_row]
        .chars()
        .take(cursor_col)
        .map(|c| u16::try_from(c.width().unwrap_or(0)).unwrap_or(0))
        .sum();
    let x = (padded.x + PROMPT_WIDTH + columns).min(padded.right().saturating_sub(1));
    let y = padded.y + u16::try_from(cursor_row - visible_start).unwrap_or(0);
    frame.set_cursor_position((x, y.min(padded.bottom().saturating_sub(1))));
}

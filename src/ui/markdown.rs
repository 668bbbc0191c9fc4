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

use ratatui::text::{Line, Span};
use std::panic::{self, AssertUnwindSafe};

/// Message bodies are user-supplied markdown. tui-markdown has panicked on
/// exotic inputs before, so rendering is fenced off and degrades to plain
/// text instead of taking the whole frame down.
pub(super) fn body_lines(text: &str) -> Vec<Line<'static>> {
    body_lines_with(text, markdown_lines)
}

fn body_lines_with<F>(text: &str, renderer: F) -> Vec<Line<'static>>
where
    F: FnOnce(&str) -> Vec<Line<'static>>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| renderer(text))) {
        Ok(lines) => lines,
        Err(_) => {
            tracing::warn!("markdown renderer panicked, falling back to plain text");
            plain_lines(text)
        }
    }
}

fn markdown_lines(text: &str) -> Vec<Line<'static>> {
    tui_markdown::from_str(text)
        .lines
        .into_iter()
        .map(|line| {
            let spans: Vec<Span<'static>> = line
                .spans
                .into_iter()
                .map(|span| Span::styled(span.content.into_owned(), span.style))
                .collect();
            Line::from(spans).style(line.style)
        })
        .collect()
}

fn plain_lines(text: &str) -> Vec<Line<'static>> {
    text.split('\n').map(|line| Line::from(Span::raw(line.to_owned()))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_typical_listing_chatter() {
        let lines = body_lines("Is the **price** still 120 €?\n\n- pickup today\n- cash");
        assert!(!lines.is_empty());
    }

    #[test]
    fn survives_degenerate_inputs() {
        let inputs = [
            "",
            "[]()[]()[]()",
            "```\nunterminated fence",
            "> quote\n>\n> - [ ] item [",
            "| a | b |\n|---|\n| lone cell",
        ];
        for input in inputs {
            let result = std::panic::catch_unwind(|| body_lines(input));
            assert!(result.is_ok(), "input triggered panic: {input}");
        }
    }

    #[test]
    fn falls_back_to_plain_text_when_renderer_panics() {
        let lines = body_lines_with("first\nsecond", |_text| panic!("forced renderer panic"));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans[0].content.as_ref(), "first");
        assert_eq!(lines[1].spans[0].content.as_ref(), "second");
    }
}

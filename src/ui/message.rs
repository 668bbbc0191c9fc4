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

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::chat::{DayDivider, DeliveryState, ItemRenderer, Message, RenderItem};
use crate::ui::{markdown, theme};

const TYPING_FRAMES: &[char] = &[
    '\u{280B}', '\u{2819}', '\u{2839}', '\u{2838}', '\u{283C}', '\u{2834}', '\u{2826}', '\u{2827}',
    '\u{2807}', '\u{280F}',
];

/// Turns render items into styled lines. The same instance feeds the
/// visible transcript rows and the off-screen height measurer, which is
/// what keeps measured heights honest.
pub struct MessageRenderer {
    current_user_id: String,
}

impl MessageRenderer {
    #[must_use]
    pub fn new(current_user_id: &str) -> Self {
        Self { current_user_id: current_user_id.to_owned() }
    }

    fn message_lines(&self, msg: &Message) -> Vec<Line<'static>> {
        let own = msg.sender.user_id == self.current_user_id;
        let mut lines = Vec::with_capacity(4);

        let mut header = Vec::with_capacity(4);
        if own {
            header.push(Span::styled(
                "You",
                Style::default().fg(theme::ROLE_SELF).add_modifier(Modifier::BOLD),
            ));
        } else {
            header.push(Span::styled(
                msg.sender.display_name.clone(),
                Style::default().fg(theme::ROLE_PEER).add_modifier(Modifier::BOLD),
            ));
            if msg.sender.online {
                header.push(Span::styled(
                    format!(" {}", theme::PRESENCE_DOT),
                    Style::default().fg(theme::PRESENCE_ONLINE),
                ));
            }
        }
        header.push(Span::styled(
            format!("  {}", msg.sent_at.format("%H:%M")),
            Style::default().fg(theme::DIM),
        ));
        lines.push(Line::from(header));

        lines.extend(markdown::body_lines(&msg.body));

        match msg.delivery {
            DeliveryState::Sent => {}
            DeliveryState::Sending => {
                lines.push(Line::from(Span::styled(
                    "… sending",
                    Style::default().fg(theme::DELIVERY_PENDING),
                )));
            }
            DeliveryState::Failed => {
                lines.push(Line::from(Span::styled(
                    "✗ not delivered",
                    Style::default().fg(theme::DELIVERY_FAILED),
                )));
            }
        }

        lines.push(Line::default());
        lines
    }
}

impl ItemRenderer for MessageRenderer {
    fn lines(&self, item: &RenderItem) -> Vec<Line<'static>> {
        match item {
            RenderItem::Message(msg) => self.message_lines(msg),
            RenderItem::DayDivider(divider) => divider_lines(divider),
        }
    }
}

fn divider_lines(divider: &DayDivider) -> Vec<Line<'static>> {
    let label = divider.date.format("%A, %e %B %Y").to_string();
    vec![
        Line::from(Span::styled(
            format!("{}  {label}  {}", theme::SEPARATOR_CHAR.repeat(3), theme::SEPARATOR_CHAR.repeat(3)),
            Style::default().fg(theme::DAY_DIVIDER),
        )),
        Line::default(),
    ]
}

/// One-line typing indicator under the transcript, or `None` when nobody
/// is typing. `frame` drives the spinner animation.
pub fn typing_line(users: &[String], frame: usize) -> Option<Line<'static>> {
    if users.is_empty() {
        return None;
    }
    let ch = TYPING_FRAMES[frame % TYPING_FRAMES.len()];
    let who = match users {
        [one] => format!("{one} is typing"),
        [one, two] => format!("{one} and {two} are typing"),
        _ => "several people are typing".to_owned(),
    };
    Some(Line::from(Span::styled(
        format!("{ch} {who}…"),
        Style::default().fg(theme::DIM),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Sender;
    use chrono::{Local, TimeZone};

    fn msg(author: &str, delivery: DeliveryState) -> Message {
        Message {
            id: "m1".to_owned(),
            chat_id: "chat-1".to_owned(),
            sender: Sender {
                user_id: author.to_owned(),
                display_name: "Anna".to_owned(),
                online: true,
            },
            body: "still available?".to_owned(),
            sent_at: Local.with_ymd_and_hms(2025, 3, 3, 14, 5, 0).unwrap(),
            delivery,
        }
    }

    fn flat(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn own_messages_are_labelled_you() {
        let renderer = MessageRenderer::new("me");
        let text = flat(&renderer.lines(&RenderItem::Message(msg("me", DeliveryState::Sent))));
        assert!(text.starts_with("You"));
        assert!(text.contains("14:05"));
    }

    #[test]
    fn peer_messages_carry_name_and_presence() {
        let renderer = MessageRenderer::new("me");
        let text = flat(&renderer.lines(&RenderItem::Message(msg("anna", DeliveryState::Sent))));
        assert!(text.starts_with("Anna"));
        assert!(text.contains(theme::PRESENCE_DOT));
    }

    #[test]
    fn transient_delivery_states_render_a_status_line() {
        let renderer = MessageRenderer::new("me");
        let sending =
            flat(&renderer.lines(&RenderItem::Message(msg("me", DeliveryState::Sending))));
        assert!(sending.contains("… sending"));

        let failed = flat(&renderer.lines(&RenderItem::Message(msg("me", DeliveryState::Failed))));
        assert!(failed.contains("not delivered"));
    }

    #[test]
    fn divider_shows_the_calendar_date() {
        let date = chrono::NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let divider = DayDivider { id: crate::chat::divider_id(date), date };
        let text = flat(&divider_lines(&divider));
        assert!(text.contains("Monday"));
        assert!(text.contains("2025"));
    }

    #[test]
    fn typing_line_reads_naturally() {
        assert!(typing_line(&[], 0).is_none());
        let one = typing_line(&["Anna".to_owned()], 0).unwrap();
        assert!(flat(&[one]).contains("Anna is typing"));
        let two = typing_line(&["Anna".to_owned(), "Jonas".to_owned()], 3).unwrap();
        assert!(flat(&[two]).contains("Anna and Jonas are typing"));
    }
}

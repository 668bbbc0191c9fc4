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

use chrono::{DateTime, Local, NaiveDate};

/// Author descriptor attached to every message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub user_id: String,
    pub display_name: String,
    pub online: bool,
}

/// Transient delivery flag on a message. `Sending` and `Failed` only ever
/// appear on messages authored locally; everything from the feed is `Sent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    Sent,
    Sending,
    Failed,
}

/// One chat message as delivered by the feed. Read-only input to the chat
/// core — ordered by arrival, though not strictly monotonic across
/// pagination boundaries.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    pub sender: Sender,
    pub body: String,
    pub sent_at: DateTime<Local>,
    pub delivery: DeliveryState,
}

impl Message {
    pub fn new(chat_id: &str, sender: Sender, body: &str, sent_at: DateTime<Local>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            chat_id: chat_id.to_owned(),
            sender,
            body: body.to_owned(),
            sent_at,
            delivery: DeliveryState::Sent,
        }
    }
}

/// Synthetic separator inserted before the first message of a calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayDivider {
    pub id: String,
    pub date: NaiveDate,
}

/// One row of the render list: a message, or a divider between days.
#[derive(Debug, Clone)]
pub enum RenderItem {
    Message(Message),
    DayDivider(DayDivider),
}

impl RenderItem {
    /// Stable key for the height map and virtualization bookkeeping.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Message(m) => &m.id,
            Self::DayDivider(d) => &d.id,
        }
    }

    #[must_use]
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Self::Message(m) => Some(m),
            Self::DayDivider(_) => None,
        }
    }
}

/// Divider ids are derived from the calendar date alone, so repeated
/// `prepare` calls produce identical keys and cached heights stay valid.
#[must_use]
pub fn divider_id(date: NaiveDate) -> String {
    format!("day-{}", date.format("%Y-%m-%d"))
}

/// Build the render list: every message in order, with a day divider ahead
/// of each message that starts a new local calendar day. Pure — safe to
/// call on every reconciliation pass.
#[must_use]
pub fn prepare(messages: &[Message]) -> Vec<RenderItem> {
    let mut items = Vec::with_capacity(messages.len() + 4);
    let mut prev_date: Option<NaiveDate> = None;

    for msg in messages {
        let date = msg.sent_at.date_naive();
        if prev_date != Some(date) {
            items.push(RenderItem::DayDivider(DayDivider { id: divider_id(date), date }));
        }
        items.push(RenderItem::Message(msg.clone()));
        prev_date = Some(date);
    }

    items
}

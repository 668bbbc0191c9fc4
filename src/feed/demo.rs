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

use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::mpsc;

use super::{ChatSummary, FeedEvent, MessageFeed};
use crate::chat::{DeliveryState, Message, Sender};

const HISTORY_PAGE_SIZE: usize = 10;
const HISTORY_PAGES: u8 = 3;
const HISTORY_DELAY: Duration = Duration::from_millis(450);
const DELIVERY_DELAY: Duration = Duration::from_millis(350);
const TYPING_LEAD: Duration = Duration::from_secs(2);

/// Marketplace small talk for generated history, oldest first.
const HAGGLE: &[&str] = &[
    "Hi! Is this still available?",
    "Yes, it is.",
    "Would you take **100 €** for it?",
    "110 and it's yours.",
    "Deal. Can I pick it up this week?",
    "Sure — evenings work best for me.",
    "Does it come with the original receipt?",
    "I'd have to check, probably yes.",
    "Any scratches or damage I should know about?",
    "A few light marks, nothing structural.",
];

/// Peer lines pushed live while the app is open.
const SCRIPT: &[&str] = &[
    "Sorry for the late reply!",
    "Are you still interested?",
    "I could also drop it off if you're close to the station.",
    "Let me know until tomorrow, someone else asked too.",
];

struct DemoChat {
    summary: ChatSummary,
    peer: Sender,
    messages: Vec<Message>,
    loading: bool,
    pages_left: u8,
    typing: Vec<String>,
    /// Timestamp the next generated history page ends before.
    oldest: DateTime<Local>,
}

/// Feed backed by a deterministic script instead of a server: seeds two
/// conversations, pages out generated history on demand, acknowledges
/// sends, and plays back a handful of live peer messages with typing
/// notices. Every asynchronous effect goes through the event channel and
/// is folded back in by the app loop, like a real transport would.
pub struct DemoFeed {
    me: Sender,
    tx: mpsc::UnboundedSender<FeedEvent>,
    chats: Vec<DemoChat>,
}

impl DemoFeed {
    #[must_use]
    pub fn new(me_name: &str, tx: mpsc::UnboundedSender<FeedEvent>) -> Self {
        let me = Sender {
            user_id: "me".to_owned(),
            display_name: me_name.to_owned(),
            online: true,
        };
        let now = Local::now();
        let chats = vec![
            seed_chat(
                "chat-bike",
                Sender {
                    user_id: "anna".to_owned(),
                    display_name: "Anna".to_owned(),
                    online: true,
                },
                "City bike, 3-speed · 120 €",
                &me,
                now,
            ),
            seed_chat(
                "chat-shelf",
                Sender {
                    user_id: "jonas".to_owned(),
                    display_name: "Jonas".to_owned(),
                    online: false,
                },
                "Oak bookshelf · 40 €",
                &me,
                now - chrono::Duration::hours(3),
            ),
        ];
        Self { me, tx, chats }
    }

    /// Start the live part of the script: each chat gets a few delayed
    /// peer messages, preceded by a typing notice.
    pub fn spawn_script(&self) {
        for (chat_index, chat) in self.chats.iter().enumerate() {
            let tx = self.tx.clone();
            let chat_id = chat.summary.id.clone();
            let peer = chat.peer.clone();
            // Offset the two conversations so they don't fire in lockstep.
            let base = Duration::from_secs(8 + 11 * chat_index as u64);
            tokio::spawn(async move {
                for (i, body) in SCRIPT.iter().enumerate() {
                    tokio::time::sleep(base + Duration::from_secs(14 * i as u64)).await;
                    let started = tx.send(FeedEvent::TypingStarted {
                        chat_id: chat_id.clone(),
                        user: peer.display_name.clone(),
                    });
                    if started.is_err() {
                        return;
                    }
                    tokio::time::sleep(TYPING_LEAD).await;
                    let _ = tx.send(FeedEvent::TypingStopped {
                        chat_id: chat_id.clone(),
                        user: peer.display_name.clone(),
                    });
                    let message =
                        Message::new(&chat_id, peer.clone(), body, Local::now());
                    if tx
                        .send(FeedEvent::Incoming { chat_id: chat_id.clone(), message })
                        .is_err()
                    {
                        return;
                    }
                }
            });
        }
    }

    fn chat(&self, chat_id: &str) -> Option<&DemoChat> {
        self.chats.iter().find(|c| c.summary.id == chat_id)
    }

    fn chat_mut(&mut self, chat_id: &str) -> Option<&mut DemoChat> {
        self.chats.iter_mut().find(|c| c.summary.id == chat_id)
    }
}

impl MessageFeed for DemoFeed {
    fn chats(&self) -> Vec<ChatSummary> {
        self.chats.iter().map(|c| c.summary.clone()).collect()
    }

    fn messages(&self, chat_id: &str) -> &[Message] {
        self.chat(chat_id).map_or(&[], |c| &c.messages)
    }

    fn loading(&self, chat_id: &str) -> bool {
        self.chat(chat_id).is_some_and(|c| c.loading)
    }

    fn has_more(&self, chat_id: &str) -> bool {
        self.chat(chat_id).is_some_and(|c| c.pages_left > 0)
    }

    fn typing_users(&self, chat_id: &str) -> Vec<String> {
        self.chat(chat_id).map_or_else(Vec::new, |c| c.typing.clone())
    }

    fn send_message(&mut self, chat_id: &str, body: &str) {
        let me = self.me.clone();
        let tx = self.tx.clone();
        let Some(chat) = self.chat_mut(chat_id) else {
            return;
        };
        let mut message = Message::new(chat_id, me, body, Local::now());
        message.delivery = DeliveryState::Sending;
        let message_id = message.id.clone();
        chat.messages.push(message);

        let chat_id = chat_id.to_owned();
        tokio::spawn(async move {
            tokio::time::sleep(DELIVERY_DELAY).await;
            let _ = tx.send(FeedEvent::Delivered { chat_id, message_id, ok: true });
        });
    }

    fn send_typing_signal(&mut self, chat_id: &str) {
        // Nobody on the other side of a script cares, but a transport would
        // debounce and forward this.
        tracing::debug!(chat_id, "typing signal");
    }

    fn load_more_history(&mut self, chat_id: &str) {
        let tx = self.tx.clone();
        let me = self.me.clone();
        let Some(chat) = self.chat_mut(chat_id) else {
            return;
        };
        if chat.loading || chat.pages_left == 0 {
            return;
        }
        chat.loading = true;
        let older = older_page(chat, &me);
        let chat_id = chat_id.to_owned();
        tokio::spawn(async move {
            tokio::time::sleep(HISTORY_DELAY).await;
            let _ = tx.send(FeedEvent::HistoryLoaded { chat_id, older });
        });
    }

    fn apply_event(&mut self, event: FeedEvent) -> Option<String> {
        match event {
            FeedEvent::Incoming { chat_id, message } => {
                let chat = self.chat_mut(&chat_id)?;
                chat.typing.retain(|u| *u != message.sender.display_name);
                chat.messages.push(message);
                Some(chat_id)
            }
            FeedEvent::HistoryLoaded { chat_id, older } => {
                let chat = self.chat_mut(&chat_id)?;
                chat.loading = false;
                chat.pages_left = chat.pages_left.saturating_sub(1);
                chat.messages.splice(0..0, older);
                Some(chat_id)
            }
            FeedEvent::HistoryFailed { chat_id } => {
                let chat = self.chat_mut(&chat_id)?;
                chat.loading = false;
                tracing::warn!(chat_id, "history page failed to load");
                Some(chat_id)
            }
            FeedEvent::Delivered { chat_id, message_id, ok } => {
                let chat = self.chat_mut(&chat_id)?;
                let message = chat.messages.iter_mut().find(|m| m.id == message_id)?;
                message.delivery =
                    if ok { DeliveryState::Sent } else { DeliveryState::Failed };
                Some(chat_id)
            }
            FeedEvent::TypingStarted { chat_id, user } => {
                let chat = self.chat_mut(&chat_id)?;
                if !chat.typing.contains(&user) {
                    chat.typing.push(user);
                }
                Some(chat_id)
            }
            FeedEvent::TypingStopped { chat_id, user } => {
                let chat = self.chat_mut(&chat_id)?;
                chat.typing.retain(|u| *u != user);
                Some(chat_id)
            }
        }
    }
}

/// Recent tail of a conversation: last night's opener plus a reply from
/// today, so a fresh transcript already spans a day boundary.
fn seed_chat(
    chat_id: &str,
    peer: Sender,
    listing: &str,
    me: &Sender,
    now: DateTime<Local>,
) -> DemoChat {
    let yesterday = now - chrono::Duration::hours(20);
    let messages = vec![
        Message::new(chat_id, peer.clone(), HAGGLE[0], yesterday),
        Message::new(chat_id, me.clone(), HAGGLE[1], yesterday + chrono::Duration::minutes(9)),
        Message::new(chat_id, peer.clone(), HAGGLE[2], now - chrono::Duration::minutes(40)),
        Message::new(chat_id, me.clone(), HAGGLE[3], now - chrono::Duration::minutes(31)),
    ];
    let oldest = yesterday;
    DemoChat {
        summary: ChatSummary {
            id: chat_id.to_owned(),
            peer_name: peer.display_name.clone(),
            peer_online: peer.online,
            listing: listing.to_owned(),
        },
        peer,
        messages,
        loading: false,
        pages_left: HISTORY_PAGES,
        typing: Vec::new(),
        oldest,
    }
}

/// Generate one page of older history ending shortly before the oldest
/// known message, stepping far enough back that pages cross day
/// boundaries.
fn older_page(chat: &mut DemoChat, me: &Sender) -> Vec<Message> {
    let mut ts = chat.oldest - chrono::Duration::hours(1);
    let mut page = Vec::with_capacity(HISTORY_PAGE_SIZE);
    for i in 0..HISTORY_PAGE_SIZE {
        let body = HAGGLE[(HAGGLE.len() - 1 - i) % HAGGLE.len()];
        let sender = if i % 2 == 0 { chat.peer.clone() } else { me.clone() };
        page.push(Message::new(&chat.summary.id, sender, body, ts));
        ts -= chrono::Duration::minutes(171);
    }
    chat.oldest = ts;
    page.reverse();
    page
}

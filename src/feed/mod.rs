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

//! Message-source collaborator. The chat core never talks to a network;
//! it consumes whatever ordered message list a feed exposes and asks for
//! more history when the user scrolls to the top.

mod demo;

pub use demo::DemoFeed;

use crate::chat::Message;

/// One conversation as listed in the chat switcher.
#[derive(Debug, Clone)]
pub struct ChatSummary {
    pub id: String,
    pub peer_name: String,
    pub peer_online: bool,
    /// Listing the conversation is about, e.g. `City bike, 3-speed · 120 €`.
    pub listing: String,
}

/// Asynchronous happenings inside the feed, delivered to the app loop
/// over its event channel and folded back in via
/// [`MessageFeed::apply_event`].
#[derive(Debug)]
pub enum FeedEvent {
    /// A peer message arrived.
    Incoming { chat_id: String, message: Message },
    /// A requested history page is ready.
    HistoryLoaded { chat_id: String, older: Vec<Message> },
    /// A requested history page could not be fetched.
    HistoryFailed { chat_id: String },
    /// A locally sent message was acknowledged (or refused) upstream.
    Delivered { chat_id: String, message_id: String, ok: bool },
    TypingStarted { chat_id: String, user: String },
    TypingStopped { chat_id: String, user: String },
}

/// In-process contract between the app and whatever backs the messages.
pub trait MessageFeed {
    fn chats(&self) -> Vec<ChatSummary>;
    fn messages(&self, chat_id: &str) -> &[Message];
    fn loading(&self, chat_id: &str) -> bool;
    fn has_more(&self, chat_id: &str) -> bool;
    fn typing_users(&self, chat_id: &str) -> Vec<String>;
    fn send_message(&mut self, chat_id: &str, body: &str);
    fn send_typing_signal(&mut self, chat_id: &str);
    /// Ask for one more page of older history. Implementations must
    /// ignore the call while a load is already in flight or when no more
    /// history exists.
    fn load_more_history(&mut self, chat_id: &str);
    /// Fold an asynchronous event back into the feed state. Returns the
    /// id of the affected chat so the caller can re-sync that session.
    fn apply_event(&mut self, event: FeedEvent) -> Option<String>;
}

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

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("Conversation not found")]
    ChatNotFound,
    #[error("Chat feed disconnected")]
    FeedClosed,
}

impl AppError {
    pub const CHAT_NOT_FOUND_EXIT_CODE: i32 = 20;
    pub const FEED_CLOSED_EXIT_CODE: i32 = 21;

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ChatNotFound => Self::CHAT_NOT_FOUND_EXIT_CODE,
            Self::FeedClosed => Self::FEED_CLOSED_EXIT_CODE,
        }
    }

    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ChatNotFound => {
                "The requested conversation was not found. Run without --chat to open the first one."
            }
            Self::FeedClosed => "The chat feed closed its event stream.",
        }
    }
}

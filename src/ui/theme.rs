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

use ratatui::style::Color;

// Accent
pub const MARKET_TEAL: Color = Color::Rgb(0, 166, 147);

// UI chrome
pub const DIM: Color = Color::DarkGray;
pub const PROMPT_CHAR: &str = "❯";
pub const SEPARATOR_CHAR: &str = "─";

// Role header colors
pub const ROLE_SELF: Color = MARKET_TEAL;
pub const ROLE_PEER: Color = Color::White;

// Presence
pub const PRESENCE_ONLINE: Color = Color::Green;
pub const PRESENCE_DOT: &str = "●";

// Delivery state
pub const DELIVERY_PENDING: Color = Color::DarkGray;
pub const DELIVERY_FAILED: Color = Color::Red;

// Transcript extras
pub const UNREAD_BADGE: Color = Color::Yellow;
pub const DAY_DIVIDER: Color = Color::DarkGray;
pub const LOADING: Color = Color::Cyan;

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

pub const DEFAULT_BOTTOM_PROXIMITY_ROWS: usize = 2;
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 30;
pub const DEFAULT_FALLBACK_ROW_HEIGHT: u16 = 2;
pub const DEFAULT_INITIAL_SCROLL_GRACE_MS: u64 = 250;
pub const DEFAULT_TYPING_DEBOUNCE_MS: u64 = 1500;

/// Tunable timings and thresholds for one chat session.
///
/// Constructed once per session and passed down — never read from globals,
/// so tests can tighten the timings without racing each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatTuning {
    /// How close (in rows) to the scroll extent still counts as "at bottom".
    pub bottom_proximity_rows: usize,
    /// Pause before a measurement batch reads row counts, so deferred
    /// content has settled.
    pub settle_delay: Duration,
    /// Row height assumed for items that have not been measured yet or
    /// whose measurement failed.
    pub fallback_row_height: u16,
    /// How long to wait for the initial bottom snap to materialize before
    /// retrying it once.
    pub initial_scroll_grace: Duration,
    /// Minimum gap between two typing signals sent to the feed.
    pub typing_debounce: Duration,
}

impl Default for ChatTuning {
    fn default() -> Self {
        Self {
            bottom_proximity_rows: DEFAULT_BOTTOM_PROXIMITY_ROWS,
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            fallback_row_height: DEFAULT_FALLBACK_ROW_HEIGHT,
            initial_scroll_grace: Duration::from_millis(DEFAULT_INITIAL_SCROLL_GRACE_MS),
            typing_debounce: Duration::from_millis(DEFAULT_TYPING_DEBOUNCE_MS),
        }
    }
}

impl ChatTuning {
    /// Tuning with all delays collapsed, for deterministic tests.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            initial_scroll_grace: Duration::ZERO,
            typing_debounce: Duration::ZERO,
            ..Self::default()
        }
    }
}

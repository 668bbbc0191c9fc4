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

use super::item::{Message, RenderItem};

/// Result of a detected history prepend, anchored on the previously-first
/// message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrependShift {
    /// How many render-list indices the anchor moved down.
    pub shift: usize,
    /// The anchor's index in the current render list.
    pub old_first_new_index: usize,
}

/// Detect whether older history was prepended between two list snapshots.
///
/// The comparison is anchored on the id of the previous first message: a
/// prepend is reported only when that message is no longer first, still
/// exists in the current render list, and its index strictly increased.
/// Anything else — anchor gone, index unchanged or shrunk — is treated as
/// an unrelated reset and reported as `None`. Length deltas alone cannot
/// tell "ten older messages arrived" apart from "list truncated and
/// replaced", which is why the anchor id is required.
#[must_use]
pub fn detect(
    prev_messages: &[Message],
    prev_items: &[RenderItem],
    curr_messages: &[Message],
    curr_items: &[RenderItem],
) -> Option<PrependShift> {
    let anchor = prev_messages.first()?;
    let curr_first = curr_messages.first()?;
    if anchor.id == curr_first.id {
        return None;
    }

    let old_index = prev_items.iter().position(|item| item.id() == anchor.id)?;
    let new_index = curr_items.iter().position(|item| item.id() == anchor.id)?;
    if new_index <= old_index {
        return None;
    }

    Some(PrependShift { shift: new_index - old_index, old_first_new_index: new_index })
}

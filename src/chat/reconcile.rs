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

use std::time::Instant;

use super::tuning::ChatTuning;

/// Imperative scroll instruction handed to the viewport. Consumed once;
/// a later reconciliation pass overwrites anything still pending, except
/// that a prepend pass emits an offset shift and a smooth-scroll target
/// together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAdjustment {
    /// Align the last row with the viewport end.
    SnapToBottom,
    /// Add the given number of rows to the current offset, compensating
    /// for content inserted above the anchor.
    ShiftByOffset(usize),
    /// Animate until the given render-list row is centered.
    SmoothScrollToRow(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPhase {
    /// Nothing outstanding; scroll position belongs to the user.
    Idle,
    /// Fresh conversation — waiting for the first measured, non-empty
    /// render list before snapping to the newest message.
    AwaitingInitialScroll,
    /// An adjustment was emitted and has not been observed as applied yet.
    AdjustmentPending,
}

/// Per-conversation scroll policy: stick-to-bottom, prepend compensation,
/// the initial bottom snap, and the unread counter. Owns no geometry —
/// heights and offsets are fed in by the session and the viewport.
#[derive(Debug)]
pub struct ScrollReconciler {
    phase: ScrollPhase,
    at_bottom: bool,
    unread: usize,
    pending: Vec<ScrollAdjustment>,
    bottom_proximity_rows: usize,
    initial_scroll_grace: std::time::Duration,
    snap_deadline: Option<Instant>,
    snap_retried: bool,
}

impl ScrollReconciler {
    #[must_use]
    pub fn new(tuning: &ChatTuning) -> Self {
        Self {
            phase: ScrollPhase::AwaitingInitialScroll,
            at_bottom: true,
            unread: 0,
            pending: Vec::new(),
            bottom_proximity_rows: tuning.bottom_proximity_rows,
            initial_scroll_grace: tuning.initial_scroll_grace,
            snap_deadline: None,
            snap_retried: false,
        }
    }

    /// Back to the fresh-conversation state. Optimistically at bottom, as
    /// the initial snap will put us there.
    pub fn reset(&mut self) {
        self.phase = ScrollPhase::AwaitingInitialScroll;
        self.at_bottom = true;
        self.unread = 0;
        self.pending.clear();
        self.snap_deadline = None;
        self.snap_retried = false;
    }

    #[must_use]
    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    #[must_use]
    pub fn is_at_bottom(&self) -> bool {
        self.at_bottom
    }

    #[must_use]
    pub fn unread(&self) -> usize {
        self.unread
    }

    /// The first non-empty render list of the conversation has its heights
    /// resolved: snap to the newest message. Arms the grace-window retry in
    /// case the viewport has not committed layout yet.
    pub fn on_initial_list(&mut self, now: Instant) {
        if self.phase != ScrollPhase::AwaitingInitialScroll {
            return;
        }
        self.pending.clear();
        self.pending.push(ScrollAdjustment::SnapToBottom);
        self.phase = ScrollPhase::AdjustmentPending;
        self.snap_deadline = Some(now + self.initial_scroll_grace);
        self.snap_retried = false;
    }

    /// New messages arrived at the tail. `foreign` counts the appended
    /// messages not authored by the current user; `own` is true when the
    /// newest appended message is the user's.
    pub fn on_append(&mut self, foreign: usize, own: bool) {
        if self.phase == ScrollPhase::AwaitingInitialScroll {
            // The initial snap covers whatever arrives before it runs.
            return;
        }
        if self.at_bottom || own {
            self.pending.clear();
            self.pending.push(ScrollAdjustment::SnapToBottom);
            self.phase = ScrollPhase::AdjustmentPending;
            self.unread = 0;
        } else {
            self.unread += foreign;
        }
    }

    /// Older history landed above the anchor: shift by the added rows to
    /// keep the anchored content stationary, then drift to `preview_row`
    /// so the user sees what just loaded. A zero shift is suppressed.
    pub fn on_prepend(&mut self, added_rows: usize, preview_row: usize) {
        self.pending.clear();
        if added_rows > 0 {
            self.pending.push(ScrollAdjustment::ShiftByOffset(added_rows));
        }
        self.pending.push(ScrollAdjustment::SmoothScrollToRow(preview_row));
        self.phase = ScrollPhase::AdjustmentPending;
    }

    /// Viewport scroll observation. Keeps the stick-to-bottom flag and the
    /// unread counter current, and confirms any pending adjustment as
    /// applied. Returns true when the top edge of scrollable content was
    /// reached.
    pub fn on_scroll(&mut self, offset: usize, max_offset: usize) -> bool {
        self.at_bottom = max_offset.saturating_sub(offset) <= self.bottom_proximity_rows;
        if self.at_bottom {
            self.unread = 0;
        }
        if self.phase == ScrollPhase::AdjustmentPending {
            self.phase = ScrollPhase::Idle;
            self.snap_deadline = None;
        }
        offset == 0 && max_offset > 0
    }

    /// The visible window moved: once it starts covering unread rows, only
    /// the rows still below the window stay counted.
    pub fn on_rows_visible(&mut self, last_visible_index: usize, item_count: usize) {
        if self.unread == 0 || item_count == 0 {
            return;
        }
        let rows_below = item_count.saturating_sub(last_visible_index + 1);
        self.unread = self.unread.min(rows_below);
    }

    /// Retry the initial snap once if no scroll has materialized within the
    /// grace window — the viewport may not have been mounted when the snap
    /// was emitted.
    pub fn on_tick(&mut self, now: Instant) {
        if self.phase != ScrollPhase::AdjustmentPending {
            return;
        }
        let Some(deadline) = self.snap_deadline else {
            return;
        };
        if now < deadline {
            return;
        }
        if self.snap_retried {
            // Second miss: stop insisting, the user can still scroll.
            self.phase = ScrollPhase::Idle;
            self.snap_deadline = None;
            return;
        }
        tracing::debug!("initial bottom snap not observed within grace window, retrying");
        self.snap_retried = true;
        self.snap_deadline = Some(now + self.initial_scroll_grace);
        self.pending.clear();
        self.pending.push(ScrollAdjustment::SnapToBottom);
    }

    /// Drain pending adjustments for the viewport to apply before paint.
    pub fn take_pending(&mut self) -> Vec<ScrollAdjustment> {
        std::mem::take(&mut self.pending)
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

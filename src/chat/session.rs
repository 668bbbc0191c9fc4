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

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use super::item::{Message, RenderItem, prepare};
use super::measure::{HeightBatch, ItemRenderer, RowHeights};
use super::prepend;
use super::reconcile::{ScrollAdjustment, ScrollPhase, ScrollReconciler};
use super::tuning::ChatTuning;

/// A measurement batch the caller should run through
/// [`measure_heights`](super::measure::measure_heights) and feed back via
/// [`ChatSession::apply_heights`]. At most one request is outstanding per
/// session; further needs are queued internally until the result lands.
#[derive(Debug)]
pub struct MeasureRequest {
    pub generation: u64,
    pub items: Vec<RenderItem>,
    pub viewport_width: u16,
}

/// Side effect the session asks its owner to perform against the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    LoadMoreHistory,
}

/// How the latest message snapshot relates to the previous one.
#[derive(Debug)]
enum Mutation {
    Unchanged,
    Initial,
    Append { foreign: usize, own: bool },
    Prepend(PendingPrepend),
    Reset,
}

#[derive(Debug, Clone, Copy)]
struct PendingPrepend {
    old_first_new_index: usize,
    old_rows_before_anchor: usize,
    preview_row: usize,
}

/// Reconciliation deferred until every current item has a measured height.
#[derive(Debug, Clone, Copy)]
enum PendingReconcile {
    Initial,
    Prepend(PendingPrepend),
}

/// Per-conversation controller: owns the message snapshot, the render
/// list, the height map, and the scroll reconciler, and serializes height
/// measurement. Created on chat-open, discarded (or reset via
/// [`set_chat`](Self::set_chat)) on chat-close — nothing here is global.
pub struct ChatSession {
    chat_id: String,
    current_user_id: String,
    tuning: ChatTuning,
    renderer: Arc<dyn ItemRenderer>,
    messages: Vec<Message>,
    items: Vec<RenderItem>,
    heights: RowHeights,
    reconciler: ScrollReconciler,
    /// Bumped on chat switch and width change; stale measurement batches
    /// carry an older value and are dropped on arrival.
    generation: u64,
    measuring: bool,
    remeasure_queued: bool,
    pending: Option<PendingReconcile>,
    viewport_width: u16,
    /// True while a history load requested by us has not concluded.
    history_requested: bool,
}

impl ChatSession {
    #[must_use]
    pub fn new(
        chat_id: &str,
        current_user_id: &str,
        renderer: Arc<dyn ItemRenderer>,
        tuning: ChatTuning,
    ) -> Self {
        Self {
            chat_id: chat_id.to_owned(),
            current_user_id: current_user_id.to_owned(),
            tuning,
            renderer,
            messages: Vec::new(),
            items: Vec::new(),
            heights: HashMap::new(),
            reconciler: ScrollReconciler::new(&tuning),
            generation: 0,
            measuring: false,
            remeasure_queued: false,
            pending: None,
            viewport_width: 0,
            history_requested: false,
        }
    }

    #[must_use]
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    #[must_use]
    pub fn tuning(&self) -> ChatTuning {
        self.tuning
    }

    #[must_use]
    pub fn renderer(&self) -> Arc<dyn ItemRenderer> {
        Arc::clone(&self.renderer)
    }

    #[must_use]
    pub fn items(&self) -> &[RenderItem] {
        &self.items
    }

    #[must_use]
    pub fn unread(&self) -> usize {
        self.reconciler.unread()
    }

    #[must_use]
    pub fn is_at_bottom(&self) -> bool {
        self.reconciler.is_at_bottom()
    }

    #[must_use]
    pub fn scroll_phase(&self) -> ScrollPhase {
        self.reconciler.phase()
    }

    /// Height of one item, falling back to the configured default while
    /// its measurement is outstanding.
    #[must_use]
    pub fn height_of(&self, item_id: &str) -> u16 {
        self.heights.get(item_id).copied().unwrap_or(self.tuning.fallback_row_height)
    }

    #[must_use]
    pub fn height_of_index(&self, index: usize) -> u16 {
        self.items.get(index).map_or(self.tuning.fallback_row_height, |i| self.height_of(i.id()))
    }

    /// Summed heights of all items before `index`.
    #[must_use]
    pub fn rows_before(&self, index: usize) -> usize {
        self.items
            .iter()
            .take(index)
            .map(|item| usize::from(self.height_of(item.id())))
            .sum()
    }

    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.rows_before(self.items.len())
    }

    /// Switch to another conversation: drop everything owned by the old
    /// one and orphan any in-flight measurement.
    pub fn set_chat(&mut self, chat_id: &str) {
        if chat_id == self.chat_id {
            return;
        }
        self.chat_id = chat_id.to_owned();
        self.generation += 1;
        self.messages.clear();
        self.items.clear();
        self.heights.clear();
        self.measuring = false;
        self.remeasure_queued = false;
        self.pending = None;
        self.history_requested = false;
        self.reconciler.reset();
    }

    /// The viewport width changed: wrapped heights are void, re-measure
    /// the whole list. Keeps scroll state untouched.
    pub fn set_viewport_width(&mut self, width: u16, now: Instant) -> Option<MeasureRequest> {
        if width == self.viewport_width {
            return None;
        }
        self.viewport_width = width;
        if self.items.is_empty() {
            return None;
        }
        self.heights.clear();
        self.generation += 1;
        self.measuring = false;
        self.request_measurement(now)
    }

    /// Reconcile a fresh message snapshot from the feed. Classifies the
    /// mutation, rebuilds the render list, updates unread/scroll policy,
    /// and returns a measurement request when unmeasured items exist.
    pub fn apply_messages(
        &mut self,
        messages: &[Message],
        now: Instant,
    ) -> Option<MeasureRequest> {
        let new_items = prepare(messages);
        let mutation = self.classify(messages, &new_items);

        // In-place edits (delivery flips, body updates) invalidate the
        // cached height of just those ids.
        self.drop_heights_of_changed(messages);

        let list_changed = self.items.len() != new_items.len()
            || self.items.iter().zip(&new_items).any(|(a, b)| a.id() != b.id());

        self.messages = messages.to_vec();
        self.items = new_items;

        let present: std::collections::HashSet<&str> =
            self.items.iter().map(RenderItem::id).collect();
        self.heights.retain(|id, _| present.contains(id.as_str()));

        if list_changed {
            // Whatever load was in flight has concluded in this snapshot.
            self.history_requested = false;
        }

        match mutation {
            Mutation::Unchanged => {
                if self.items.iter().any(|i| !self.heights.contains_key(i.id())) {
                    self.request_measurement(now)
                } else {
                    None
                }
            }
            Mutation::Initial => {
                self.pending = Some(PendingReconcile::Initial);
                self.request_measurement(now)
            }
            Mutation::Append { foreign, own } => {
                self.reconciler.on_append(foreign, own);
                self.request_measurement(now)
            }
            Mutation::Prepend(p) => {
                self.pending = Some(PendingReconcile::Prepend(p));
                self.request_measurement(now)
            }
            Mutation::Reset => {
                // Unrelated replacement: rebuild quietly, no scroll opinion.
                self.pending = None;
                self.request_measurement(now)
            }
        }
    }

    /// Merge a measurement result. Batches from an older generation (chat
    /// switched or width changed since they started) are discarded without
    /// touching the height map or the scroll state.
    pub fn apply_heights(
        &mut self,
        batch: HeightBatch,
        now: Instant,
    ) -> Option<MeasureRequest> {
        if batch.generation != self.generation {
            tracing::debug!(
                batch_generation = batch.generation,
                current_generation = self.generation,
                "discarding stale height batch"
            );
            return None;
        }
        self.measuring = false;

        for (id, height) in batch.heights {
            if self.items.iter().any(|i| i.id() == id) {
                self.heights.insert(id, height);
            }
        }

        self.finish_reconcile(now);

        if self.remeasure_queued {
            self.remeasure_queued = false;
            return self.request_measurement(now);
        }
        None
    }

    /// Viewport scroll observation, plus the feed's paging state. Returns
    /// a history-load command when the top edge is hit, more history
    /// exists, and no load is already in flight. Suppressed while the
    /// initial snap or a prepend anchor is still unsettled — the viewport
    /// legitimately sits at the top then without the user asking for
    /// anything.
    pub fn observe_scroll(
        &mut self,
        offset: usize,
        max_offset: usize,
        has_more: bool,
        loading: bool,
    ) -> Option<SessionCommand> {
        let reached_top = self.reconciler.on_scroll(offset, max_offset);
        if reached_top
            && self.pending.is_none()
            && self.reconciler.phase() == ScrollPhase::Idle
            && has_more
            && !loading
            && !self.history_requested
        {
            self.history_requested = true;
            return Some(SessionCommand::LoadMoreHistory);
        }
        None
    }

    /// Last render-list index currently inside the visible window.
    pub fn observe_visible_rows(&mut self, last_visible_index: usize) {
        self.reconciler.on_rows_visible(last_visible_index, self.items.len());
    }

    /// Feed loading flag changed. A load that concluded without new
    /// messages (an errored fetch) releases the request latch so the user
    /// can try again; it must not look like loaded history.
    pub fn notify_loading(&mut self, loading: bool) {
        if !loading {
            self.history_requested = false;
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.reconciler.on_tick(now);
    }

    /// Drain scroll adjustments for the viewport. Callers apply these
    /// before the next paint; calling while the viewport is unmounted
    /// would drop them, so only drain from a mounted host.
    pub fn take_adjustments(&mut self) -> Vec<ScrollAdjustment> {
        self.reconciler.take_pending()
    }

    #[must_use]
    pub fn has_adjustments(&self) -> bool {
        self.reconciler.has_pending()
    }

    fn classify(&self, curr: &[Message], curr_items: &[RenderItem]) -> Mutation {
        if curr.is_empty() {
            return if self.messages.is_empty() { Mutation::Unchanged } else { Mutation::Reset };
        }
        if self.messages.is_empty() {
            return Mutation::Initial;
        }

        if let Some(shift) = prepend::detect(&self.messages, &self.items, curr, curr_items) {
            let old_index = shift.old_first_new_index - shift.shift;
            let old_rows_before_anchor = self.rows_before(old_index);
            return Mutation::Prepend(PendingPrepend {
                old_first_new_index: shift.old_first_new_index,
                old_rows_before_anchor,
                preview_row: preview_row(curr_items, shift.old_first_new_index),
            });
        }

        let same_first = curr[0].id == self.messages[0].id;
        if same_first && curr.len() > self.messages.len() {
            let appended = &curr[self.messages.len()..];
            let foreign = appended
                .iter()
                .filter(|m| m.sender.user_id != self.current_user_id)
                .count();
            let own = appended
                .last()
                .is_some_and(|m| m.sender.user_id == self.current_user_id);
            return Mutation::Append { foreign, own };
        }
        if same_first && curr.len() == self.messages.len() {
            return Mutation::Unchanged;
        }
        Mutation::Reset
    }

    fn drop_heights_of_changed(&mut self, curr: &[Message]) {
        let prev: HashMap<&str, (&str, super::item::DeliveryState)> =
            self.messages.iter().map(|m| (m.id.as_str(), (m.body.as_str(), m.delivery))).collect();
        for msg in curr {
            if let Some((body, delivery)) = prev.get(msg.id.as_str())
                && (*body != msg.body || *delivery != msg.delivery)
            {
                self.heights.remove(&msg.id);
            }
        }
    }

    fn request_measurement(&mut self, now: Instant) -> Option<MeasureRequest> {
        if self.measuring {
            self.remeasure_queued = true;
            return None;
        }
        let unmeasured: Vec<RenderItem> = self
            .items
            .iter()
            .filter(|i| !self.heights.contains_key(i.id()))
            .cloned()
            .collect();
        if unmeasured.is_empty() {
            self.finish_reconcile(now);
            return None;
        }
        self.measuring = true;
        Some(MeasureRequest {
            generation: self.generation,
            items: unmeasured,
            viewport_width: self.viewport_width,
        })
    }

    /// Run the deferred reconciliation once every current item has a
    /// resolved height; otherwise keep waiting for the queued batch.
    fn finish_reconcile(&mut self, now: Instant) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if self.items.iter().any(|i| !self.heights.contains_key(i.id())) {
            self.pending = Some(pending);
            return;
        }

        match pending {
            PendingReconcile::Initial => {
                if !self.items.is_empty() {
                    self.reconciler.on_initial_list(now);
                }
            }
            PendingReconcile::Prepend(p) => {
                let new_rows_before_anchor = self.rows_before(p.old_first_new_index);
                let added_rows =
                    new_rows_before_anchor.saturating_sub(p.old_rows_before_anchor);
                self.reconciler.on_prepend(added_rows, p.preview_row);
            }
        }
    }
}

/// Row the prepend pass smooth-scrolls to: the last prepended real
/// message, or failing that the item just above the old anchor.
fn preview_row(items: &[RenderItem], anchor_index: usize) -> usize {
    items[..anchor_index]
        .iter()
        .rposition(|item| item.as_message().is_some())
        .unwrap_or_else(|| anchor_index.saturating_sub(1))
}

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

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Text;
use ratatui::widgets::{Paragraph, Wrap};

use crate::chat::{ChatSession, ScrollAdjustment};

/// Where a targeted row should land inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

/// Windowed transcript host: renders only the rows intersecting the
/// visible area, maps render-list indices to measured row heights, and
/// owns the scroll offset including the smooth-scroll animation. Scroll
/// commands arriving before the first render (unmounted host) are
/// silently dropped — the reconciler's grace retry covers that window.
#[derive(Debug, Default)]
pub struct Viewport {
    /// Fractional scroll position, eased toward `target` each frame.
    pos: f32,
    /// Row offset requested by user input, adjustments, or auto-follow.
    target: usize,
    /// Effective offset after rounding, as drawn last frame.
    offset: usize,
    /// Keep the target pinned to the scroll extent as content grows —
    /// heights resolving after a bottom snap would otherwise leave the
    /// view a few rows short of the tail.
    follow_bottom: bool,
    mounted: bool,
    viewport_rows: usize,
    total_rows: usize,
    visible: Option<(usize, usize)>,
}

impl Viewport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all scroll state (conversation switch). Mount status is kept.
    pub fn reset(&mut self) {
        self.pos = 0.0;
        self.target = 0;
        self.offset = 0;
        self.follow_bottom = false;
        self.total_rows = 0;
        self.visible = None;
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn max_offset(&self) -> usize {
        self.total_rows.saturating_sub(self.viewport_rows)
    }

    /// Inclusive range of render-list indices intersecting the window, as
    /// of the last render.
    #[must_use]
    pub fn visible_items(&self) -> Option<(usize, usize)> {
        self.visible
    }

    /// Rows advanced by one page scroll.
    #[must_use]
    pub fn page_rows(&self) -> usize {
        self.viewport_rows.saturating_sub(1).max(1)
    }

    /// User-driven scroll by a signed row delta, animated. Scrolling back
    /// onto the extent re-engages bottom following; scrolling away pauses
    /// it.
    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.max_offset() as isize;
        let next = (self.target as isize).saturating_add(delta).clamp(0, max);
        self.target = next as usize;
        self.follow_bottom = next >= max;
    }

    /// Apply reconciler adjustments ahead of the next paint. Offset shifts
    /// and bottom snaps land instantly so anchored content never flickers;
    /// row targets ease over the following frames.
    pub fn apply(&mut self, session: &ChatSession, adjustments: &[ScrollAdjustment]) {
        if !self.mounted || adjustments.is_empty() {
            return;
        }
        let viewport_rows = self.viewport_rows.max(1);
        let max = session.total_rows().saturating_sub(viewport_rows);

        for adjustment in adjustments {
            match *adjustment {
                ScrollAdjustment::SnapToBottom => {
                    self.jump_to(max);
                    self.follow_bottom = true;
                }
                ScrollAdjustment::ShiftByOffset(rows) => {
                    self.jump_to((self.offset + rows).min(max));
                    self.follow_bottom = false;
                }
                ScrollAdjustment::SmoothScrollToRow(index) => {
                    self.scroll_to_row(session, index, Align::Center, ScrollBehavior::Smooth);
                }
            }
        }
    }

    /// Scroll so that row `index` lands at the given alignment.
    pub fn scroll_to_row(
        &mut self,
        session: &ChatSession,
        index: usize,
        align: Align,
        behavior: ScrollBehavior,
    ) {
        if !self.mounted {
            return;
        }
        let viewport_rows = self.viewport_rows.max(1);
        let max = session.total_rows().saturating_sub(viewport_rows);
        let row_top = session.rows_before(index);
        let row_height = usize::from(session.height_of_index(index));

        let raw = match align {
            Align::Start => row_top,
            Align::Center => row_top.saturating_sub(viewport_rows.saturating_sub(row_height) / 2),
            Align::End => (row_top + row_height).saturating_sub(viewport_rows),
        };
        let clamped = raw.min(max);
        self.follow_bottom = clamped >= max && max > 0;
        match behavior {
            ScrollBehavior::Instant => self.jump_to(clamped),
            ScrollBehavior::Smooth => self.target = clamped,
        }
    }

    fn jump_to(&mut self, offset: usize) {
        self.target = offset;
        self.pos = offset as f32;
        self.offset = offset;
    }

    /// Draw the window. Short content is bottom-aligned (it stacks up from
    /// the input box); long content scrolls, easing toward `target`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]
    pub fn render(&mut self, frame: &mut Frame, area: Rect, session: &ChatSession) {
        self.mounted = area.width > 0 && area.height > 0;
        if !self.mounted {
            self.visible = None;
            return;
        }
        self.viewport_rows = usize::from(area.height);
        self.total_rows = session.total_rows();

        if self.total_rows <= self.viewport_rows {
            self.render_bottom_aligned(frame, area, session);
            return;
        }

        let max_scroll = self.total_rows - self.viewport_rows;
        if self.follow_bottom {
            self.target = max_scroll;
        }
        self.target = self.target.min(max_scroll);

        // Ease toward the target over ~2-3 frames.
        let target = self.target as f32;
        let delta = target - self.pos;
        if delta.abs() < 0.01 {
            self.pos = target;
        } else {
            self.pos += delta * 0.5;
        }
        self.pos = self.pos.clamp(0.0, max_scroll as f32);
        self.offset = (self.pos.round() as usize).min(max_scroll);

        self.render_window(frame, area, session);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render_bottom_aligned(&mut self, frame: &mut Frame, area: Rect, session: &ChatSession) {
        self.pos = 0.0;
        self.target = 0;
        self.offset = 0;

        let items = session.items();
        if items.is_empty() {
            self.visible = None;
            return;
        }

        let mut y = area.y + (self.viewport_rows - self.total_rows) as u16;
        let renderer = session.renderer();
        for item in items {
            let height = session.height_of(item.id()).min(area.bottom().saturating_sub(y));
            if height == 0 {
                break;
            }
            let rect = Rect { x: area.x, y, width: area.width, height };
            let paragraph =
                Paragraph::new(Text::from(renderer.lines(item))).wrap(Wrap { trim: false });
            frame.render_widget(paragraph, rect);
            y += height;
        }
        self.visible = Some((0, items.len() - 1));
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render_window(&mut self, frame: &mut Frame, area: Rect, session: &ChatSession) {
        let renderer = session.renderer();
        let window_end = self.offset + self.viewport_rows;

        let mut item_top = 0usize;
        let mut first_visible = None;
        let mut last_visible = 0usize;

        for (index, item) in session.items().iter().enumerate() {
            let height = usize::from(session.height_of(item.id()));
            let item_bottom = item_top + height;
            if item_bottom <= self.offset {
                item_top = item_bottom;
                continue;
            }
            if item_top >= window_end {
                break;
            }

            // Rows of this item clipped away above the window.
            let skip = self.offset.saturating_sub(item_top);
            let screen_row = (item_top + skip) - self.offset;
            let draw_height = (height - skip).min(self.viewport_rows - screen_row);
            let rect = Rect {
                x: area.x,
                y: area.y + screen_row as u16,
                width: area.width,
                height: draw_height as u16,
            };
            let paragraph = Paragraph::new(Text::from(renderer.lines(item)))
                .wrap(Wrap { trim: false })
                .scroll((skip as u16, 0));
            frame.render_widget(paragraph, rect);

            if first_visible.is_none() {
                first_visible = Some(index);
            }
            last_visible = index;
            item_top = item_bottom;
        }

        self.visible = first_visible.map(|first| (first, last_visible));
    }
}

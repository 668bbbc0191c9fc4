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
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use ratatui::text::{Line, Text};
use ratatui::widgets::{Paragraph, Wrap};

use super::item::RenderItem;
use super::tuning::ChatTuning;

/// Presentation seam shared by the visible rows and the measurer, so a
/// measured height always matches what the row will actually occupy.
pub trait ItemRenderer: Send + Sync {
    /// Render one item to styled lines at logical (pre-wrap) granularity.
    fn lines(&self, item: &RenderItem) -> Vec<Line<'static>>;
}

pub type RowHeights = HashMap<String, u16>;

/// Result of one measurement batch, stamped with the session generation
/// that was current when the batch started. Stale generations are dropped
/// wholesale by the session.
#[derive(Debug)]
pub struct HeightBatch {
    pub generation: u64,
    pub heights: RowHeights,
}

/// Measure the wrapped row height of each item at the given viewport
/// width, off the visible frame.
///
/// Waits the configured settle delay once per batch before reading row
/// counts. Items whose rendering panics or measures to zero fall back to
/// the configured default height rather than failing the batch. An empty
/// batch resolves immediately without touching the timer. Everything used
/// here is scoped to this call — nothing survives on either the success or
/// the failure path.
///
/// Serialization (one batch in flight per session) is enforced by the
/// session, not here.
pub async fn measure_heights(
    renderer: Arc<dyn ItemRenderer>,
    items: Vec<RenderItem>,
    viewport_width: u16,
    generation: u64,
    tuning: ChatTuning,
) -> HeightBatch {
    let mut heights = RowHeights::with_capacity(items.len());
    if items.is_empty() {
        return HeightBatch { generation, heights };
    }

    tokio::time::sleep(tuning.settle_delay).await;

    for item in &items {
        let height =
            measure_one(renderer.as_ref(), item, viewport_width, tuning.fallback_row_height);
        heights.insert(item.id().to_owned(), height);
    }

    HeightBatch { generation, heights }
}

fn measure_one(renderer: &dyn ItemRenderer, item: &RenderItem, width: u16, fallback: u16) -> u16 {
    let lines = match panic::catch_unwind(AssertUnwindSafe(|| renderer.lines(item))) {
        Ok(lines) => lines,
        Err(_) => {
            tracing::warn!(
                item = item.id(),
                "item renderer panicked during measurement, using fallback height"
            );
            return fallback;
        }
    };
    if width == 0 {
        return fallback;
    }

    let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
    match u16::try_from(paragraph.line_count(width)) {
        Ok(0) => fallback,
        Ok(rows) => rows,
        Err(_) => u16::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::item::{DayDivider, divider_id};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use ratatui::text::Span;

    /// Renders `id` repeated once per line, `lines_per_item` lines.
    struct FixedRenderer {
        lines_per_item: usize,
    }

    impl ItemRenderer for FixedRenderer {
        fn lines(&self, item: &RenderItem) -> Vec<Line<'static>> {
            (0..self.lines_per_item)
                .map(|_| Line::from(Span::raw(item.id().to_owned())))
                .collect()
        }
    }

    struct PanickyRenderer;

    impl ItemRenderer for PanickyRenderer {
        fn lines(&self, _item: &RenderItem) -> Vec<Line<'static>> {
            panic!("renderer blew up")
        }
    }

    fn divider(day: u32) -> RenderItem {
        let date = NaiveDate::from_ymd_opt(2025, 3, day).unwrap();
        RenderItem::DayDivider(DayDivider { id: divider_id(date), date })
    }

    #[tokio::test]
    async fn empty_batch_resolves_immediately() {
        let batch = measure_heights(
            Arc::new(FixedRenderer { lines_per_item: 3 }),
            Vec::new(),
            80,
            7,
            ChatTuning::immediate(),
        )
        .await;
        assert_eq!(batch.generation, 7);
        assert!(batch.heights.is_empty());
    }

    #[tokio::test]
    async fn unchanged_input_measures_identically() {
        let items = vec![divider(3), divider(4)];
        let renderer = Arc::new(FixedRenderer { lines_per_item: 2 });
        let tuning = ChatTuning::immediate();

        let first = measure_heights(renderer.clone(), items.clone(), 40, 1, tuning).await;
        let second = measure_heights(renderer, items, 40, 2, tuning).await;
        assert_eq!(first.heights, second.heights);
        assert_eq!(first.heights.get("day-2025-03-03"), Some(&2));
    }

    #[tokio::test]
    async fn zero_height_items_fall_back() {
        let batch = measure_heights(
            Arc::new(FixedRenderer { lines_per_item: 0 }),
            vec![divider(3)],
            40,
            1,
            ChatTuning::immediate(),
        )
        .await;
        assert_eq!(
            batch.heights.get("day-2025-03-03"),
            Some(&ChatTuning::default().fallback_row_height)
        );
    }

    #[tokio::test]
    async fn renderer_panic_degrades_to_fallback() {
        let batch = measure_heights(
            Arc::new(PanickyRenderer),
            vec![divider(3), divider(4)],
            40,
            1,
            ChatTuning::immediate(),
        )
        .await;
        assert_eq!(batch.heights.len(), 2);
        assert!(
            batch
                .heights
                .values()
                .all(|h| *h == ChatTuning::default().fallback_row_height)
        );
    }

    #[tokio::test]
    async fn long_lines_wrap_into_extra_rows() {
        struct WideRenderer;
        impl ItemRenderer for WideRenderer {
            fn lines(&self, _item: &RenderItem) -> Vec<Line<'static>> {
                vec![Line::from(Span::raw("x".repeat(100)))]
            }
        }

        let batch = measure_heights(
            Arc::new(WideRenderer),
            vec![divider(3)],
            40,
            1,
            ChatTuning::immediate(),
        )
        .await;
        // 100 columns at width 40 wraps to 3 rows.
        assert_eq!(batch.heights.get("day-2025-03-03"), Some(&3));
    }
}

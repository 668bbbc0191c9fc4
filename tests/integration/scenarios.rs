// =====
// TESTS: 6
// =====
//
// End-to-end transcript scenarios through the real renderer and measurer:
// empty chat, multi-day initial load, prepend anchoring, measurement
// determinism.

use std::time::Instant;

use pretty_assertions::assert_eq;
use tradechat::chat::{Message, RenderItem, ScrollAdjustment, ScrollPhase, measure_heights};

use crate::helpers::{WIDTH, message, resolve, test_session};

#[tokio::test]
async fn empty_chat_renders_nothing_and_stays_quiet() {
    let mut session = test_session();
    let request = session.apply_messages(&[], Instant::now());
    assert!(request.is_none());
    assert!(session.items().is_empty());
    assert!(!session.has_adjustments());
    assert_eq!(session.scroll_phase(), ScrollPhase::AwaitingInitialScroll);
}

#[tokio::test]
async fn initial_two_day_load_builds_dividers_and_snaps_once() {
    let mut session = test_session();
    // 12 messages on day 3, 8 on day 4.
    let messages: Vec<Message> = (0..12)
        .map(|i| message(&format!("a{i}"), "anna", 3, i))
        .chain((0..8).map(|i| message(&format!("b{i}"), "anna", 4, i)))
        .collect();

    let request = session.apply_messages(&messages, Instant::now()).unwrap();
    assert_eq!(session.items().len(), 22, "20 messages + 2 dividers");
    let dividers = session
        .items()
        .iter()
        .filter(|i| matches!(i, RenderItem::DayDivider(_)))
        .count();
    assert_eq!(dividers, 2);

    // Nothing snaps until heights resolve.
    assert!(!session.has_adjustments());
    resolve(&mut session, request).await;
    assert_eq!(session.take_adjustments(), vec![ScrollAdjustment::SnapToBottom]);

    // Re-applying the identical snapshot is a no-op.
    let request = session.apply_messages(&messages, Instant::now());
    assert!(request.is_none());
    assert!(!session.has_adjustments());
}

#[tokio::test]
async fn measured_heights_cover_every_item_and_are_positive() {
    let mut session = test_session();
    let messages: Vec<Message> =
        (0..5).map(|i| message(&format!("a{i}"), "anna", 3, i)).collect();
    let request = session.apply_messages(&messages, Instant::now()).unwrap();
    resolve(&mut session, request).await;

    for item in session.items() {
        // A real message renders header + body + spacing; dividers two rows.
        assert!(session.height_of(item.id()) >= 2, "suspicious height for {}", item.id());
    }
}

#[tokio::test]
async fn measuring_twice_yields_identical_heights() {
    let session = test_session();
    let messages: Vec<Message> =
        (0..6).map(|i| message(&format!("a{i}"), "anna", 3, i)).collect();
    let items = tradechat::chat::prepare(&messages);

    let first = measure_heights(session.renderer(), items.clone(), WIDTH, 1, session.tuning())
        .await
        .heights;
    let second = measure_heights(session.renderer(), items, WIDTH, 2, session.tuning())
        .await
        .heights;
    assert_eq!(first, second);
}

#[tokio::test]
async fn prepended_history_shifts_by_its_measured_rows() {
    let mut session = test_session();
    let tail: Vec<Message> =
        (0..10).map(|i| message(&format!("a{i}"), "anna", 4, i)).collect();
    let request = session.apply_messages(&tail, Instant::now()).unwrap();
    resolve(&mut session, request).await;
    session.take_adjustments();
    // Viewport sits a little below the top, not at bottom.
    let _ = session.observe_scroll(4, session.total_rows(), false, false);

    // Five older messages from the previous day land above.
    let mut full: Vec<Message> =
        (0..5).map(|i| message(&format!("o{i}"), "anna", 3, i)).collect();
    full.extend(tail);
    let request = session.apply_messages(&full, Instant::now()).unwrap();
    assert!(!session.has_adjustments(), "prepend must wait for heights");
    resolve(&mut session, request).await;

    let anchor_index = session
        .items()
        .iter()
        .position(|i| i.id() == "a0")
        .unwrap();
    // Rows added above the anchor: everything before it now, minus the
    // still-present day divider that preceded it before.
    let old_divider_rows = usize::from(session.height_of("day-2025-03-04"));
    let expected_shift = session.rows_before(anchor_index) - old_divider_rows;

    let adjustments = session.take_adjustments();
    let last_prepended = session
        .items()
        .iter()
        .position(|i| i.id() == "o4")
        .unwrap();
    assert_eq!(
        adjustments,
        vec![
            ScrollAdjustment::ShiftByOffset(expected_shift),
            ScrollAdjustment::SmoothScrollToRow(last_prepended)
        ]
    );
}

#[tokio::test]
async fn truncated_and_replaced_list_is_not_treated_as_prepend() {
    let mut session = test_session();
    let before: Vec<Message> =
        (0..4).map(|i| message(&format!("a{i}"), "anna", 3, i)).collect();
    let request = session.apply_messages(&before, Instant::now()).unwrap();
    resolve(&mut session, request).await;
    session.take_adjustments();
    let _ = session.observe_scroll(2, session.total_rows(), false, false);

    let after: Vec<Message> =
        (0..3).map(|i| message(&format!("x{i}"), "anna", 3, i)).collect();
    let request = session.apply_messages(&after, Instant::now()).unwrap();
    resolve(&mut session, request).await;
    assert!(!session.has_adjustments(), "a reset must not emit scroll adjustments");
}

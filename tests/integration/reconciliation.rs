// =====
// TESTS: 5
// =====
//
// Stick-to-bottom and unread-count behavior across appends, plus the
// stale-measurement guard on conversation switches.

use std::time::Instant;

use pretty_assertions::assert_eq;
use tradechat::chat::{ChatTuning, Message, ScrollAdjustment, measure_heights};

use crate::helpers::{message, resolve, test_session};

async fn loaded_session(count: usize) -> (tradechat::chat::ChatSession, Vec<Message>) {
    let mut session = test_session();
    let messages: Vec<Message> =
        (0..count).map(|i| message(&format!("a{i}"), "anna", 3, i as u32)).collect();
    let request = session.apply_messages(&messages, Instant::now()).unwrap();
    resolve(&mut session, request).await;
    session.take_adjustments();
    (session, messages)
}

#[tokio::test]
async fn peer_append_at_bottom_snaps_and_stays_read() {
    let (mut session, mut messages) = loaded_session(6).await;
    let max = session.total_rows();
    let _ = session.observe_scroll(max, max, false, false);
    assert!(session.is_at_bottom());

    messages.push(message("a6", "anna", 3, 30));
    let request = session.apply_messages(&messages, Instant::now()).unwrap();
    assert_eq!(session.take_adjustments(), vec![ScrollAdjustment::SnapToBottom]);
    assert_eq!(session.unread(), 0);
    resolve(&mut session, request).await;
}

#[tokio::test]
async fn peer_append_while_scrolled_up_only_counts() {
    let (mut session, mut messages) = loaded_session(10).await;
    let _ = session.observe_scroll(0, session.total_rows(), false, false);
    assert!(!session.is_at_bottom());

    messages.push(message("a10", "anna", 3, 40));
    messages.push(message("a11", "anna", 3, 41));
    messages.push(message("a12", "anna", 3, 42));
    let request = session.apply_messages(&messages, Instant::now()).unwrap();
    assert!(!session.has_adjustments(), "no scroll while reading history");
    assert_eq!(session.unread(), 3);
    resolve(&mut session, request).await;
    assert!(!session.has_adjustments());
}

#[tokio::test]
async fn own_message_always_returns_to_bottom() {
    let (mut session, mut messages) = loaded_session(10).await;
    let _ = session.observe_scroll(0, session.total_rows(), false, false);

    messages.push(message("a10", "anna", 3, 40));
    let request = session.apply_messages(&messages, Instant::now()).unwrap();
    resolve(&mut session, request).await;
    assert_eq!(session.unread(), 1);

    messages.push(message("m0", "me", 3, 41));
    let request = session.apply_messages(&messages, Instant::now()).unwrap();
    assert_eq!(session.take_adjustments(), vec![ScrollAdjustment::SnapToBottom]);
    assert_eq!(session.unread(), 0);
    resolve(&mut session, request).await;
}

#[tokio::test]
async fn unread_shrinks_as_rows_scroll_into_view() {
    let (mut session, mut messages) = loaded_session(10).await;
    let _ = session.observe_scroll(0, session.total_rows(), false, false);

    for i in 0..4 {
        messages.push(message(&format!("n{i}"), "anna", 3, 50 + i));
    }
    let request = session.apply_messages(&messages, Instant::now()).unwrap();
    resolve(&mut session, request).await;
    assert_eq!(session.unread(), 4);

    let item_count = session.items().len();
    // Window end reaches two rows into the unread tail.
    session.observe_visible_rows(item_count - 3);
    assert_eq!(session.unread(), 2);

    // Bottom reached → everything read.
    let max = session.total_rows();
    let _ = session.observe_scroll(max, max, false, false);
    assert_eq!(session.unread(), 0);
}

#[tokio::test]
async fn measurement_finishing_after_chat_switch_is_discarded() {
    let mut session = test_session();
    let messages: Vec<Message> =
        (0..4).map(|i| message(&format!("a{i}"), "anna", 3, i)).collect();
    let request = session.apply_messages(&messages, Instant::now()).unwrap();

    // The batch is still "in flight" when the user switches chats.
    let batch = measure_heights(
        session.renderer(),
        request.items,
        request.viewport_width,
        request.generation,
        session.tuning(),
    )
    .await;
    session.set_chat("chat-2");
    let follow_up = session.apply_heights(batch, Instant::now());

    assert!(follow_up.is_none());
    assert!(!session.has_adjustments(), "stale batch must not scroll the new chat");
    assert_eq!(
        session.height_of("a0"),
        ChatTuning::default().fallback_row_height,
        "stale batch must not seed the new chat's height map"
    );
}

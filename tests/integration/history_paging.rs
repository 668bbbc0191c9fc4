// =====
// TESTS: 3
// =====
//
// History paging through the demo feed: single-flight loads triggered at
// the top edge, prepend anchoring once the page lands, and failed pages
// releasing the request latch.

use std::time::Instant;

use pretty_assertions::assert_eq;
use tokio::sync::mpsc;
use tradechat::chat::{ChatSession, ScrollAdjustment, SessionCommand};
use tradechat::feed::{DemoFeed, FeedEvent, MessageFeed};

use crate::helpers::{resolve, test_session};

const CHAT: &str = "chat-bike";

async fn synced(feed: &DemoFeed) -> ChatSession {
    let mut session = test_session();
    session.set_chat(CHAT);
    let request = session
        .apply_messages(&feed.messages(CHAT).to_vec(), Instant::now())
        .unwrap();
    resolve(&mut session, request).await;
    session.take_adjustments();
    session
}

#[tokio::test]
async fn top_edge_requests_one_page_and_anchors_the_prepend() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut feed = DemoFeed::new("Alex", tx);
    let mut session = synced(&feed).await;

    // Hit the top: exactly one load goes out.
    let max = session.total_rows();
    let command = session.observe_scroll(0, max, feed.has_more(CHAT), feed.loading(CHAT));
    assert_eq!(command, Some(SessionCommand::LoadMoreHistory));
    feed.load_more_history(CHAT);
    assert!(feed.loading(CHAT));

    // Top hit while loading must not fire again.
    let command = session.observe_scroll(0, max, feed.has_more(CHAT), feed.loading(CHAT));
    assert_eq!(command, None);

    // The page arrives; fold it in and reconcile.
    let event = rx.recv().await.unwrap();
    let anchor_id = feed.messages(CHAT)[0].id.clone();
    feed.apply_event(event);
    assert!(!feed.loading(CHAT));

    let request = session
        .apply_messages(&feed.messages(CHAT).to_vec(), Instant::now())
        .unwrap();
    assert!(!session.has_adjustments(), "anchoring waits for measured heights");
    resolve(&mut session, request).await;

    let adjustments = session.take_adjustments();
    assert_eq!(adjustments.len(), 2);
    let anchor_index =
        session.items().iter().position(|i| i.id() == anchor_id).unwrap();
    match adjustments[0] {
        ScrollAdjustment::ShiftByOffset(rows) => {
            assert!(rows > 0);
            assert!(rows < session.rows_before(anchor_index) + 1);
        }
        other => panic!("expected an offset shift, got {other:?}"),
    }
    match adjustments[1] {
        ScrollAdjustment::SmoothScrollToRow(row) => assert!(row < anchor_index),
        other => panic!("expected a smooth preview target, got {other:?}"),
    }
}

#[tokio::test]
async fn history_runs_dry_after_all_pages() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut feed = DemoFeed::new("Alex", tx);
    let mut session = synced(&feed).await;

    while feed.has_more(CHAT) {
        let max = session.total_rows();
        let command =
            session.observe_scroll(0, max, feed.has_more(CHAT), feed.loading(CHAT));
        assert_eq!(command, Some(SessionCommand::LoadMoreHistory));
        feed.load_more_history(CHAT);
        let event = rx.recv().await.unwrap();
        feed.apply_event(event);
        let request = session
            .apply_messages(&feed.messages(CHAT).to_vec(), Instant::now())
            .unwrap();
        resolve(&mut session, request).await;
        session.take_adjustments();
    }

    // Dry history: the top edge stays quiet.
    let max = session.total_rows();
    let command = session.observe_scroll(0, max, feed.has_more(CHAT), feed.loading(CHAT));
    assert_eq!(command, None);
}

#[tokio::test]
async fn failed_page_releases_the_latch_without_scrolling() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut feed = DemoFeed::new("Alex", tx);
    let mut session = synced(&feed).await;

    let max = session.total_rows();
    let command = session.observe_scroll(0, max, feed.has_more(CHAT), feed.loading(CHAT));
    assert_eq!(command, Some(SessionCommand::LoadMoreHistory));
    feed.load_more_history(CHAT);

    // The fetch errors out upstream: no new messages, loading ends.
    feed.apply_event(FeedEvent::HistoryFailed { chat_id: CHAT.to_owned() });
    assert!(!feed.loading(CHAT));
    let request = session.apply_messages(&feed.messages(CHAT).to_vec(), Instant::now());
    assert!(request.is_none(), "unchanged list needs no remeasure");
    assert!(!session.has_adjustments(), "a failed load must not scroll");
    session.notify_loading(feed.loading(CHAT));

    // The user can try again.
    assert!(feed.has_more(CHAT), "a failed load must not consume a page");
    let command = session.observe_scroll(0, max, feed.has_more(CHAT), feed.loading(CHAT));
    assert_eq!(command, Some(SessionCommand::LoadMoreHistory));
}

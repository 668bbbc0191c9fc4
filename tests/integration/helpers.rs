use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, TimeZone};
use tradechat::chat::{
    ChatSession, ChatTuning, DeliveryState, MeasureRequest, Message, Sender, measure_heights,
};
use tradechat::ui::MessageRenderer;

pub const WIDTH: u16 = 60;

/// Session wired to the real presentation renderer, with all delays
/// collapsed. No terminal, no feed — just the reconciliation core.
pub fn test_session() -> ChatSession {
    let mut session = ChatSession::new(
        "chat-1",
        "me",
        Arc::new(MessageRenderer::new("me")),
        ChatTuning::immediate(),
    );
    let request = session.set_viewport_width(WIDTH, Instant::now());
    assert!(request.is_none(), "empty session must not measure");
    session
}

pub fn sender(user_id: &str) -> Sender {
    Sender {
        user_id: user_id.to_owned(),
        display_name: user_id.to_owned(),
        online: true,
    }
}

/// Message with a fixed March 2025 timestamp, for deterministic dividers.
pub fn message(id: &str, author: &str, day: u32, minute: u32) -> Message {
    Message {
        id: id.to_owned(),
        chat_id: "chat-1".to_owned(),
        sender: sender(author),
        body: format!("message body {id}"),
        sent_at: Local.with_ymd_and_hms(2025, 3, day, 12, minute, 0).unwrap(),
        delivery: DeliveryState::Sent,
    }
}

/// Run a measurement request through the real measurer and feed the batch
/// back into the session.
pub async fn resolve(session: &mut ChatSession, request: MeasureRequest) {
    let batch = measure_heights(
        session.renderer(),
        request.items,
        request.viewport_width,
        request.generation,
        session.tuning(),
    )
    .await;
    let follow_up = session.apply_heights(batch, Instant::now());
    assert!(follow_up.is_none(), "helpers drive one batch at a time");
}

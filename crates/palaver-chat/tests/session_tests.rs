//! End-to-end session tests: a real `TransportClient` talking to a mock
//! axum backend, with typed and dictated input.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use palaver_chat::{render_transcript, Conversation, SubmitOutcome};
use palaver_core::{advisory, ContentBlock, Sender, SessionEvent, StructuredContent};
use palaver_transport::TransportClient;
use palaver_voice::{CaptureState, InputChannel, MockSpeechCapture};

// =============================================================================
// Helpers
// =============================================================================

async fn spawn_backend(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn session_against(router: Router, timeout: Duration) -> Conversation {
    let addr = spawn_backend(router).await;
    let client =
        TransportClient::with_endpoint(&format!("http://{}/chat", addr), timeout).unwrap();
    Conversation::new(Arc::new(client), advisory::GREETING)
}

fn fixed_reply(body: Value) -> Router {
    Router::new().route(
        "/chat",
        post(move || {
            let body = body.clone();
            async move { Json(body) }
        }),
    )
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_hello_scenario() {
    let convo = session_against(
        fixed_reply(json!({"reply": [{"type": "paragraph", "content": "hi there"}]})),
        Duration::from_secs(5),
    )
    .await;

    let before = convo.snapshot();
    assert_eq!(before.messages.len(), 1);
    assert_eq!(before.messages[0].sender(), Sender::Bot);
    assert!(!before.awaiting_reply);

    assert_eq!(convo.submit("hello").await, SubmitOutcome::Completed);

    let after = convo.snapshot();
    assert_eq!(after.messages.len(), 3);
    assert_eq!(
        after.messages[0].content(),
        Some(&StructuredContent::paragraph(advisory::GREETING))
    );
    assert_eq!(after.messages[1].text(), Some("hello"));
    assert_eq!(
        after.messages[2].content(),
        Some(&StructuredContent::new(vec![ContentBlock::Paragraph {
            content: "hi there".to_string()
        }]))
    );
    assert!(!after.awaiting_reply);
}

#[tokio::test]
async fn test_serialized_string_reply_renders_as_blocks() {
    let serialized = json!([
        {"type": "header", "content": "Schemes"},
        {"type": "section", "title": "Farmers", "items": [
            {"scheme": "PM-KISAN", "description": "Income support"}
        ]}
    ])
    .to_string();
    let convo = session_against(
        fixed_reply(json!({ "reply": serialized })),
        Duration::from_secs(5),
    )
    .await;

    convo.submit("schemes for farmers").await;

    let rendered = render_transcript(&convo.snapshot());
    assert!(rendered.contains("# Schemes"));
    assert!(rendered.contains("## Farmers"));
    assert!(rendered.contains("  • PM-KISAN: Income support"));
}

#[tokio::test]
async fn test_server_error_becomes_advisory_turn() {
    let router = Router::new().route(
        "/chat",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let convo = session_against(router, Duration::from_secs(5)).await;

    assert_eq!(convo.submit("hello").await, SubmitOutcome::Completed);

    let messages = convo.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(
        messages[2].content(),
        Some(&StructuredContent::paragraph(advisory::SERVER_ERROR))
    );
    assert!(!convo.is_awaiting_reply());
}

#[tokio::test]
async fn test_timeout_becomes_advisory_turn() {
    let router = Router::new().route(
        "/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"reply": "too late"}))
        }),
    );
    let convo = session_against(router, Duration::from_millis(200)).await;

    convo.submit("hello").await;

    assert_eq!(
        convo.messages()[2].content(),
        Some(&StructuredContent::paragraph(advisory::TIMEOUT))
    );
}

#[tokio::test]
async fn test_missing_reply_becomes_advisory_turn() {
    let convo = session_against(fixed_reply(json!({})), Duration::from_secs(5)).await;

    convo.submit("hello").await;

    assert_eq!(
        convo.messages()[2].content(),
        Some(&StructuredContent::paragraph(advisory::NO_REPLY))
    );
}

#[tokio::test]
async fn test_events_track_typing_indicator() {
    let convo = session_against(
        fixed_reply(json!({"reply": "ok"})),
        Duration::from_secs(5),
    )
    .await;
    let mut events = convo.subscribe();

    convo.submit("hello").await;

    let mut awaiting = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::AwaitingReplyChanged { awaiting: flag } = event {
            awaiting.push(flag);
        }
    }
    assert_eq!(awaiting, vec![true, false]);
}

// =============================================================================
// Dictated input
// =============================================================================

#[tokio::test]
async fn test_dictated_message_is_submitted() {
    let router = Router::new().route(
        "/chat",
        post(|Json(req): Json<Value>| async move {
            let heard = req["message"].as_str().unwrap_or_default().to_string();
            Json(json!({ "reply": format!("You said: {}", heard) }))
        }),
    );
    let convo = session_against(router, Duration::from_secs(5)).await;

    let engine = Arc::new(MockSpeechCapture::with_segments(["which schemes", "help farmers"]));
    let mut input = InputChannel::new(engine, "en-IN");

    input.start_capture().unwrap();
    let transcript = input.stop_capture().expect("transcript");
    assert_eq!(input.capture_state(), CaptureState::Idle);
    assert_eq!(input.current_draft(), "");

    convo.submit(&transcript).await;

    let messages = convo.messages();
    assert_eq!(messages[1].text(), Some("which schemes help farmers"));
    assert_eq!(
        messages[2].content(),
        Some(&StructuredContent::paragraph("You said: which schemes help farmers"))
    );
}

#[tokio::test]
async fn test_draft_typed_while_pending_waits_for_next_submit() {
    let router = Router::new().route(
        "/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Json(json!({"reply": "done"}))
        }),
    );
    let convo = Arc::new(session_against(router, Duration::from_secs(5)).await);
    let mut input = InputChannel::new(Arc::new(MockSpeechCapture::new()), "en-US");

    input.set_draft_from_typing("first");
    let pending = {
        let convo = Arc::clone(&convo);
        let text = input.take_draft();
        tokio::spawn(async move { convo.submit(&text).await })
    };

    // Wait until the exchange is in flight, then type the follow-up.
    while !convo.is_awaiting_reply() {
        tokio::task::yield_now().await;
    }
    input.set_draft_from_typing("second");
    assert_eq!(input.current_draft(), "second");

    assert_eq!(pending.await.unwrap(), SubmitOutcome::Completed);
    assert_eq!(convo.submit(&input.take_draft()).await, SubmitOutcome::Completed);

    let messages = convo.messages();
    let user_texts: Vec<&str> = messages.iter().filter_map(|m| m.text()).collect();
    assert_eq!(user_texts, vec!["first", "second"]);
    assert_eq!(messages.len(), 5);
}

//! HTTP-level webhook tests.
//!
//! Drives the axum router in-process: the verification handshake on GET
//! and the acknowledge-then-dispatch contract on POST, including the
//! guarantee that an unparsable body still gets the empty-object 200
//! acknowledgment.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tokio::sync::mpsc;
use tower::ServiceExt;

use pagebot::webhook::VERIFY_ERROR_BODY;
use pagebot::{BotEvent, EventBus, EventKind, WebhookDispatcher};

/// Router whose listeners forward every emitted event into a channel.
fn make_router() -> (axum::Router, mpsc::UnboundedReceiver<BotEvent>) {
    let events = Arc::new(EventBus::new());
    let (tx, rx) = mpsc::unbounded_channel();

    for kind in [
        EventKind::Echo,
        EventKind::QuickReply,
        EventKind::Message,
        EventKind::Postback,
        EventKind::Attachment,
        EventKind::Referral,
    ] {
        let tx = tx.clone();
        events.on(kind, move |e| {
            let _ = tx.send(e.clone());
        });
    }

    let dispatcher = WebhookDispatcher::new(Some("my_verify_token".to_string()), events);
    (pagebot::router(Arc::new(dispatcher)), rx)
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn verification_handshake_echoes_challenge() {
    let (router, _rx) = make_router();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/webhook?hub.mode=subscribe&hub.verify_token=my_verify_token&hub.challenge=challenge_123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "challenge_123");
}

#[tokio::test]
async fn verification_mismatch_never_echoes_challenge() {
    let (router, _rx) = make_router();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/webhook?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=challenge_123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(response).await;
    assert_eq!(body, VERIFY_ERROR_BODY);
    assert!(!body.contains("challenge_123"));
}

#[tokio::test]
async fn post_acks_with_empty_object_and_fires_message() {
    let (router, mut rx) = make_router();

    let payload = r#"{"entry":[{"messaging":[{"sender":{"id":"U2"},"message":{"text":"hello"}}]}]}"#;
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("content-type", "application/json")
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let ack: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(ack, serde_json::json!({}));

    let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("no event within timeout")
        .expect("event channel closed");
    match event {
        BotEvent::Message { sender_id, text } => {
            assert_eq!(sender_id, "U2");
            assert_eq!(text, "hello");
        }
        other => panic!("Expected Message, got {:?}", other),
    }

    // Exactly one event for this batch.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn unparsable_post_body_still_gets_acknowledged() {
    let (router, mut rx) = make_router();

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .body(Body::from("definitely not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    // The acknowledgment is unconditional; parsing happens afterwards
    // and its failure never reaches the remote caller.
    assert_eq!(response.status(), StatusCode::OK);
    let ack: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(ack, serde_json::json!({}));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
}

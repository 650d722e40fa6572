//! End-to-end WebSocket tests against a served router.

use futures_util::{SinkExt, StreamExt};
use integration_tests::TestServer;
use relay_common::HubSettings;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::Message;

async fn next_text(ws: &mut integration_tests::helpers::WsClient) -> String {
    loop {
        let msg = timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for a message")
            .expect("connection ended unexpectedly")
            .expect("websocket error");
        match msg {
            Message::Text(text) => return text,
            Message::Ping(_) | Message::Pong(_) => {}
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn health_endpoint_responds() {
    let server = TestServer::start().await.unwrap();

    let response = reqwest::get(server.http_url("/health")).await.unwrap();
    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn echo_returns_the_identical_value() {
    let server = TestServer::start().await.unwrap();
    let mut ws = server.connect("/ws/echo").await.unwrap();

    let sent = serde_json::json!({ "user": "a", "message": "hi" });
    ws.send(Message::Text(sent.to_string())).await.unwrap();

    let reply: serde_json::Value = serde_json::from_str(&next_text(&mut ws).await).unwrap();
    assert_eq!(reply, sent);

    ws.close(None).await.unwrap();
}

#[tokio::test]
async fn chat_broadcasts_to_everyone_but_the_sender() {
    let server = TestServer::start().await.unwrap();

    let mut sender = server.connect("/ws/chat").await.unwrap();
    let mut receiver_a = server.connect("/ws/chat").await.unwrap();
    let mut receiver_b = server.connect("/ws/chat").await.unwrap();

    // Give the server a moment to register all three connections.
    sleep(Duration::from_millis(100)).await;

    let sent = serde_json::json!({ "user": "A", "message": "hello" });
    sender.send(Message::Text(sent.to_string())).await.unwrap();

    let got_a: serde_json::Value = serde_json::from_str(&next_text(&mut receiver_a).await).unwrap();
    let got_b: serde_json::Value = serde_json::from_str(&next_text(&mut receiver_b).await).unwrap();
    assert_eq!(got_a, sent);
    assert_eq!(got_b, sent);

    // The sender does not receive its own message.
    let nothing = timeout(Duration::from_millis(200), sender.next()).await;
    assert!(nothing.is_err(), "sender received its own broadcast");
}

#[tokio::test]
async fn malformed_payload_closes_the_connection() {
    let server = TestServer::start().await.unwrap();
    let mut ws = server.connect("/ws/echo").await.unwrap();

    ws.send(Message::Text("this is not json".to_string()))
        .await
        .unwrap();

    // The server answers with a policy-violation close.
    let close = loop {
        match timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for close")
        {
            Some(Ok(Message::Close(frame))) => break frame,
            Some(Ok(_)) => {}
            Some(Err(_)) | None => break None,
        }
    };

    if let Some(frame) = close {
        assert_eq!(u16::from(frame.code), 1008);
    }
}

#[tokio::test]
async fn malformed_payload_is_skipped_when_configured() {
    let settings = HubSettings {
        read_buffer_size: 4096,
        close_on_decode_error: false,
        subprotocol: None,
    };
    let server = TestServer::start_with_settings(settings).await.unwrap();
    let mut ws = server.connect("/ws/echo").await.unwrap();

    ws.send(Message::Text("this is not json".to_string()))
        .await
        .unwrap();
    let valid = serde_json::json!({ "user": "a", "message": "still here" });
    ws.send(Message::Text(valid.to_string())).await.unwrap();

    // The connection survived the bad frame and echoes the valid one.
    let reply: serde_json::Value = serde_json::from_str(&next_text(&mut ws).await).unwrap();
    assert_eq!(reply, valid);

    ws.close(None).await.unwrap();
}

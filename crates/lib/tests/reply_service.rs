//! Integration test: run a stand-in reply service on a free port and drive the client and the
//! chat flow against it over real HTTP.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use yaddoo::chat::SERVICE_ERROR_PREFIX;
use yaddoo::chat_log::{Message, Role};
use yaddoo::reply::{ReplyClient, ReplyError, EMPTY_REPLY};
use yaddoo::transcript::BubbleStyle;
use yaddoo::{ChatController, NoView};

/// Replies depend on the message text so one server covers every case.
async fn chat(Json(body): Json<serde_json::Value>) -> Response {
    let message = body.get("message").and_then(|m| m.as_str()).unwrap_or("");
    let history_len = body
        .get("history")
        .and_then(|h| h.as_array())
        .map(|h| h.len())
        .unwrap_or(0);
    match message {
        "boom" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "boom" })),
        )
            .into_response(),
        "detail" => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "detail": "upstream" })),
        )
            .into_response(),
        "html" => (StatusCode::SERVICE_UNAVAILABLE, "<h1>down</h1>").into_response(),
        "silent" => Json(serde_json::json!({})).into_response(),
        _ => Json(serde_json::json!({
            "reply": format!("{} ({})", message, history_len)
        }))
        .into_response(),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true, "has_key": false }))
}

async fn start_service() -> String {
    let app = Router::new()
        .route("/api/chat", post(chat))
        .route("/health", get(health));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind free port");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn client_returns_reply_and_sends_history() {
    let base = start_service().await;
    let client = ReplyClient::new(base);
    let history = vec![
        Message::user("old"),
        Message::assistant("older"),
        Message::user("hello"),
    ];
    let reply = client.send("hello", &history).await.expect("reply");
    assert_eq!(reply, "hello (3)");
}

#[tokio::test]
async fn client_error_descriptions() {
    let base = start_service().await;
    let client = ReplyClient::new(base);

    let err = client.send("boom", &[]).await.unwrap_err();
    assert!(matches!(err, ReplyError::Service(ref s) if s == "boom"));

    let err = client.send("detail", &[]).await.unwrap_err();
    assert_eq!(err.to_string(), r#"{"detail":"upstream"}"#);

    let err = client.send("html", &[]).await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP 503");
}

#[tokio::test]
async fn client_placeholder_for_missing_reply() {
    let base = start_service().await;
    let client = ReplyClient::new(base);
    assert_eq!(client.send("silent", &[]).await.unwrap(), EMPTY_REPLY);
}

#[tokio::test]
async fn health_returns_service_json() {
    let base = start_service().await;
    let client = ReplyClient::new(base);
    let json = client.health().await.expect("health");
    assert_eq!(json.get("ok").and_then(|v| v.as_bool()), Some(true));
}

#[tokio::test]
async fn chat_flow_success_then_failure() {
    let base = start_service().await;
    let client = ReplyClient::new(base);
    let mut chat = ChatController::new();

    assert!(chat.send(&client, "مرحبا", &mut NoView).await);
    assert_eq!(chat.log().len(), 2);
    assert_eq!(chat.log().messages()[1], Message::assistant("مرحبا (1)"));
    assert_eq!(chat.transcript().len(), 2);

    assert!(chat.send(&client, "boom", &mut NoView).await);
    // The user message is kept, the error is display-only.
    assert_eq!(chat.log().len(), 3);
    assert_eq!(chat.log().messages()[2].role, Role::User);
    assert_eq!(chat.transcript().len(), 4);
    let last = chat.transcript().last().unwrap();
    assert_eq!(last.style, BubbleStyle::Error);
    assert_eq!(last.text, format!("{}boom", SERVICE_ERROR_PREFIX));

    // Next request carries the failed user message but not the error text.
    assert!(chat.send(&client, "again", &mut NoView).await);
    assert_eq!(chat.log().messages()[4], Message::assistant("again (4)"));
}

#[tokio::test]
async fn unreachable_service_becomes_error_bubble() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
        listener.local_addr().expect("local_addr").port()
    };
    let client = ReplyClient::new(format!("http://127.0.0.1:{}", port));
    let mut chat = ChatController::new();
    assert!(chat.send(&client, "hi", &mut NoView).await);

    assert_eq!(chat.log().len(), 1);
    let last = chat.transcript().last().unwrap();
    assert_eq!(last.style, BubbleStyle::Error);
    assert!(last.text.starts_with(SERVICE_ERROR_PREFIX));
    assert!(!chat.is_sending());
}

//! Router tests driven through `tower::ServiceExt::oneshot`

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chatlink::{
    ChatLink, ChatLinkConfig, Error, InMemoryStore, MemoryNotifier, Notifier, OutboundMessage,
};
use chatlink_axum::{RelayRouterBuilder, WEBHOOK_SECRET_HEADER};
use chatlink_core::error::NotificationError;
use chrono::Duration;
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestRelay {
    app: Router,
    chatlink: Arc<ChatLink<InMemoryStore, Arc<MemoryNotifier>>>,
    notifier: Arc<MemoryNotifier>,
}

type Routes = RelayRouterBuilder<InMemoryStore, Arc<MemoryNotifier>>;

fn relay_with(ttl: Duration, configure: impl FnOnce(Routes) -> Routes) -> TestRelay {
    let notifier = Arc::new(MemoryNotifier::new());
    let config = ChatLinkConfig::new("s3cr3t")
        .and_then(|config| config.with_ttl(ttl))
        .unwrap();
    let chatlink = Arc::new(ChatLink::new(InMemoryStore::new(), notifier.clone(), config));
    let app = configure(chatlink_axum::routes(chatlink.clone())).build();
    TestRelay {
        app,
        chatlink,
        notifier,
    }
}

fn relay() -> TestRelay {
    relay_with(Duration::minutes(10), |routes| routes)
}

fn update(chat_id: i64, text: &str) -> Value {
    json!({
        "update_id": 1,
        "message": {
            "message_id": 10,
            "chat": { "id": chat_id, "type": "private" },
            "text": text
        }
    })
}

fn webhook_request(path: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_issue_then_lookup() {
    let relay = relay();

    let (status, body) = send(
        &relay.app,
        webhook_request("/webhook", update(42, "/start abc123").to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let sent = relay.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].markdown);
    assert!(sent[0].text.contains("`F5C79495`"));

    let (status, body) = send_json(&relay.app, get("/get-chat-id?codigo=f5c79495")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chat_id"], json!(42));

    let record = relay.chatlink.resolve(Some("F5C79495")).await.unwrap();
    assert_eq!(
        body["timestamp"].as_i64().unwrap(),
        record.issued_at.timestamp_millis()
    );
}

#[tokio::test]
async fn test_lookup_is_repeatable() {
    let relay = relay();
    send(
        &relay.app,
        webhook_request("/webhook", update(7, "/start xyz789").to_string()),
    )
    .await;

    let (first_status, first) = send_json(&relay.app, get("/get-chat-id?codigo=6B775D64")).await;
    let (second_status, second) = send_json(&relay.app, get("/get-chat-id?codigo=6B775D64")).await;
    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_start_without_code_sends_usage() {
    let relay = relay();

    let (status, _) = send(
        &relay.app,
        webhook_request("/webhook", update(42, "/start").to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let sent = relay.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(!sent[0].markdown);
    assert!(sent[0].text.contains("/start"));

    let (status, _) = send_json(&relay.app, get("/get-chat-id?codigo=F5C79495")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_command_and_empty_updates_are_ignored() {
    let relay = relay();

    let (status, _) = send(
        &relay.app,
        webhook_request("/webhook", update(42, "hola").to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &relay.app,
        webhook_request("/webhook", json!({ "update_id": 2 }).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &relay.app,
        webhook_request(
            "/webhook",
            json!({ "update_id": 3, "message": { "chat": { "id": 42 } } }).to_string(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert!(relay.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_lookup_without_code_is_bad_request() {
    let relay = relay();

    let (status, body) = send_json(&relay.app, get("/get-chat-id")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!(400));
    assert!(body["error"].as_str().unwrap().contains("codigo"));

    let (status, _) = send_json(&relay.app, get("/get-chat-id?codigo=")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_query_keeps_json_error_body() {
    let relay = relay();

    let (status, body) = send_json(&relay.app, get("/get-chat-id?codigo=a&codigo=b")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!(400));
    assert!(body["error"].as_str().unwrap().contains("codigo"));
}

#[tokio::test]
async fn test_lookup_unknown_code_is_not_found() {
    let relay = relay();

    let (status, body) = send_json(&relay.app, get("/get-chat-id?codigo=00000000")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], json!(404));
}

#[tokio::test]
async fn test_lookup_after_expiry_is_not_found() {
    let relay = relay_with(Duration::milliseconds(20), |routes| routes);
    send(
        &relay.app,
        webhook_request("/webhook", update(42, "/start abc123").to_string()),
    )
    .await;

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let (status, _) = send_json(&relay.app, get("/get-chat-id?codigo=F5C79495")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unmatched_routes_answer_ok() {
    let relay = relay();

    for request in [
        get("/"),
        get("/health"),
        get("/webhook"),
        Request::builder()
            .method(Method::DELETE)
            .uri("/get-chat-id")
            .body(Body::empty())
            .unwrap(),
    ] {
        let response = relay.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"OK");
    }
}

#[tokio::test]
async fn test_malformed_update_is_internal_error() {
    let relay = relay();

    let (status, body) = send_json(&relay.app, webhook_request("/webhook", "{not json")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], json!(500));
    assert!(relay.notifier.sent().is_empty());
}

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _message: OutboundMessage) -> Result<(), Error> {
        Err(NotificationError::Delivery("connection reset".to_string()).into())
    }
}

#[tokio::test]
async fn test_notifier_failure_is_internal_error() {
    let config = ChatLinkConfig::new("s3cr3t").unwrap();
    let chatlink = Arc::new(ChatLink::new(InMemoryStore::new(), FailingNotifier, config));
    let app = chatlink_axum::routes(chatlink).build();

    let (status, body) = send_json(
        &app,
        webhook_request("/webhook", update(42, "/start abc123").to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("Internal server error"));
}

#[tokio::test]
async fn test_webhook_secret_is_enforced() {
    let relay = relay_with(Duration::minutes(10), |routes| {
        routes.with_webhook_secret("telegram-secret")
    });

    let (status, body) = send_json(
        &relay.app,
        webhook_request("/webhook", update(42, "/start abc123").to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], json!(401));

    let mut wrong = webhook_request("/webhook", update(42, "/start abc123").to_string());
    wrong
        .headers_mut()
        .insert(WEBHOOK_SECRET_HEADER, "guess".parse().unwrap());
    let (status, _) = send(&relay.app, wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(relay.notifier.sent().is_empty());

    let mut right = webhook_request("/webhook", update(42, "/start abc123").to_string());
    right
        .headers_mut()
        .insert(WEBHOOK_SECRET_HEADER, "telegram-secret".parse().unwrap());
    let (status, _) = send(&relay.app, right).await;
    assert_eq!(status, StatusCode::OK);

    // Lookups are not guarded by the webhook secret.
    let (status, _) = send_json(&relay.app, get("/get-chat-id?codigo=F5C79495")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_custom_webhook_path() {
    let relay = relay_with(Duration::minutes(10), |routes| {
        routes.with_webhook_path("hooks/telegram")
    });

    let (status, _) = send(
        &relay.app,
        webhook_request("/hooks/telegram", update(42, "/start abc123").to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(relay.notifier.sent().len(), 1);

    // The default path is now just an unmatched route.
    let (status, body) = send(
        &relay.app,
        webhook_request("/webhook", update(42, "/start abc123").to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
    assert_eq!(relay.notifier.sent().len(), 1);
}

// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use chanvault_config::model::ChanvaultConfig;
use chanvault_engine::Engine;
use chanvault_storage::Repository;
use chanvault_test_utils::{MemoryStore, MockGateway};
use chanvault_webhook::{HealthState, WebhookState, router};

const PATH: &str = "/webhook";

struct Setup {
    state: WebhookState,
    store: Arc<MemoryStore>,
    gateway: Arc<MockGateway>,
}

fn setup(secret: Option<&str>, render: Option<Arc<dyn Fn() -> String + Send + Sync>>) -> Setup {
    let store = Arc::new(MemoryStore::new());
    let gateway = Arc::new(MockGateway::new());
    let engine = Engine::new(store.clone(), gateway.clone(), &ChanvaultConfig::default());
    Setup {
        state: WebhookState {
            engine,
            secret_token: secret.map(str::to_string),
            health: HealthState::new(render),
        },
        store,
        gateway,
    }
}

fn post(body: &str, secret: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(PATH)
        .header("content-type", "application/json");
    if let Some(secret) = secret {
        builder = builder.header("x-telegram-bot-api-secret-token", secret);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn channel_post_json(message_id: i64, text: &str) -> String {
    serde_json::json!({
        "update_id": 10,
        "channel_post": {
            "message_id": message_id,
            "date": 1700000000i64,
            "chat": {"id": -100123i64, "type": "channel", "title": "News"},
            "text": text
        }
    })
    .to_string()
}

#[tokio::test]
async fn channel_post_is_recorded() {
    let s = setup(None, None);
    let app = router(s.state, PATH);

    let response = app.oneshot(post(&channel_post_json(7, "hello"), None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let repo = Repository::new(s.store);
    let entry = repo.get_backup("-100123", 7).await.unwrap().unwrap();
    assert_eq!(entry.text.as_deref(), Some("hello"));
    assert!(entry.auto_backup);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let s = setup(None, None);
    let response = router(s.state, PATH)
        .oneshot(post("{not json", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(s.store.put_count(), 0);
}

#[tokio::test]
async fn secret_token_is_enforced() {
    let s = setup(Some("s3cret"), None);
    let app = router(s.state, PATH);
    let body = channel_post_json(1, "x");

    let missing = app.clone().oneshot(post(&body, None)).await.unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let wrong = app.clone().oneshot(post(&body, Some("nope"))).await.unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(s.store.put_count(), 0);

    let right = app.oneshot(post(&body, Some("s3cret"))).await.unwrap();
    assert_eq!(right.status(), StatusCode::OK);
}

#[tokio::test]
async fn unsupported_updates_are_acknowledged() {
    let s = setup(None, None);
    let body = serde_json::json!({
        "update_id": 11,
        "message": {
            "message_id": 1,
            "date": 1700000000i64,
            "chat": {"id": -555i64, "type": "supergroup", "title": "Chat"},
            "from": {"id": 42, "is_bot": false, "first_name": "Op"},
            "text": "/start"
        }
    })
    .to_string();

    let response = router(s.state, PATH).oneshot(post(&body, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(s.gateway.calls().await.is_empty());
}

#[tokio::test]
async fn private_command_gets_a_reply() {
    let s = setup(None, None);
    let body = serde_json::json!({
        "update_id": 12,
        "message": {
            "message_id": 3,
            "date": 1700000000i64,
            "chat": {"id": 42, "type": "private", "first_name": "Op"},
            "from": {"id": 42, "is_bot": false, "first_name": "Op"},
            "text": "/help"
        }
    })
    .to_string();

    let response = router(s.state, PATH).oneshot(post(&body, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let replies = s.gateway.texts_sent_to("42").await;
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("/addchannel"));
}

#[tokio::test]
async fn health_reports_version() {
    let s = setup(None, None);
    let response = router(s.state, PATH)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["uptime_secs"].is_u64());
}

#[tokio::test]
async fn metrics_route_depends_on_exporter() {
    let disabled = setup(None, None);
    let response = router(disabled.state, PATH)
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let render: Arc<dyn Fn() -> String + Send + Sync> =
        Arc::new(|| "chanvault_probes_total 3\n".to_string());
    let enabled = setup(None, Some(render));
    let response = router(enabled.state, PATH)
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    assert_eq!(&body[..], b"chanvault_probes_total 3\n");
}

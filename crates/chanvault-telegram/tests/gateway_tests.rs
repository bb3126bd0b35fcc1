// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway behavior against a mocked Bot API.

use chanvault_config::model::BotConfig;
use chanvault_core::types::InlineButton;
use chanvault_core::{ChannelGateway, ChanvaultError, ContentKind, MessageContent};
use chanvault_telegram::TelegramGateway;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(server: &MockServer) -> TelegramGateway {
    TelegramGateway::new(&BotConfig {
        token: Some("TEST".into()),
        api_url: server.uri(),
        request_timeout_secs: 5,
    })
    .unwrap()
}

fn ok(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": result }))
}

fn rejected(description: &str) -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(json!({
        "ok": false,
        "error_code": 400,
        "description": description,
    }))
}

#[tokio::test]
async fn send_text_returns_message_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTEST/sendMessage"))
        .and(body_partial_json(json!({ "chat_id": -100, "text": "hi" })))
        .respond_with(ok(json!({
            "message_id": 12,
            "date": 1700000000,
            "chat": { "id": -100, "type": "channel", "title": "T" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = gateway(&server).send_text("-100", "hi").await.unwrap();
    assert_eq!(id, 12);
}

#[tokio::test]
async fn ok_false_is_a_gateway_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTEST/forwardMessage"))
        .respond_with(rejected("Bad Request: message to forward not found"))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .forward_message("-100", "-100", 999)
        .await
        .unwrap_err();
    match err {
        ChanvaultError::Gateway {
            method,
            description,
            ..
        } => {
            assert_eq!(method, "forwardMessage");
            assert!(description.contains("not found"));
        }
        other => panic!("expected gateway error, got {other:?}"),
    }
}

#[tokio::test]
async fn forward_returns_copy_with_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTEST/forwardMessage"))
        .and(body_partial_json(json!({ "chat_id": -100, "from_chat_id": -100, "message_id": 50 })))
        .respond_with(ok(json!({
            "message_id": 51,
            "date": 1700000100,
            "chat": { "id": -100, "type": "channel", "title": "T" },
            "text": "original words",
            "forward_origin": {
                "type": "channel",
                "chat": { "id": -100, "type": "channel", "title": "T" },
                "message_id": 50,
                "date": 1690000000
            }
        })))
        .mount(&server)
        .await;

    let copy = gateway(&server)
        .forward_message("-100", "-100", 50)
        .await
        .unwrap();
    assert_eq!(copy.message_id, 51);
    assert_eq!(copy.text.as_deref(), Some("original words"));
    assert_eq!(copy.origin.unwrap().date, 1_690_000_000);
}

#[tokio::test]
async fn media_is_sent_by_handle_with_caption() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTEST/sendPhoto"))
        .and(body_partial_json(json!({ "photo": "AgAD-photo", "caption": "sunset" })))
        .respond_with(ok(json!({
            "message_id": 3,
            "date": 1700000000,
            "chat": { "id": -200, "type": "channel", "title": "Dest" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let content = MessageContent::Media {
        kind: ContentKind::Photo,
        file_id: "AgAD-photo".into(),
    };
    let id = gateway(&server)
        .send_content("-200", &content, Some("sunset"))
        .await
        .unwrap();
    assert_eq!(id, 3);
}

#[tokio::test]
async fn not_modified_edit_is_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTEST/editMessageText"))
        .respond_with(rejected(
            "Bad Request: message is not modified: specified new message content and reply markup are exactly the same",
        ))
        .mount(&server)
        .await;

    gateway(&server)
        .edit_message_text("42", 7, "same text")
        .await
        .unwrap();
}

#[tokio::test]
async fn get_chat_resolves_handle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTEST/getChat"))
        .and(body_partial_json(json!({ "chat_id": "@news" })))
        .respond_with(ok(json!({
            "id": -100555,
            "type": "channel",
            "title": "News",
            "username": "news"
        })))
        .mount(&server)
        .await;

    let chat = gateway(&server).get_chat("@news").await.unwrap();
    assert_eq!(chat.id, "-100555");
    assert!(chat.is_channel());
    assert_eq!(chat.display_title(), "News");
}

#[tokio::test]
async fn keyboard_rows_have_one_button_each() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTEST/sendMessage"))
        .and(body_partial_json(json!({
            "reply_markup": { "inline_keyboard": [
                [{ "text": "News", "callback_data": "restore:-100" }],
                [{ "text": "Blog", "callback_data": "restore:-200" }]
            ]}
        })))
        .respond_with(ok(json!({
            "message_id": 8,
            "date": 1700000000,
            "chat": { "id": 42, "type": "private", "first_name": "Op" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let buttons = [
        InlineButton {
            text: "News".into(),
            data: "restore:-100".into(),
        },
        InlineButton {
            text: "Blog".into(),
            data: "restore:-200".into(),
        },
    ];
    gateway(&server)
        .send_keyboard("42", "Pick a source", &buttons)
        .await
        .unwrap();
}

#[tokio::test]
async fn undecodable_body_is_a_gateway_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTEST/deleteMessage"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let err = gateway(&server).delete_message("-100", 5).await.unwrap_err();
    assert!(matches!(err, ChanvaultError::Gateway { .. }));
    assert!(!err.to_string().contains("TEST"));
}

#[tokio::test]
async fn set_webhook_sends_secret_and_update_kinds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTEST/setWebhook"))
        .and(body_partial_json(json!({
            "url": "https://example.org/webhook",
            "secret_token": "s3cret",
            "allowed_updates": ["message", "channel_post", "callback_query"]
        })))
        .respond_with(ok(json!(true)))
        .expect(1)
        .mount(&server)
        .await;

    gateway(&server)
        .set_webhook("https://example.org/webhook", Some("s3cret"))
        .await
        .unwrap();
}

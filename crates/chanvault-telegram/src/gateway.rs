// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`ChannelGateway`] over the Bot API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use teloxide::types::Message;
use tracing::{debug, info};

use chanvault_config::model::BotConfig;
use chanvault_core::types::{ChatInfo, InlineButton};
use chanvault_core::{ChannelGateway, ChannelPost, ChanvaultError, ContentKind, MessageContent};

use crate::api::BotApi;
use crate::handler;

/// Update kinds the webhook subscribes to.
const ALLOWED_UPDATES: [&str; 3] = ["message", "channel_post", "callback_query"];

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

#[derive(Debug, Deserialize)]
struct RawChat {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
    title: Option<String>,
    username: Option<String>,
}

/// Identity of the bot account, from `getMe`.
#[derive(Debug, Clone, Deserialize)]
pub struct BotIdentity {
    pub id: i64,
    pub username: Option<String>,
}

/// Chat references are sent as integers when numeric, otherwise as `@handle`
/// strings.
fn chat_ref(chat: &str) -> Value {
    match chat.trim().parse::<i64>() {
        Ok(id) => json!(id),
        Err(_) => json!(chat.trim()),
    }
}

/// Send method and payload field for a media kind.
fn media_method(kind: ContentKind) -> (&'static str, &'static str) {
    match kind {
        ContentKind::Photo => ("sendPhoto", "photo"),
        ContentKind::Video => ("sendVideo", "video"),
        ContentKind::Document => ("sendDocument", "document"),
        ContentKind::Audio => ("sendAudio", "audio"),
        ContentKind::Animation => ("sendAnimation", "animation"),
        ContentKind::Sticker => ("sendSticker", "sticker"),
        ContentKind::Voice => ("sendVoice", "voice"),
        ContentKind::VideoNote => ("sendVideoNote", "video_note"),
        ContentKind::Text => ("sendMessage", "text"),
    }
}

/// Whether the platform accepts a caption alongside this kind.
fn takes_caption(kind: ContentKind) -> bool {
    !matches!(kind, ContentKind::Sticker | ContentKind::VideoNote)
}

/// Bot API gateway.
#[derive(Debug, Clone)]
pub struct TelegramGateway {
    api: BotApi,
}

impl TelegramGateway {
    pub fn new(config: &BotConfig) -> Result<Self, ChanvaultError> {
        Ok(Self {
            api: BotApi::new(config)?,
        })
    }

    pub fn from_api(api: BotApi) -> Self {
        Self { api }
    }

    pub async fn get_me(&self) -> Result<BotIdentity, ChanvaultError> {
        self.api.call("getMe", &json!({})).await
    }

    /// Registers `url` as the webhook endpoint.
    pub async fn set_webhook(
        &self,
        url: &str,
        secret_token: Option<&str>,
    ) -> Result<(), ChanvaultError> {
        let mut body = json!({ "url": url, "allowed_updates": ALLOWED_UPDATES });
        if let Some(secret) = secret_token {
            body["secret_token"] = json!(secret);
        }
        let _: bool = self.api.call("setWebhook", &body).await?;
        info!(url, "webhook registered");
        Ok(())
    }

    pub async fn delete_webhook(&self) -> Result<(), ChanvaultError> {
        let _: bool = self.api.call("deleteWebhook", &json!({})).await?;
        info!("webhook removed");
        Ok(())
    }

    async fn send(&self, method: &str, body: Value) -> Result<i64, ChanvaultError> {
        let sent: SentMessage = self.api.call(method, &body).await?;
        Ok(sent.message_id)
    }
}

#[async_trait]
impl ChannelGateway for TelegramGateway {
    async fn send_text(&self, chat: &str, text: &str) -> Result<i64, ChanvaultError> {
        self.send("sendMessage", json!({ "chat_id": chat_ref(chat), "text": text }))
            .await
    }

    async fn send_keyboard(
        &self,
        chat: &str,
        text: &str,
        buttons: &[InlineButton],
    ) -> Result<i64, ChanvaultError> {
        let rows: Vec<Value> = buttons
            .iter()
            .map(|b| json!([{ "text": b.text, "callback_data": b.data }]))
            .collect();
        self.send(
            "sendMessage",
            json!({
                "chat_id": chat_ref(chat),
                "text": text,
                "reply_markup": { "inline_keyboard": rows },
            }),
        )
        .await
    }

    async fn send_content(
        &self,
        chat: &str,
        content: &MessageContent,
        caption: Option<&str>,
    ) -> Result<i64, ChanvaultError> {
        match content {
            MessageContent::Text(text) => self.send_text(chat, text).await,
            MessageContent::Media { kind, file_id } => {
                let (method, field) = media_method(*kind);
                let mut body = json!({ "chat_id": chat_ref(chat), field: file_id });
                if let Some(caption) = caption.filter(|c| !c.is_empty())
                    && takes_caption(*kind)
                {
                    body["caption"] = json!(caption);
                }
                self.send(method, body).await
            }
        }
    }

    async fn forward_message(
        &self,
        to: &str,
        from: &str,
        message_id: i64,
    ) -> Result<ChannelPost, ChanvaultError> {
        let raw: Value = self
            .api
            .call(
                "forwardMessage",
                &json!({
                    "chat_id": chat_ref(to),
                    "from_chat_id": chat_ref(from),
                    "message_id": message_id,
                }),
            )
            .await?;

        // The copy exists at this point; an unfamiliar message shape must not
        // hide it from the caller, who still has to delete it.
        match serde_json::from_value::<Message>(raw.clone()) {
            Ok(msg) => Ok(handler::to_post(&msg)),
            Err(e) => {
                debug!(error = %e, "forwarded message not fully decodable");
                let id = raw
                    .get("message_id")
                    .and_then(Value::as_i64)
                    .ok_or_else(|| ChanvaultError::gateway("forwardMessage", "result without message_id"))?;
                Ok(ChannelPost {
                    chat_id: to.to_string(),
                    message_id: id,
                    date: raw.get("date").and_then(Value::as_i64).unwrap_or_default(),
                    ..ChannelPost::default()
                })
            }
        }
    }

    async fn copy_message(
        &self,
        to: &str,
        from: &str,
        message_id: i64,
    ) -> Result<i64, ChanvaultError> {
        self.send(
            "copyMessage",
            json!({
                "chat_id": chat_ref(to),
                "from_chat_id": chat_ref(from),
                "message_id": message_id,
            }),
        )
        .await
    }

    async fn delete_message(&self, chat: &str, message_id: i64) -> Result<(), ChanvaultError> {
        let _: bool = self
            .api
            .call(
                "deleteMessage",
                &json!({ "chat_id": chat_ref(chat), "message_id": message_id }),
            )
            .await?;
        Ok(())
    }

    async fn get_chat(&self, chat: &str) -> Result<ChatInfo, ChanvaultError> {
        let raw: RawChat = self
            .api
            .call("getChat", &json!({ "chat_id": chat_ref(chat) }))
            .await?;
        Ok(ChatInfo {
            id: raw.id.to_string(),
            title: raw.title,
            username: raw.username,
            kind: raw.kind,
        })
    }

    async fn edit_message_text(
        &self,
        chat: &str,
        message_id: i64,
        text: &str,
    ) -> Result<(), ChanvaultError> {
        let result: Result<Value, _> = self
            .api
            .call(
                "editMessageText",
                &json!({ "chat_id": chat_ref(chat), "message_id": message_id, "text": text }),
            )
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_modified() => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn answer_callback_query(
        &self,
        callback_id: &str,
        text: Option<&str>,
    ) -> Result<(), ChanvaultError> {
        let mut body = json!({ "callback_query_id": callback_id });
        if let Some(text) = text {
            body["text"] = json!(text);
        }
        let _: bool = self.api.call("answerCallbackQuery", &body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_chats_are_sent_as_integers() {
        assert_eq!(chat_ref("-100123"), json!(-100123));
        assert_eq!(chat_ref("@news"), json!("@news"));
    }

    #[test]
    fn every_media_kind_has_a_send_method() {
        for kind in ContentKind::PRIORITY {
            let (method, field) = media_method(kind);
            assert!(method.starts_with("send"));
            assert!(!field.is_empty());
        }
        assert_eq!(media_method(ContentKind::VideoNote), ("sendVideoNote", "video_note"));
    }

    #[test]
    fn stickers_take_no_caption() {
        assert!(!takes_caption(ContentKind::Sticker));
        assert!(takes_caption(ContentKind::Photo));
    }
}

// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat platform for deterministic testing.
//!
//! `MockGateway` keeps an in-memory copy of every chat's messages so probes
//! really create and delete forwarded copies, records every call for
//! assertions, and lets tests script failures.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use chanvault_core::types::{ChatInfo, ForwardOrigin, InlineButton};
use chanvault_core::{ChannelGateway, ChannelPost, ChanvaultError, MessageContent};

/// One recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    SendText {
        chat: String,
        text: String,
    },
    SendKeyboard {
        chat: String,
        text: String,
        buttons: Vec<InlineButton>,
    },
    SendContent {
        chat: String,
        content: MessageContent,
        caption: Option<String>,
    },
    Forward {
        to: String,
        from: String,
        message_id: i64,
    },
    Copy {
        to: String,
        from: String,
        message_id: i64,
    },
    Delete {
        chat: String,
        message_id: i64,
    },
    GetChat {
        chat: String,
    },
    Edit {
        chat: String,
        message_id: i64,
        text: String,
    },
    AnswerCallback {
        id: String,
        text: Option<String>,
    },
}

#[derive(Default)]
struct State {
    chats: HashMap<String, ChatInfo>,
    messages: HashMap<String, BTreeMap<i64, ChannelPost>>,
    calls: Vec<GatewayCall>,
    failing_texts: HashSet<String>,
    fail_forwards: bool,
    fail_deletes: bool,
}

impl State {
    fn insert(&mut self, mut post: ChannelPost) -> i64 {
        let messages = self.messages.entry(post.chat_id.clone()).or_default();
        let id = messages.keys().next_back().copied().unwrap_or(0) + 1;
        post.message_id = id;
        messages.insert(id, post);
        id
    }

    fn insert_text(&mut self, chat: &str, text: &str) -> i64 {
        self.insert(ChannelPost {
            chat_id: chat.to_string(),
            text: Some(text.to_string()),
            ..ChannelPost::default()
        })
    }

    fn lookup(&self, chat: &str) -> Option<&ChatInfo> {
        let handle = chat.strip_prefix('@');
        self.chats.values().find(|info| {
            info.id == chat
                || matches!((handle, &info.username), (Some(h), Some(u)) if u.eq_ignore_ascii_case(h))
        })
    }
}

#[derive(Default)]
pub struct MockGateway {
    state: Mutex<State>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `chat_id` resolvable through `get_chat` as a channel.
    pub async fn add_channel(&self, chat_id: &str, title: &str, username: Option<&str>) {
        self.state.lock().await.chats.insert(
            chat_id.to_string(),
            ChatInfo {
                id: chat_id.to_string(),
                title: Some(title.to_string()),
                username: username.map(str::to_string),
                kind: "channel".to_string(),
            },
        );
    }

    /// Makes `chat_id` resolvable as a group, which is not a valid target.
    pub async fn add_group(&self, chat_id: &str, title: &str) {
        self.state.lock().await.chats.insert(
            chat_id.to_string(),
            ChatInfo {
                id: chat_id.to_string(),
                title: Some(title.to_string()),
                username: None,
                kind: "supergroup".to_string(),
            },
        );
    }

    /// Places an existing message in its chat at its own id.
    pub async fn seed_post(&self, post: ChannelPost) {
        self.state
            .lock()
            .await
            .messages
            .entry(post.chat_id.clone())
            .or_default()
            .insert(post.message_id, post);
    }

    pub async fn seed_text(&self, chat: &str, message_id: i64, text: &str) {
        self.seed_post(ChannelPost {
            chat_id: chat.to_string(),
            message_id,
            date: 1_700_000_000 + message_id,
            text: Some(text.to_string()),
            ..ChannelPost::default()
        })
        .await;
    }

    /// Sends whose text equals `text` fail.
    pub async fn fail_sends_with_text(&self, text: &str) {
        self.state.lock().await.failing_texts.insert(text.to_string());
    }

    pub async fn fail_forwards(&self, fail: bool) {
        self.state.lock().await.fail_forwards = fail;
    }

    pub async fn fail_deletes(&self, fail: bool) {
        self.state.lock().await.fail_deletes = fail;
    }

    pub async fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().await.calls.clone()
    }

    /// Ids of messages currently present in `chat`, ascending.
    pub async fn message_ids(&self, chat: &str) -> Vec<i64> {
        self.state
            .lock()
            .await
            .messages
            .get(chat)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Texts of messages currently present in `chat`, in id order.
    pub async fn delivered_texts(&self, chat: &str) -> Vec<String> {
        self.state
            .lock()
            .await
            .messages
            .get(chat)
            .map(|m| m.values().filter_map(|p| p.text.clone()).collect())
            .unwrap_or_default()
    }

    pub async fn forward_count(&self) -> usize {
        self.calls()
            .await
            .iter()
            .filter(|c| matches!(c, GatewayCall::Forward { .. }))
            .count()
    }

    /// Ids probed by forwarding, in call order.
    pub async fn forwarded_ids(&self) -> Vec<i64> {
        self.calls()
            .await
            .iter()
            .filter_map(|c| match c {
                GatewayCall::Forward { message_id, .. } => Some(*message_id),
                _ => None,
            })
            .collect()
    }

    /// Content delivered to `chat` through `send_content`, in call order.
    pub async fn contents_sent_to(&self, chat: &str) -> Vec<MessageContent> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|c| match c {
                GatewayCall::SendContent {
                    chat: to, content, ..
                } if to == chat => Some(content),
                _ => None,
            })
            .collect()
    }

    /// Operator-facing texts sent to `chat` (plain and keyboard messages).
    pub async fn texts_sent_to(&self, chat: &str) -> Vec<String> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|c| match c {
                GatewayCall::SendText { chat: to, text }
                | GatewayCall::SendKeyboard { chat: to, text, .. }
                    if to == chat =>
                {
                    Some(text)
                }
                _ => None,
            })
            .collect()
    }

    /// Texts applied by `edit_message_text` in `chat`, in call order.
    pub async fn edits_in(&self, chat: &str) -> Vec<String> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|c| match c {
                GatewayCall::Edit { chat: to, text, .. } if to == chat => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Every text the operator can currently read in `chat`: sends followed
    /// by edits.
    pub async fn transcript(&self, chat: &str) -> Vec<String> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|c| match c {
                GatewayCall::SendText { chat: to, text }
                | GatewayCall::SendKeyboard { chat: to, text, .. }
                | GatewayCall::Edit { chat: to, text, .. }
                    if to == chat =>
                {
                    Some(text)
                }
                _ => None,
            })
            .collect()
    }
}

fn not_found(method: &str, what: &str) -> ChanvaultError {
    ChanvaultError::gateway(method, format!("Bad Request: {what} not found"))
}

#[async_trait]
impl ChannelGateway for MockGateway {
    async fn send_text(&self, chat: &str, text: &str) -> Result<i64, ChanvaultError> {
        let mut state = self.state.lock().await;
        state.calls.push(GatewayCall::SendText {
            chat: chat.to_string(),
            text: text.to_string(),
        });
        if state.failing_texts.contains(text) {
            return Err(ChanvaultError::gateway("sendMessage", "Forbidden: scripted failure"));
        }
        Ok(state.insert_text(chat, text))
    }

    async fn send_keyboard(
        &self,
        chat: &str,
        text: &str,
        buttons: &[InlineButton],
    ) -> Result<i64, ChanvaultError> {
        let mut state = self.state.lock().await;
        state.calls.push(GatewayCall::SendKeyboard {
            chat: chat.to_string(),
            text: text.to_string(),
            buttons: buttons.to_vec(),
        });
        Ok(state.insert_text(chat, text))
    }

    async fn send_content(
        &self,
        chat: &str,
        content: &MessageContent,
        caption: Option<&str>,
    ) -> Result<i64, ChanvaultError> {
        let mut state = self.state.lock().await;
        state.calls.push(GatewayCall::SendContent {
            chat: chat.to_string(),
            content: content.clone(),
            caption: caption.map(str::to_string),
        });
        match content {
            MessageContent::Text(text) if state.failing_texts.contains(text) => Err(
                ChanvaultError::gateway("sendMessage", "Forbidden: scripted failure"),
            ),
            MessageContent::Text(text) => Ok(state.insert_text(chat, text)),
            MessageContent::Media { .. } => Ok(state.insert(ChannelPost {
                chat_id: chat.to_string(),
                caption: caption.map(str::to_string),
                ..ChannelPost::default()
            })),
        }
    }

    async fn forward_message(
        &self,
        to: &str,
        from: &str,
        message_id: i64,
    ) -> Result<ChannelPost, ChanvaultError> {
        let mut state = self.state.lock().await;
        state.calls.push(GatewayCall::Forward {
            to: to.to_string(),
            from: from.to_string(),
            message_id,
        });
        if state.fail_forwards {
            return Err(not_found("forwardMessage", "message to forward"));
        }
        let original = state
            .messages
            .get(from)
            .and_then(|m| m.get(&message_id))
            .cloned()
            .ok_or_else(|| not_found("forwardMessage", "message to forward"))?;

        let mut copy = ChannelPost {
            chat_id: to.to_string(),
            origin: Some(ForwardOrigin {
                chat_id: from.to_string(),
                message_id,
                date: original.date,
            }),
            ..original
        };
        copy.message_id = state.insert(copy.clone());
        Ok(copy)
    }

    async fn copy_message(
        &self,
        to: &str,
        from: &str,
        message_id: i64,
    ) -> Result<i64, ChanvaultError> {
        let mut state = self.state.lock().await;
        state.calls.push(GatewayCall::Copy {
            to: to.to_string(),
            from: from.to_string(),
            message_id,
        });
        let original = state
            .messages
            .get(from)
            .and_then(|m| m.get(&message_id))
            .cloned()
            .ok_or_else(|| not_found("copyMessage", "message to copy"))?;
        Ok(state.insert(ChannelPost {
            chat_id: to.to_string(),
            ..original
        }))
    }

    async fn delete_message(&self, chat: &str, message_id: i64) -> Result<(), ChanvaultError> {
        let mut state = self.state.lock().await;
        state.calls.push(GatewayCall::Delete {
            chat: chat.to_string(),
            message_id,
        });
        if state.fail_deletes {
            return Err(ChanvaultError::gateway(
                "deleteMessage",
                "Bad Request: message can't be deleted",
            ));
        }
        state
            .messages
            .get_mut(chat)
            .and_then(|m| m.remove(&message_id))
            .map(|_| ())
            .ok_or_else(|| not_found("deleteMessage", "message to delete"))
    }

    async fn get_chat(&self, chat: &str) -> Result<ChatInfo, ChanvaultError> {
        let mut state = self.state.lock().await;
        state.calls.push(GatewayCall::GetChat {
            chat: chat.to_string(),
        });
        state
            .lookup(chat)
            .cloned()
            .ok_or_else(|| not_found("getChat", "chat"))
    }

    async fn edit_message_text(
        &self,
        chat: &str,
        message_id: i64,
        text: &str,
    ) -> Result<(), ChanvaultError> {
        let mut state = self.state.lock().await;
        state.calls.push(GatewayCall::Edit {
            chat: chat.to_string(),
            message_id,
            text: text.to_string(),
        });
        let message = state
            .messages
            .get_mut(chat)
            .and_then(|m| m.get_mut(&message_id))
            .ok_or_else(|| not_found("editMessageText", "message to edit"))?;
        if message.text.as_deref() == Some(text) {
            return Err(ChanvaultError::gateway(
                "editMessageText",
                "Bad Request: message is not modified",
            ));
        }
        message.text = Some(text.to_string());
        Ok(())
    }

    async fn answer_callback_query(
        &self,
        callback_id: &str,
        text: Option<&str>,
    ) -> Result<(), ChanvaultError> {
        self.state
            .lock()
            .await
            .calls
            .push(GatewayCall::AnswerCallback {
                id: callback_id.to_string(),
                text: text.map(str::to_string),
            });
        Ok(())
    }
}

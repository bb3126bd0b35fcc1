// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote chat platform gateway.

use async_trait::async_trait;

use crate::error::ChanvaultError;
use crate::types::{ChannelPost, ChatInfo, InlineButton, MessageContent};

/// The only way the engine observes or mutates remote channel content.
///
/// Chat references are platform chat ids or `@handle`s. Every failed call,
/// whether the transport failed or the platform answered `ok=false`, comes
/// back as [`ChanvaultError::Gateway`] so loops can count it and continue.
#[async_trait]
pub trait ChannelGateway: Send + Sync + 'static {
    /// Sends a plain text message. Returns the new message id.
    async fn send_text(&self, chat: &str, text: &str) -> Result<i64, ChanvaultError>;

    /// Sends a text message with one button per row.
    async fn send_keyboard(
        &self,
        chat: &str,
        text: &str,
        buttons: &[InlineButton],
    ) -> Result<i64, ChanvaultError>;

    /// Sends stored content by text or content handle.
    async fn send_content(
        &self,
        chat: &str,
        content: &MessageContent,
        caption: Option<&str>,
    ) -> Result<i64, ChanvaultError>;

    /// Forwards `message_id` from `from` into `to` and returns the new copy.
    async fn forward_message(
        &self,
        to: &str,
        from: &str,
        message_id: i64,
    ) -> Result<ChannelPost, ChanvaultError>;

    /// Copies `message_id` from `from` into `to` without a forward header.
    async fn copy_message(&self, to: &str, from: &str, message_id: i64)
    -> Result<i64, ChanvaultError>;

    async fn delete_message(&self, chat: &str, message_id: i64) -> Result<(), ChanvaultError>;

    /// Resolves a chat id or `@handle`.
    async fn get_chat(&self, chat: &str) -> Result<ChatInfo, ChanvaultError>;

    async fn edit_message_text(
        &self,
        chat: &str,
        message_id: i64,
        text: &str,
    ) -> Result<(), ChanvaultError>;

    async fn answer_callback_query(
        &self,
        callback_id: &str,
        text: Option<&str>,
    ) -> Result<(), ChanvaultError>;
}

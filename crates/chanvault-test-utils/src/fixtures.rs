// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for platform messages and events used across tests.

use chanvault_core::types::{
    Attachment, CallbackEvent, ForwardOrigin, InboundEvent, PrivateMessage,
};
use chanvault_core::{Channel, ChannelPost, ContentKind};

pub const OPERATOR: &str = "42";

pub fn text_post(chat: &str, message_id: i64, text: &str) -> ChannelPost {
    ChannelPost {
        chat_id: chat.to_string(),
        chat_title: Some("Test Channel".to_string()),
        message_id,
        date: 1_700_000_000 + message_id,
        text: Some(text.to_string()),
        ..ChannelPost::default()
    }
}

pub fn media_post(
    chat: &str,
    message_id: i64,
    kind: ContentKind,
    file_id: &str,
    file_size: u64,
) -> ChannelPost {
    ChannelPost {
        chat_id: chat.to_string(),
        chat_title: Some("Test Channel".to_string()),
        message_id,
        date: 1_700_000_000 + message_id,
        attachments: vec![Attachment {
            kind,
            file_id: file_id.to_string(),
            file_size: Some(file_size),
        }],
        ..ChannelPost::default()
    }
}

pub fn channel(chat_id: &str, title: &str) -> Channel {
    Channel {
        chat_id: chat_id.to_string(),
        title: title.to_string(),
        username: None,
        added_at: 1_700_000_000,
    }
}

/// A private text message from `user` in their own chat.
pub fn private_text(user: &str, text: &str) -> InboundEvent {
    InboundEvent::Private(PrivateMessage {
        user_id: user.to_string(),
        chat_id: user.to_string(),
        post: ChannelPost {
            chat_id: user.to_string(),
            message_id: 1,
            date: 1_700_000_000,
            text: Some(text.to_string()),
            ..ChannelPost::default()
        },
    })
}

/// A message the operator forwarded from `channel` to the bot.
pub fn forwarded_private(user: &str, channel: &str, original_id: i64, text: &str) -> InboundEvent {
    InboundEvent::Private(PrivateMessage {
        user_id: user.to_string(),
        chat_id: user.to_string(),
        post: ChannelPost {
            chat_id: user.to_string(),
            message_id: 500 + original_id,
            date: 1_700_000_900,
            text: Some(text.to_string()),
            origin: Some(ForwardOrigin {
                chat_id: channel.to_string(),
                message_id: original_id,
                date: 1_690_000_000 + original_id,
            }),
            ..ChannelPost::default()
        },
    })
}

pub fn callback(user: &str, data: &str) -> InboundEvent {
    InboundEvent::Callback(CallbackEvent {
        id: format!("cb-{data}"),
        user_id: user.to_string(),
        chat_id: Some(user.to_string()),
        message_id: Some(1),
        data: Some(data.to_string()),
    })
}

// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of webhook updates into channel-agnostic events.
//!
//! Updates are deserialized into teloxide's Bot API models and reduced to
//! [`InboundEvent`]s. Anything the engine does not act on becomes
//! [`InboundEvent::Ignored`].

use teloxide::types::{CallbackQuery, FileMeta, Message, MessageOrigin, Update, UpdateKind};
use tracing::debug;

use chanvault_core::ChanvaultError;
use chanvault_core::types::{
    Attachment, CallbackEvent, ChannelPost, ContentKind, ForwardOrigin, InboundEvent,
    PrivateMessage,
};

/// Parses a raw webhook body.
pub fn parse_update(body: &[u8]) -> Result<Update, ChanvaultError> {
    serde_json::from_slice(body)
        .map_err(|e| ChanvaultError::InvalidInput(format!("malformed update: {e}")))
}

/// Reduces an update to the event the engine handles.
pub fn to_event(update: &Update) -> InboundEvent {
    match &update.kind {
        UpdateKind::ChannelPost(msg) => InboundEvent::ChannelPost(to_post(msg)),
        UpdateKind::Message(msg) if msg.chat.is_private() => match msg.from.as_ref() {
            Some(user) => InboundEvent::Private(PrivateMessage {
                user_id: user.id.0.to_string(),
                chat_id: msg.chat.id.0.to_string(),
                post: to_post(msg),
            }),
            None => InboundEvent::Ignored,
        },
        UpdateKind::CallbackQuery(query) => InboundEvent::Callback(to_callback(query)),
        _ => {
            debug!(update_id = update.id.0, "ignoring update kind");
            InboundEvent::Ignored
        }
    }
}

fn attachment(kind: ContentKind, file: &FileMeta) -> Attachment {
    Attachment {
        kind,
        file_id: file.id.to_string(),
        file_size: Some(u64::from(file.size)),
    }
}

/// Converts a platform message into a [`ChannelPost`].
///
/// Photo messages carry several renditions; only the last (largest) one is
/// kept.
pub fn to_post(msg: &Message) -> ChannelPost {
    let mut attachments = Vec::new();
    if let Some(largest) = msg.photo().and_then(|sizes| sizes.last()) {
        attachments.push(attachment(ContentKind::Photo, &largest.file));
    }
    if let Some(video) = msg.video() {
        attachments.push(attachment(ContentKind::Video, &video.file));
    }
    if let Some(document) = msg.document() {
        attachments.push(attachment(ContentKind::Document, &document.file));
    }
    if let Some(audio) = msg.audio() {
        attachments.push(attachment(ContentKind::Audio, &audio.file));
    }
    if let Some(animation) = msg.animation() {
        attachments.push(attachment(ContentKind::Animation, &animation.file));
    }
    if let Some(sticker) = msg.sticker() {
        attachments.push(attachment(ContentKind::Sticker, &sticker.file));
    }
    if let Some(voice) = msg.voice() {
        attachments.push(attachment(ContentKind::Voice, &voice.file));
    }
    if let Some(note) = msg.video_note() {
        attachments.push(attachment(ContentKind::VideoNote, &note.file));
    }

    let origin = match msg.forward_origin() {
        Some(MessageOrigin::Channel {
            date,
            chat,
            message_id,
            ..
        }) => Some(ForwardOrigin {
            chat_id: chat.id.0.to_string(),
            message_id: i64::from(message_id.0),
            date: date.timestamp(),
        }),
        _ => None,
    };

    ChannelPost {
        chat_id: msg.chat.id.0.to_string(),
        chat_title: msg.chat.title().map(str::to_string),
        message_id: i64::from(msg.id.0),
        date: msg.date.timestamp(),
        text: msg.text().map(str::to_string),
        caption: msg.caption().map(str::to_string),
        attachments,
        origin,
    }
}

fn to_callback(query: &CallbackQuery) -> CallbackEvent {
    CallbackEvent {
        id: query.id.to_string(),
        user_id: query.from.id.0.to_string(),
        chat_id: query
            .message
            .as_ref()
            .map(|m| m.chat().id.0.to_string()),
        message_id: query.message.as_ref().map(|m| i64::from(m.id().0)),
        data: query.data.clone(),
    }
}

// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the store, the gateway adapter, and the engine.
//!
//! [`BackupEntry`] and [`UserRecord`] are persisted as JSON values, so their
//! serde field names are part of the storage format and must stay stable.

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// The kind of content a platform message carries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    Photo,
    Video,
    Document,
    Audio,
    Animation,
    Sticker,
    Voice,
    VideoNote,
}

impl ContentKind {
    /// Priority order consulted when a message carries several content fields.
    ///
    /// The recorder stores the first populated kind; the restorer sends the
    /// first populated restorable kind.
    pub const PRIORITY: [ContentKind; 9] = [
        ContentKind::Text,
        ContentKind::Photo,
        ContentKind::Video,
        ContentKind::Document,
        ContentKind::Audio,
        ContentKind::Animation,
        ContentKind::Sticker,
        ContentKind::Voice,
        ContentKind::VideoNote,
    ];

    /// Whether a restore replays this kind. Voice notes and video notes are
    /// recorded but never resent.
    pub fn is_restorable(self) -> bool {
        !matches!(self, ContentKind::Voice | ContentKind::VideoNote)
    }
}

/// Sendable content: either plain text or an opaque media handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text(String),
    Media { kind: ContentKind, file_id: String },
}

impl MessageContent {
    pub fn kind(&self) -> ContentKind {
        match self {
            MessageContent::Text(_) => ContentKind::Text,
            MessageContent::Media { kind, .. } => *kind,
        }
    }
}

/// One media attachment on a platform message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub kind: ContentKind,
    /// Content handle returned by the platform.
    pub file_id: String,
    /// Reported byte size, when the platform supplies one.
    pub file_size: Option<u64>,
}

/// Where a forwarded message originally came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardOrigin {
    pub chat_id: String,
    pub message_id: i64,
    pub date: i64,
}

/// Channel-agnostic view of a single platform message.
///
/// Used for channel posts, for copies returned by a forward probe, and for
/// the content of private messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelPost {
    pub chat_id: String,
    pub chat_title: Option<String>,
    pub message_id: i64,
    /// Unix timestamp in seconds.
    pub date: i64,
    pub text: Option<String>,
    pub caption: Option<String>,
    /// At most one attachment per kind. Photo renditions are already reduced
    /// to the largest one by the adapter.
    pub attachments: Vec<Attachment>,
    pub origin: Option<ForwardOrigin>,
}

impl ChannelPost {
    /// Returns the handle or text of the given kind, if present.
    pub fn field(&self, kind: ContentKind) -> Option<&str> {
        match kind {
            ContentKind::Text => self.text.as_deref(),
            other => self
                .attachments
                .iter()
                .find(|a| a.kind == other)
                .map(|a| a.file_id.as_str()),
        }
    }

    /// The highest-priority content present on this message.
    pub fn primary_content(&self) -> Option<MessageContent> {
        ContentKind::PRIORITY.iter().find_map(|&kind| {
            self.field(kind).map(|value| match kind {
                ContentKind::Text => MessageContent::Text(value.to_string()),
                kind => MessageContent::Media {
                    kind,
                    file_id: value.to_string(),
                },
            })
        })
    }

    /// The largest reported attachment size, if any attachment reports one.
    pub fn largest_attachment_size(&self) -> Option<u64> {
        self.attachments.iter().filter_map(|a| a.file_size).max()
    }
}

/// Which pathway created a backup entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Provenance {
    /// Recorded from a live channel post.
    Auto,
    /// Captured from a message the operator forwarded to the bot.
    Manual,
    /// Found by the periodic reconciler.
    Periodic,
    /// Found by history discovery on channel registration.
    Discovered,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One durable record of a single channel message.
///
/// Stored under `backup:<channelId>:<messageId>`. At most one content field
/// is expected to be populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupEntry {
    pub message_id: i64,
    #[serde(default)]
    pub date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_note: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_backup: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub manual_backup: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub periodic_backup: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub original_exists: bool,
}

impl BackupEntry {
    /// An entry carrying only identity, timestamp, and provenance.
    pub fn minimal(message_id: i64, date: i64, provenance: Provenance) -> Self {
        let mut entry = Self {
            message_id,
            date,
            ..Default::default()
        };
        entry.tag(provenance);
        entry
    }

    /// Builds an entry for `message_id` from the content of `post`.
    ///
    /// `message_id` is passed separately because probe and manual paths record
    /// the original channel id, not the id of the copy they observed.
    pub fn from_post(message_id: i64, post: &ChannelPost, provenance: Provenance) -> Self {
        let date = post.origin.as_ref().map(|o| o.date).unwrap_or(post.date);
        let mut entry = Self::minimal(message_id, date, provenance);
        if let Some(content) = post.primary_content() {
            let value = match &content {
                MessageContent::Text(text) => text.clone(),
                MessageContent::Media { file_id, .. } => file_id.clone(),
            };
            *entry.slot(content.kind()) = Some(value);
        }
        entry.caption = post.caption.clone();
        entry
    }

    fn tag(&mut self, provenance: Provenance) {
        match provenance {
            Provenance::Auto => self.auto_backup = true,
            Provenance::Manual => self.manual_backup = true,
            Provenance::Periodic => {
                self.periodic_backup = true;
                self.original_exists = true;
            }
            Provenance::Discovered => self.original_exists = true,
        }
    }

    fn slot(&mut self, kind: ContentKind) -> &mut Option<String> {
        match kind {
            ContentKind::Text => &mut self.text,
            ContentKind::Photo => &mut self.photo,
            ContentKind::Video => &mut self.video,
            ContentKind::Document => &mut self.document,
            ContentKind::Audio => &mut self.audio,
            ContentKind::Animation => &mut self.animation,
            ContentKind::Sticker => &mut self.sticker,
            ContentKind::Voice => &mut self.voice,
            ContentKind::VideoNote => &mut self.video_note,
        }
    }

    /// Returns the stored value of the given kind, if any.
    pub fn field(&self, kind: ContentKind) -> Option<&str> {
        match kind {
            ContentKind::Text => self.text.as_deref(),
            ContentKind::Photo => self.photo.as_deref(),
            ContentKind::Video => self.video.as_deref(),
            ContentKind::Document => self.document.as_deref(),
            ContentKind::Audio => self.audio.as_deref(),
            ContentKind::Animation => self.animation.as_deref(),
            ContentKind::Sticker => self.sticker.as_deref(),
            ContentKind::Voice => self.voice.as_deref(),
            ContentKind::VideoNote => self.video_note.as_deref(),
        }
    }

    fn first_in(&self, kinds: impl Iterator<Item = ContentKind>) -> Option<MessageContent> {
        kinds
            .filter_map(|kind| self.field(kind).map(|value| (kind, value)))
            .find(|(_, value)| !value.is_empty())
            .map(|(kind, value)| match kind {
                ContentKind::Text => MessageContent::Text(value.to_string()),
                kind => MessageContent::Media {
                    kind,
                    file_id: value.to_string(),
                },
            })
    }

    /// The highest-priority content stored in this entry.
    pub fn content(&self) -> Option<MessageContent> {
        self.first_in(ContentKind::PRIORITY.into_iter())
    }

    /// The content a restore would send, or `None` when nothing is sendable.
    pub fn restorable_content(&self) -> Option<MessageContent> {
        self.first_in(ContentKind::PRIORITY.into_iter().filter(|k| k.is_restorable()))
    }
}

/// Accepts a chat id stored either as a JSON string or a JSON number.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}

/// A channel registered by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// External chat id. Identity of the channel.
    #[serde(rename = "id", deserialize_with = "string_or_number")]
    pub chat_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Registration time, unix seconds.
    #[serde(rename = "addedAt", default)]
    pub added_at: i64,
}

impl Channel {
    /// Whether `reference` names this channel, by chat id or `@handle`.
    pub fn matches(&self, reference: &str) -> bool {
        let reference = reference.trim();
        if self.chat_id == reference {
            return true;
        }
        match (&self.username, reference.strip_prefix('@')) {
            (Some(username), Some(handle)) => username.eq_ignore_ascii_case(handle),
            _ => false,
        }
    }
}

/// A bot user and the channels they registered, stored under `user:<userId>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Registration order is preserved.
    #[serde(default)]
    pub channels: Vec<Channel>,
    /// Legacy map kept only so existing records round-trip unchanged.
    #[serde(default)]
    pub backups: serde_json::Map<String, serde_json::Value>,
}

impl UserRecord {
    pub fn has_channel(&self, chat_id: &str) -> bool {
        self.channels.iter().any(|c| c.chat_id == chat_id)
    }

    pub fn find_channel(&self, reference: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.matches(reference))
    }

    /// Appends `channel` unless its chat id is already registered.
    ///
    /// Returns `false` for a duplicate.
    pub fn add_channel(&mut self, channel: Channel) -> bool {
        if self.has_channel(&channel.chat_id) {
            return false;
        }
        self.channels.push(channel);
        true
    }

    /// Removes the channel named by `reference`. Its backups are untouched.
    pub fn remove_channel(&mut self, reference: &str) -> Option<Channel> {
        let index = self.channels.iter().position(|c| c.matches(reference))?;
        Some(self.channels.remove(index))
    }
}

/// State of the button-driven restore flow for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum RestoreState {
    None,
    WaitingTarget,
}

/// Chat metadata returned by the platform's `getChat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatInfo {
    pub id: String,
    pub title: Option<String>,
    pub username: Option<String>,
    /// Platform chat type (`channel`, `supergroup`, `private`, ...).
    pub kind: String,
}

impl ChatInfo {
    pub fn is_channel(&self) -> bool {
        self.kind == "channel"
    }

    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .or_else(|| self.username.as_ref().map(|u| format!("@{u}")))
            .unwrap_or_else(|| self.id.clone())
    }
}

/// One inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub data: String,
}

/// Outcome of recording a live channel post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordResult {
    Saved,
    /// An entry for this (channel, message id) already existed; nothing written.
    AlreadyRecorded,
    /// An attachment exceeded the media size ceiling; nothing written.
    SkippedOversized { size: u64 },
}

/// Summary of one history discovery scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub saved: u64,
    pub skipped: u64,
    pub scanned: u64,
    /// Set when the scan ended early on an unrecoverable error.
    pub error: Option<String>,
}

/// Summary of one restore run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub restored: u64,
    pub failed: u64,
    /// Entries with no sendable content.
    pub skipped: u64,
    pub total: u64,
}

/// Summary of one reconciliation sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub channels: u64,
    pub found: u64,
    pub errors: u64,
}

/// A message sent to the bot in a private chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateMessage {
    pub user_id: String,
    pub chat_id: String,
    pub post: ChannelPost,
}

impl PrivateMessage {
    pub fn text(&self) -> Option<&str> {
        self.post.text.as_deref()
    }
}

/// An inline keyboard button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackEvent {
    pub id: String,
    pub user_id: String,
    pub chat_id: Option<String>,
    pub message_id: Option<i64>,
    pub data: Option<String>,
}

/// A decoded inbound webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    ChannelPost(ChannelPost),
    Private(PrivateMessage),
    Callback(CallbackEvent),
    Ignored,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo_post() -> ChannelPost {
        ChannelPost {
            chat_id: "-100123".into(),
            message_id: 7,
            date: 1_700_000_000,
            caption: Some("sunset".into()),
            attachments: vec![
                Attachment {
                    kind: ContentKind::Document,
                    file_id: "doc-1".into(),
                    file_size: Some(10),
                },
                Attachment {
                    kind: ContentKind::Photo,
                    file_id: "photo-big".into(),
                    file_size: Some(2048),
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn primary_content_follows_priority() {
        let post = photo_post();
        assert_eq!(
            post.primary_content(),
            Some(MessageContent::Media {
                kind: ContentKind::Photo,
                file_id: "photo-big".into()
            })
        );

        let mut with_text = post.clone();
        with_text.text = Some("hello".into());
        assert_eq!(
            with_text.primary_content(),
            Some(MessageContent::Text("hello".into()))
        );
    }

    #[test]
    fn largest_attachment_size_is_max() {
        assert_eq!(photo_post().largest_attachment_size(), Some(2048));
        assert_eq!(ChannelPost::default().largest_attachment_size(), None);
    }

    #[test]
    fn entry_from_post_populates_single_field() {
        let entry = BackupEntry::from_post(7, &photo_post(), Provenance::Auto);
        assert_eq!(entry.photo.as_deref(), Some("photo-big"));
        assert_eq!(entry.document, None);
        assert_eq!(entry.caption.as_deref(), Some("sunset"));
        assert!(entry.auto_backup);
        assert!(!entry.original_exists);
    }

    #[test]
    fn entry_uses_forward_origin_date() {
        let mut post = photo_post();
        post.origin = Some(ForwardOrigin {
            chat_id: "-100123".into(),
            message_id: 3,
            date: 1_600_000_000,
        });
        let entry = BackupEntry::from_post(3, &post, Provenance::Manual);
        assert_eq!(entry.date, 1_600_000_000);
        assert!(entry.manual_backup);
    }

    #[test]
    fn periodic_entries_mark_original_exists() {
        let entry = BackupEntry::minimal(9, 0, Provenance::Periodic);
        assert!(entry.periodic_backup);
        assert!(entry.original_exists);
    }

    #[test]
    fn voice_is_recorded_but_not_restorable() {
        let entry = BackupEntry {
            message_id: 1,
            voice: Some("voice-1".into()),
            ..Default::default()
        };
        assert_eq!(entry.content().map(|c| c.kind()), Some(ContentKind::Voice));
        assert_eq!(entry.restorable_content(), None);
    }

    #[test]
    fn entry_json_uses_flat_field_names() {
        let entry = BackupEntry {
            message_id: 5,
            date: 10,
            text: Some("hi".into()),
            auto_backup: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"message_id": 5, "date": 10, "text": "hi", "auto_backup": true})
        );
    }

    #[test]
    fn channel_accepts_numeric_id() {
        let channel: Channel =
            serde_json::from_str(r#"{"id": -100123, "title": "News", "addedAt": 1}"#).unwrap();
        assert_eq!(channel.chat_id, "-100123");
        assert_eq!(channel.username, None);
    }

    #[test]
    fn user_record_rejects_duplicate_channel() {
        let mut user = UserRecord::default();
        let channel = Channel {
            chat_id: "-100123".into(),
            title: "News".into(),
            username: Some("news".into()),
            added_at: 0,
        };
        assert!(user.add_channel(channel.clone()));
        assert!(!user.add_channel(channel));
        assert_eq!(user.channels.len(), 1);
    }

    #[test]
    fn remove_channel_by_handle() {
        let mut user = UserRecord::default();
        user.add_channel(Channel {
            chat_id: "-100123".into(),
            title: "News".into(),
            username: Some("News".into()),
            added_at: 0,
        });
        let removed = user.remove_channel("@news").expect("channel should match handle");
        assert_eq!(removed.chat_id, "-100123");
        assert!(user.channels.is_empty());
        assert!(user.remove_channel("@news").is_none());
    }

    #[test]
    fn restore_state_string_form() {
        assert_eq!(RestoreState::WaitingTarget.to_string(), "waiting_target");
        assert_eq!(
            "waiting_target".parse::<RestoreState>().unwrap(),
            RestoreState::WaitingTarget
        );
    }
}

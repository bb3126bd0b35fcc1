// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live post recording and forward-to-save capture.

use tracing::{debug, info, warn};

use chanvault_config::model::BackupConfig;
use chanvault_core::types::RecordResult;
use chanvault_core::{BackupEntry, ChannelPost, ChanvaultError, Provenance};
use chanvault_storage::Repository;

use crate::metrics;
use crate::notify::OwnerNotifier;
use crate::replies;

/// Writes backup entries for posts the bot observes directly.
#[derive(Clone)]
pub struct BackupRecorder {
    repo: Repository,
    notifier: OwnerNotifier,
    config: BackupConfig,
}

impl BackupRecorder {
    pub fn new(repo: Repository, notifier: OwnerNotifier, config: BackupConfig) -> Self {
        Self {
            repo,
            notifier,
            config,
        }
    }

    fn oversized(&self, post: &ChannelPost) -> Option<u64> {
        post.largest_attachment_size()
            .filter(|&size| size > self.config.max_media_bytes)
    }

    /// Records a post published in a channel.
    ///
    /// Posts with an attachment above the media ceiling are skipped without
    /// error. Recording the same message twice writes nothing the second time.
    pub async fn record_channel_post(
        &self,
        post: &ChannelPost,
    ) -> Result<RecordResult, ChanvaultError> {
        let channel_id = post.chat_id.as_str();
        let message_id = post.message_id;

        if let Some(size) = self.oversized(post) {
            debug!(channel_id, message_id, size, "skipping oversized post");
            metrics::record_oversized();
            return Ok(RecordResult::SkippedOversized { size });
        }

        if self.repo.backup_exists(channel_id, message_id).await? {
            debug!(channel_id, message_id, "post already recorded");
            metrics::record_duplicate();
            return Ok(RecordResult::AlreadyRecorded);
        }

        let entry = BackupEntry::from_post(message_id, post, Provenance::Auto);
        self.repo.put_backup(channel_id, &entry).await?;
        metrics::record_saved(Provenance::Auto);
        info!(channel_id, message_id, "recorded channel post");

        if self.config.notify_owners {
            let title = post.chat_title.as_deref().unwrap_or(channel_id);
            // The entry is durable; a notification failure must not undo that.
            if let Err(e) = self
                .notifier
                .notify_owners(channel_id, &replies::new_post_saved(title, message_id))
                .await
            {
                warn!(channel_id, message_id, error = %e, "owner notification failed");
            }
        }

        Ok(RecordResult::Saved)
    }

    /// Records a message the operator forwarded from `channel_id`.
    ///
    /// The entry is keyed by the original message id from the forward origin.
    /// A message forwarded from any other chat is rejected.
    pub async fn record_manual(
        &self,
        user_id: &str,
        channel_id: &str,
        post: &ChannelPost,
    ) -> Result<RecordResult, ChanvaultError> {
        let origin = post
            .origin
            .as_ref()
            .filter(|o| o.chat_id == channel_id)
            .ok_or_else(|| {
                ChanvaultError::InvalidInput(format!("message was not forwarded from {channel_id}"))
            })?;
        let message_id = origin.message_id;

        if let Some(size) = self.oversized(post) {
            metrics::record_oversized();
            return Ok(RecordResult::SkippedOversized { size });
        }
        if self.repo.backup_exists(channel_id, message_id).await? {
            metrics::record_duplicate();
            return Ok(RecordResult::AlreadyRecorded);
        }

        let entry = BackupEntry::from_post(message_id, post, Provenance::Manual);
        self.repo.put_backup(channel_id, &entry).await?;
        metrics::record_saved(Provenance::Manual);
        info!(user_id, channel_id, message_id, "recorded forwarded message");
        Ok(RecordResult::Saved)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chanvault_core::ContentKind;
    use chanvault_test_utils::fixtures::{channel, media_post, text_post};
    use chanvault_test_utils::{MemoryStore, MockGateway};

    use super::*;

    const CHANNEL: &str = "-100123";

    fn recorder(
        store: Arc<MemoryStore>,
        gateway: Arc<MockGateway>,
    ) -> (BackupRecorder, Repository) {
        let repo = Repository::new(store);
        let notifier = OwnerNotifier::new(repo.clone(), gateway);
        (
            BackupRecorder::new(repo.clone(), notifier, BackupConfig::default()),
            repo,
        )
    }

    #[tokio::test]
    async fn second_record_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let (recorder, repo) = recorder(store.clone(), Arc::new(MockGateway::new()));
        let post = text_post(CHANNEL, 5, "hello");

        assert_eq!(recorder.record_channel_post(&post).await.unwrap(), RecordResult::Saved);
        let writes = store.put_count();
        assert_eq!(
            recorder.record_channel_post(&post).await.unwrap(),
            RecordResult::AlreadyRecorded
        );
        assert_eq!(store.put_count(), writes);
        assert_eq!(repo.backup_ids(CHANNEL).await.unwrap(), vec![5]);
    }

    #[tokio::test]
    async fn media_just_above_ceiling_is_skipped() {
        let store = Arc::new(MemoryStore::new());
        let (recorder, repo) = recorder(store.clone(), Arc::new(MockGateway::new()));
        let limit = 25 * 1024 * 1024;

        let at_limit = media_post(CHANNEL, 1, ContentKind::Video, "vid-1", limit);
        let above = media_post(CHANNEL, 2, ContentKind::Video, "vid-2", limit + 1);

        assert_eq!(recorder.record_channel_post(&at_limit).await.unwrap(), RecordResult::Saved);
        assert_eq!(
            recorder.record_channel_post(&above).await.unwrap(),
            RecordResult::SkippedOversized { size: limit + 1 }
        );
        assert_eq!(repo.backup_ids(CHANNEL).await.unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn owners_are_notified_unless_opted_out() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(MockGateway::new());
        let (recorder, repo) = recorder(store, gateway.clone());

        for user in ["1", "2"] {
            let mut record = repo.get_or_create_user(user).await.unwrap();
            record.add_channel(channel(CHANNEL, "News"));
            repo.put_user(user, &record).await.unwrap();
        }
        repo.set_notifications("2", false).await.unwrap();

        recorder
            .record_channel_post(&text_post(CHANNEL, 9, "breaking"))
            .await
            .unwrap();

        assert_eq!(gateway.texts_sent_to("1").await.len(), 1);
        assert!(gateway.texts_sent_to("2").await.is_empty());
    }

    #[tokio::test]
    async fn manual_capture_uses_origin_id() {
        let store = Arc::new(MemoryStore::new());
        let (recorder, repo) = recorder(store, Arc::new(MockGateway::new()));
        let mut post = text_post("42", 900, "forwarded");
        post.origin = Some(chanvault_core::types::ForwardOrigin {
            chat_id: CHANNEL.into(),
            message_id: 17,
            date: 1_600_000_000,
        });

        assert_eq!(
            recorder.record_manual("42", CHANNEL, &post).await.unwrap(),
            RecordResult::Saved
        );
        let entry = repo.get_backup(CHANNEL, 17).await.unwrap().unwrap();
        assert!(entry.manual_backup);
        assert_eq!(entry.date, 1_600_000_000);

        let err = recorder.record_manual("42", "-100999", &post).await.unwrap_err();
        assert!(matches!(err, ChanvaultError::InvalidInput(_)));
    }
}

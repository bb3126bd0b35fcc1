// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Existence probing by forward-then-delete.
//!
//! The platform has no way to list message ids, so the only test for "does
//! message N exist" is to forward it back into the same channel. The copy
//! is deleted right away so the channel ends up unchanged.

use std::sync::Arc;

use tracing::{debug, warn};

use chanvault_core::{BackupEntry, ChannelGateway, ChannelPost, ChanvaultError, Provenance};
use chanvault_storage::Repository;

use crate::metrics;

/// Outcome of probing one id and recording what was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeRecord {
    /// The forward failed: no message at this id, or a transient error.
    Missing,
    /// A message exists and an entry for it was already stored.
    AlreadyRecorded,
    /// A message exists and a new entry was written.
    Saved,
}

#[derive(Clone)]
pub struct Prober {
    repo: Repository,
    gateway: Arc<dyn ChannelGateway>,
}

impl Prober {
    pub fn new(repo: Repository, gateway: Arc<dyn ChannelGateway>) -> Self {
        Self { repo, gateway }
    }

    /// Forwards `message_id` of `channel_id` into the same channel and
    /// deletes the copy. Returns the copy's content when the id exists.
    ///
    /// Gateway failures are reported as `None`; a failed delete is logged.
    pub async fn probe(&self, channel_id: &str, message_id: i64) -> Option<ChannelPost> {
        let copy = match self
            .gateway
            .forward_message(channel_id, channel_id, message_id)
            .await
        {
            Ok(copy) => copy,
            Err(e) => {
                debug!(channel_id, message_id, error = %e, "probe miss");
                metrics::record_probe(false);
                return None;
            }
        };
        metrics::record_probe(true);

        if let Err(e) = self
            .gateway
            .delete_message(channel_id, copy.message_id)
            .await
        {
            warn!(
                channel_id,
                message_id,
                copy_id = copy.message_id,
                error = %e,
                "failed to delete probe copy"
            );
        }
        Some(copy)
    }

    /// Probes `message_id` and stores an entry for it when none exists.
    ///
    /// The probe copy is always deleted before the store is consulted, so an
    /// already-recorded message still leaves no stray forward behind. Only
    /// store failures are returned as errors.
    pub async fn probe_and_record(
        &self,
        channel_id: &str,
        message_id: i64,
        provenance: Provenance,
    ) -> Result<ProbeRecord, ChanvaultError> {
        let Some(copy) = self.probe(channel_id, message_id).await else {
            return Ok(ProbeRecord::Missing);
        };
        if self.repo.backup_exists(channel_id, message_id).await? {
            metrics::record_duplicate();
            return Ok(ProbeRecord::AlreadyRecorded);
        }
        let entry = BackupEntry::from_post(message_id, &copy, provenance);
        self.repo.put_backup(channel_id, &entry).await?;
        metrics::record_saved(provenance);
        Ok(ProbeRecord::Saved)
    }
}

#[cfg(test)]
mod tests {
    use chanvault_test_utils::{GatewayCall, MemoryStore, MockGateway};

    use super::*;

    const CHANNEL: &str = "-100123";

    fn prober(gateway: Arc<MockGateway>) -> (Prober, Repository) {
        let repo = Repository::new(Arc::new(MemoryStore::new()));
        (Prober::new(repo.clone(), gateway), repo)
    }

    #[tokio::test]
    async fn probe_leaves_channel_unchanged() {
        let gateway = Arc::new(MockGateway::new());
        gateway.seed_text(CHANNEL, 3, "hello").await;
        let (prober, repo) = prober(gateway.clone());

        let found = prober
            .probe_and_record(CHANNEL, 3, Provenance::Discovered)
            .await
            .unwrap();
        assert_eq!(found, ProbeRecord::Saved);
        assert_eq!(gateway.message_ids(CHANNEL).await, vec![3]);

        let entry = repo.get_backup(CHANNEL, 3).await.unwrap().unwrap();
        assert_eq!(entry.text.as_deref(), Some("hello"));
        assert!(entry.original_exists);
    }

    #[tokio::test]
    async fn existing_entry_still_deletes_copy() {
        let gateway = Arc::new(MockGateway::new());
        gateway.seed_text(CHANNEL, 3, "hello").await;
        let (prober, repo) = prober(gateway.clone());
        repo.put_backup(CHANNEL, &BackupEntry::minimal(3, 0, Provenance::Auto))
            .await
            .unwrap();

        let found = prober
            .probe_and_record(CHANNEL, 3, Provenance::Discovered)
            .await
            .unwrap();
        assert_eq!(found, ProbeRecord::AlreadyRecorded);
        assert_eq!(gateway.message_ids(CHANNEL).await, vec![3]);
        assert!(
            gateway
                .calls()
                .await
                .iter()
                .any(|c| matches!(c, GatewayCall::Delete { message_id: 4, .. }))
        );
    }

    #[tokio::test]
    async fn delete_failure_is_not_fatal() {
        let gateway = Arc::new(MockGateway::new());
        gateway.seed_text(CHANNEL, 3, "hello").await;
        gateway.fail_deletes(true).await;
        let (prober, _) = prober(gateway);

        let found = prober
            .probe_and_record(CHANNEL, 3, Provenance::Periodic)
            .await
            .unwrap();
        assert_eq!(found, ProbeRecord::Saved);
    }

    #[tokio::test]
    async fn missing_id_writes_nothing() {
        let gateway = Arc::new(MockGateway::new());
        let (prober, repo) = prober(gateway);
        let found = prober
            .probe_and_record(CHANNEL, 8, Provenance::Discovered)
            .await
            .unwrap();
        assert_eq!(found, ProbeRecord::Missing);
        assert!(repo.backup_ids(CHANNEL).await.unwrap().is_empty());
    }
}

// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed access to the content store.
//!
//! Every method reads through to the store; nothing is cached between calls,
//! so each inbound event observes the latest persisted state.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use chanvault_core::types::RestoreState;
use chanvault_core::{BackupEntry, Channel, ChanvaultError, ContentStore, UserRecord};

use crate::keys;

const NOTIFY_OFF: &str = "off";
const NOTIFY_ON: &str = "on";

/// A registered channel and every user that registered it.
#[derive(Debug, Clone)]
pub struct ChannelOwners {
    pub channel: Channel,
    pub owners: Vec<String>,
}

/// Repository over any [`ContentStore`].
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn ContentStore>,
}

impl Repository {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ChanvaultError> {
        match self.store.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn put_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ChanvaultError> {
        let raw = serde_json::to_string(value)?;
        self.store.put(key, &raw).await
    }

    // --- Users ---

    pub async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, ChanvaultError> {
        self.get_json(&keys::user(user_id)).await
    }

    /// Returns the user's record, creating and persisting an empty one on
    /// first interaction.
    pub async fn get_or_create_user(&self, user_id: &str) -> Result<UserRecord, ChanvaultError> {
        if let Some(user) = self.get_user(user_id).await? {
            return Ok(user);
        }
        let user = UserRecord::default();
        self.put_user(user_id, &user).await?;
        Ok(user)
    }

    pub async fn put_user(&self, user_id: &str, user: &UserRecord) -> Result<(), ChanvaultError> {
        self.put_json(&keys::user(user_id), user).await
    }

    /// Ids of every known user, in key order.
    pub async fn list_user_ids(&self) -> Result<Vec<String>, ChanvaultError> {
        Ok(self
            .store
            .list(keys::USER_PREFIX)
            .await?
            .iter()
            .filter_map(|key| keys::parse_user(key).map(str::to_string))
            .collect())
    }

    /// Every registered channel with its owners, ordered by channel id.
    ///
    /// The first registration supplies the channel's title and handle.
    /// Unreadable user records are skipped.
    pub async fn channel_owners(&self) -> Result<Vec<ChannelOwners>, ChanvaultError> {
        let mut by_id: BTreeMap<String, ChannelOwners> = BTreeMap::new();
        for user_id in self.list_user_ids().await? {
            let user = match self.get_user(&user_id).await {
                Ok(Some(user)) => user,
                Ok(None) => continue,
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "skipping unreadable user record");
                    continue;
                }
            };
            for channel in user.channels {
                by_id
                    .entry(channel.chat_id.clone())
                    .or_insert_with(|| ChannelOwners {
                        channel,
                        owners: Vec::new(),
                    })
                    .owners
                    .push(user_id.clone());
            }
        }
        Ok(by_id.into_values().collect())
    }

    /// Ids of users that registered `channel_id`.
    pub async fn owners_of(&self, channel_id: &str) -> Result<Vec<String>, ChanvaultError> {
        Ok(self
            .channel_owners()
            .await?
            .into_iter()
            .find(|entry| entry.channel.chat_id == channel_id)
            .map(|entry| entry.owners)
            .unwrap_or_default())
    }

    // --- Backups ---

    pub async fn get_backup(
        &self,
        channel_id: &str,
        message_id: i64,
    ) -> Result<Option<BackupEntry>, ChanvaultError> {
        self.get_json(&keys::backup(channel_id, message_id)).await
    }

    pub async fn backup_exists(
        &self,
        channel_id: &str,
        message_id: i64,
    ) -> Result<bool, ChanvaultError> {
        Ok(self
            .store
            .get(&keys::backup(channel_id, message_id))
            .await?
            .is_some())
    }

    /// Writes `entry` under its own message id. Overwrites, never duplicates.
    pub async fn put_backup(
        &self,
        channel_id: &str,
        entry: &BackupEntry,
    ) -> Result<(), ChanvaultError> {
        self.put_json(&keys::backup(channel_id, entry.message_id), entry)
            .await
    }

    /// Message ids backed up for `channel_id`, ascending numerically.
    pub async fn backup_ids(&self, channel_id: &str) -> Result<Vec<i64>, ChanvaultError> {
        let mut ids: Vec<i64> = self
            .store
            .list(&keys::backup_prefix(channel_id))
            .await?
            .iter()
            .filter_map(|key| keys::parse_backup(key).map(|(_, id)| id))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    /// All entries of `channel_id` in ascending message-id order.
    ///
    /// Entries that vanish or fail to decode between listing and reading are
    /// skipped with a warning.
    pub async fn list_backups(&self, channel_id: &str) -> Result<Vec<BackupEntry>, ChanvaultError> {
        let mut entries = Vec::new();
        for id in self.backup_ids(channel_id).await? {
            match self.get_backup(channel_id, id).await {
                Ok(Some(mut entry)) => {
                    // The key is authoritative for the id.
                    entry.message_id = id;
                    entries.push(entry);
                }
                Ok(None) => {}
                Err(ChanvaultError::Serialization(e)) => {
                    warn!(channel_id, message_id = id, error = %e, "skipping malformed backup entry");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(entries)
    }

    /// Highest backed-up message id, or 0 when the channel has none.
    pub async fn latest_backup_id(&self, channel_id: &str) -> Result<i64, ChanvaultError> {
        Ok(self
            .backup_ids(channel_id)
            .await?
            .last()
            .copied()
            .unwrap_or(0))
    }

    pub async fn count_backups(&self, channel_id: &str) -> Result<usize, ChanvaultError> {
        Ok(self.backup_ids(channel_id).await?.len())
    }

    // --- Notification preference ---

    /// Defaults to on; only an explicit `"off"` disables notifications.
    pub async fn notifications_enabled(&self, user_id: &str) -> Result<bool, ChanvaultError> {
        Ok(self.store.get(&keys::notify(user_id)).await?.as_deref() != Some(NOTIFY_OFF))
    }

    pub async fn set_notifications(&self, user_id: &str, on: bool) -> Result<(), ChanvaultError> {
        let value = if on { NOTIFY_ON } else { NOTIFY_OFF };
        self.store.put(&keys::notify(user_id), value).await
    }

    // --- Restore workflow session ---

    /// Arms the button flow: the user's next private text names the target.
    pub async fn begin_restore_session(
        &self,
        user_id: &str,
        source_channel: &str,
    ) -> Result<(), ChanvaultError> {
        self.store
            .put(&keys::restore_source(user_id), source_channel)
            .await?;
        self.store
            .put(
                &keys::restore_state(user_id),
                &RestoreState::WaitingTarget.to_string(),
            )
            .await
    }

    /// The chosen source channel when the user is waiting to name a target.
    pub async fn pending_restore_source(
        &self,
        user_id: &str,
    ) -> Result<Option<String>, ChanvaultError> {
        let state = self.store.get(&keys::restore_state(user_id)).await?;
        let waiting = state
            .as_deref()
            .and_then(|s| s.parse::<RestoreState>().ok())
            == Some(RestoreState::WaitingTarget);
        if !waiting {
            return Ok(None);
        }
        self.store.get(&keys::restore_source(user_id)).await
    }

    /// Clears both workflow slots.
    pub async fn clear_restore_session(&self, user_id: &str) -> Result<(), ChanvaultError> {
        self.store.delete(&keys::restore_state(user_id)).await?;
        self.store.delete(&keys::restore_source(user_id)).await
    }

    // --- Manual forward-to-save ---

    pub async fn arm_manual_backup(
        &self,
        user_id: &str,
        channel_id: &str,
    ) -> Result<(), ChanvaultError> {
        self.store
            .put(&keys::manual_backup(user_id), channel_id)
            .await
    }

    pub async fn armed_manual_backup(&self, user_id: &str) -> Result<Option<String>, ChanvaultError> {
        self.store.get(&keys::manual_backup(user_id)).await
    }

    pub async fn disarm_manual_backup(&self, user_id: &str) -> Result<(), ChanvaultError> {
        self.store.delete(&keys::manual_backup(user_id)).await
    }
}

#[cfg(test)]
mod tests {
    use chanvault_core::types::Provenance;
    use chanvault_core::Channel;

    use super::*;
    use crate::SqliteStore;

    async fn repo() -> Repository {
        Repository::new(Arc::new(SqliteStore::open_in_memory().await.unwrap()))
    }

    fn channel(id: &str) -> Channel {
        Channel {
            chat_id: id.to_string(),
            title: format!("Channel {id}"),
            username: None,
            added_at: 0,
        }
    }

    #[tokio::test]
    async fn backups_sort_numerically_not_lexically() {
        let repo = repo().await;
        for id in [10, 9, 100, 2] {
            repo.put_backup("-100", &BackupEntry::minimal(id, 0, Provenance::Auto))
                .await
                .unwrap();
        }
        let ids: Vec<i64> = repo
            .list_backups("-100")
            .await
            .unwrap()
            .iter()
            .map(|e| e.message_id)
            .collect();
        assert_eq!(ids, vec![2, 9, 10, 100]);
        assert_eq!(repo.latest_backup_id("-100").await.unwrap(), 100);
        assert_eq!(repo.latest_backup_id("-200").await.unwrap(), 0);
        assert_eq!(repo.count_backups("-100").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn malformed_entry_is_skipped() {
        let repo = repo().await;
        repo.put_backup("-1", &BackupEntry::minimal(1, 0, Provenance::Auto))
            .await
            .unwrap();
        repo.store().put("backup:-1:2", "not json").await.unwrap();
        let entries = repo.list_backups("-1").await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn get_or_create_persists_empty_record() {
        let repo = repo().await;
        assert!(repo.get_user("5").await.unwrap().is_none());
        let user = repo.get_or_create_user("5").await.unwrap();
        assert!(user.channels.is_empty());
        assert_eq!(repo.list_user_ids().await.unwrap(), vec!["5"]);
    }

    #[tokio::test]
    async fn owners_are_found_by_channel_id() {
        let repo = repo().await;
        let mut alice = UserRecord::default();
        alice.add_channel(channel("-100"));
        let mut bob = UserRecord::default();
        bob.add_channel(channel("-200"));
        repo.put_user("1", &alice).await.unwrap();
        repo.put_user("2", &bob).await.unwrap();

        assert_eq!(repo.owners_of("-100").await.unwrap(), vec!["1"]);
        assert!(repo.owners_of("-300").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn shared_channels_group_their_owners() {
        let repo = repo().await;
        let mut alice = UserRecord::default();
        alice.add_channel(channel("-200"));
        alice.add_channel(channel("-100"));
        let mut bob = UserRecord::default();
        bob.add_channel(channel("-100"));
        repo.put_user("1", &alice).await.unwrap();
        repo.put_user("2", &bob).await.unwrap();
        repo.store().put("user:3", "not json").await.unwrap();

        let grouped = repo.channel_owners().await.unwrap();
        let summary: Vec<(&str, Vec<&str>)> = grouped
            .iter()
            .map(|e| {
                (
                    e.channel.chat_id.as_str(),
                    e.owners.iter().map(String::as_str).collect(),
                )
            })
            .collect();
        assert_eq!(summary, vec![("-100", vec!["1", "2"]), ("-200", vec!["1"])]);
        assert_eq!(repo.owners_of("-100").await.unwrap(), vec!["1", "2"]);
    }

    #[tokio::test]
    async fn notifications_default_on() {
        let repo = repo().await;
        assert!(repo.notifications_enabled("1").await.unwrap());
        repo.set_notifications("1", false).await.unwrap();
        assert!(!repo.notifications_enabled("1").await.unwrap());
        repo.set_notifications("1", true).await.unwrap();
        assert!(repo.notifications_enabled("1").await.unwrap());
    }

    #[tokio::test]
    async fn restore_session_round_trip_and_clear() {
        let repo = repo().await;
        assert_eq!(repo.pending_restore_source("1").await.unwrap(), None);

        repo.begin_restore_session("1", "-100").await.unwrap();
        assert_eq!(
            repo.store().get("restore_state:1").await.unwrap().as_deref(),
            Some("waiting_target")
        );
        assert_eq!(
            repo.pending_restore_source("1").await.unwrap().as_deref(),
            Some("-100")
        );

        repo.clear_restore_session("1").await.unwrap();
        assert_eq!(repo.pending_restore_source("1").await.unwrap(), None);
        assert!(repo.store().get("restore_temp:1:source").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn manual_backup_arming() {
        let repo = repo().await;
        repo.arm_manual_backup("1", "-100").await.unwrap();
        assert_eq!(
            repo.armed_manual_backup("1").await.unwrap().as_deref(),
            Some("-100")
        );
        repo.disarm_manual_backup("1").await.unwrap();
        assert_eq!(repo.armed_manual_backup("1").await.unwrap(), None);
    }
}

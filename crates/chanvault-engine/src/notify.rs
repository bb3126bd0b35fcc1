// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owner notification fan-out.
//!
//! A channel can be registered by several users. Each of them is notified
//! unless their `notify:<userId>` preference is `off`. Delivery is best
//! effort: a failed send is logged and the remaining owners still get theirs.

use std::sync::Arc;

use tracing::{debug, warn};

use chanvault_core::{ChannelGateway, ChanvaultError};
use chanvault_storage::Repository;

#[derive(Clone)]
pub struct OwnerNotifier {
    repo: Repository,
    gateway: Arc<dyn ChannelGateway>,
}

impl OwnerNotifier {
    pub fn new(repo: Repository, gateway: Arc<dyn ChannelGateway>) -> Self {
        Self { repo, gateway }
    }

    /// Sends `text` to every owner of `channel_id` with notifications on.
    ///
    /// Returns how many owners were messaged.
    pub async fn notify_owners(&self, channel_id: &str, text: &str) -> Result<usize, ChanvaultError> {
        let owners = self.repo.owners_of(channel_id).await?;
        self.notify_users(&owners, text).await
    }

    /// Sends `text` to each of `users` with notifications on.
    pub async fn notify_users(&self, users: &[String], text: &str) -> Result<usize, ChanvaultError> {
        let mut sent = 0;
        for user in users {
            if self.notify_user(user, text).await? {
                sent += 1;
            }
        }
        Ok(sent)
    }

    /// Sends `text` to one user unless they turned notifications off.
    ///
    /// Only a store failure is an error; a failed send returns `false`.
    pub async fn notify_user(&self, user_id: &str, text: &str) -> Result<bool, ChanvaultError> {
        if !self.repo.notifications_enabled(user_id).await? {
            debug!(user_id, "notifications off, skipping");
            return Ok(false);
        }
        match self.gateway.send_text(user_id, text).await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!(user_id, error = %e, "failed to deliver notification");
                Ok(false)
            }
        }
    }
}

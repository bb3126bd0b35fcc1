// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic catch-up for posts the live recorder missed.
//!
//! Stateless across runs: each channel is probed in a fixed window directly
//! above its newest stored entry. Running this concurrently with a history
//! scan of the same channel can race on probe copies; that is not guarded.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use chanvault_config::model::ReconcileConfig;
use chanvault_core::types::ReconcileReport;
use chanvault_core::{ChannelGateway, ChanvaultError, Provenance};
use chanvault_storage::Repository;

use crate::metrics;
use crate::notify::OwnerNotifier;
use crate::probe::{ProbeRecord, Prober};
use crate::replies;

/// Result of sweeping one channel's window.
#[derive(Debug, Default)]
pub struct ChannelSweep {
    /// Entries written, including those written before an early stop.
    pub found: u64,
    /// Set when the sweep stopped early.
    pub error: Option<ChanvaultError>,
}

#[derive(Clone)]
pub struct PeriodicReconciler {
    repo: Repository,
    prober: Prober,
    notifier: OwnerNotifier,
    config: ReconcileConfig,
}

impl PeriodicReconciler {
    pub fn new(
        repo: Repository,
        gateway: Arc<dyn ChannelGateway>,
        notifier: OwnerNotifier,
        config: ReconcileConfig,
    ) -> Self {
        Self {
            prober: Prober::new(repo.clone(), gateway),
            repo,
            notifier,
            config,
        }
    }

    /// Probes the window above the newest entry of every registered channel.
    ///
    /// A failure in one channel is counted and the sweep continues. Only a
    /// failure to enumerate users is returned as an error.
    pub async fn reconcile_all(&self) -> Result<ReconcileReport, ChanvaultError> {
        let tracked = self.repo.channel_owners().await?;
        let mut report = ReconcileReport::default();
        let channel_delay = Duration::from_millis(self.config.channel_delay_ms);

        info!(channels = tracked.len(), window = self.config.window, "reconciliation started");

        for (index, entry) in tracked.iter().enumerate() {
            if index > 0 && !channel_delay.is_zero() {
                tokio::time::sleep(channel_delay).await;
            }
            report.channels += 1;
            let channel_id = entry.channel.chat_id.as_str();

            let sweep = self.reconcile_channel(channel_id).await;
            report.found += sweep.found;

            if sweep.found > 0 {
                let text = replies::reconcile_found(&entry.channel.title, sweep.found);
                if let Err(e) = self.notifier.notify_users(&entry.owners, &text).await {
                    warn!(channel_id, error = %e, "failed to notify owners");
                }
            }
            if let Some(e) = sweep.error {
                warn!(channel_id, found = sweep.found, error = %e, "reconciliation failed for channel");
                report.errors += 1;
            }
        }

        info!(
            channels = report.channels,
            found = report.found,
            errors = report.errors,
            "reconciliation finished"
        );
        metrics::record_job("reconcile");
        Ok(report)
    }

    /// Probes `latest + 1 ..= latest + window`. A store or gateway error
    /// stops the window; entries written before it stay counted.
    pub async fn reconcile_channel(&self, channel_id: &str) -> ChannelSweep {
        let mut sweep = ChannelSweep::default();
        if let Err(e) = self.sweep_window(channel_id, &mut sweep.found).await {
            sweep.error = Some(e);
        }
        sweep
    }

    async fn sweep_window(&self, channel_id: &str, found: &mut u64) -> Result<(), ChanvaultError> {
        let latest = self.repo.latest_backup_id(channel_id).await?;
        let delay = Duration::from_millis(self.config.probe_delay_ms);

        for id in (latest + 1)..=(latest + self.config.window) {
            if self.repo.backup_exists(channel_id, id).await? {
                continue;
            }
            if self
                .prober
                .probe_and_record(channel_id, id, Provenance::Periodic)
                .await?
                == ProbeRecord::Saved
            {
                *found += 1;
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        debug!(channel_id, latest, found = *found, "channel reconciled");
        Ok(())
    }
}

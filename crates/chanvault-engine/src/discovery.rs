// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backward history scan for a newly registered channel.
//!
//! Ids are probed one at a time from the configured upper bound down to 1.
//! Channels have gaps (deleted posts, service messages), so a miss only
//! counts toward the cutoff; a long unbroken run of misses means the scan
//! has moved past the oldest post.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use chanvault_config::model::DiscoveryConfig;
use chanvault_core::types::DiscoveryReport;
use chanvault_core::{Channel, ChannelGateway, ProgressSink, Provenance};
use chanvault_storage::Repository;

use crate::metrics;
use crate::probe::{ProbeRecord, Prober};
use crate::progress::{ProgressThrottle, StatusMessage};
use crate::replies;

#[derive(Clone)]
pub struct HistoryDiscoverer {
    repo: Repository,
    prober: Prober,
    gateway: Arc<dyn ChannelGateway>,
    config: DiscoveryConfig,
}

impl HistoryDiscoverer {
    pub fn new(
        repo: Repository,
        gateway: Arc<dyn ChannelGateway>,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            prober: Prober::new(repo.clone(), gateway.clone()),
            repo,
            gateway,
            config,
        }
    }

    /// Scans `channel` backwards and reports progress to `user_chat`.
    ///
    /// Never fails: a store error ends the scan early and is carried in the
    /// returned report, which still counts what was saved before it.
    pub async fn discover_history(&self, channel: &Channel, user_chat: &str) -> DiscoveryReport {
        let channel_id = channel.chat_id.as_str();
        let mut report = DiscoveryReport::default();

        // Never start below the newest stored entry.
        let start = match self.repo.latest_backup_id(channel_id).await {
            Ok(latest) => latest.max(self.config.upper_bound),
            Err(e) => {
                report.error = Some(e.to_string());
                self.send_final(channel, user_chat, &report).await;
                return report;
            }
        };

        let mut status = StatusMessage::new(self.gateway.clone(), user_chat);
        if let Err(e) = status.publish(&replies::discovery_started(&channel.title)).await {
            warn!(channel_id, error = %e, "failed to send discovery status");
        }
        let mut throttle = ProgressThrottle::new(
            self.config.progress_every,
            Duration::from_secs(self.config.progress_interval_secs),
        );
        let delay = Duration::from_millis(self.config.probe_delay_ms);
        let mut failures: u32 = 0;

        info!(channel_id, start, cutoff = self.config.failure_cutoff, "history scan started");

        for id in (0..=start).rev() {
            report.scanned += 1;
            if id == 0 {
                break;
            }

            match self
                .prober
                .probe_and_record(channel_id, id, Provenance::Discovered)
                .await
            {
                Ok(ProbeRecord::Missing) => {
                    failures += 1;
                    if failures >= self.config.failure_cutoff {
                        info!(channel_id, last_id = id, "failure cutoff reached");
                        break;
                    }
                }
                Ok(ProbeRecord::AlreadyRecorded) => {
                    failures = 0;
                    report.skipped += 1;
                }
                Ok(ProbeRecord::Saved) => {
                    failures = 0;
                    report.saved += 1;
                }
                Err(e) => {
                    warn!(channel_id, message_id = id, error = %e, "history scan aborted");
                    report.error = Some(e.to_string());
                    break;
                }
            }

            if throttle.should_publish(report.saved) {
                let text = replies::discovery_progress(&channel.title, &report, id);
                if let Err(e) = status.publish(&text).await {
                    warn!(channel_id, error = %e, "failed to update discovery status");
                }
            }

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        info!(
            channel_id,
            saved = report.saved,
            skipped = report.skipped,
            scanned = report.scanned,
            "history scan finished"
        );
        metrics::record_job("discovery");
        self.send_final(channel, user_chat, &report).await;
        report
    }

    async fn send_final(&self, channel: &Channel, user_chat: &str, report: &DiscoveryReport) {
        let text = replies::discovery_finished(&channel.title, report);
        if let Err(e) = self.gateway.send_text(user_chat, &text).await {
            warn!(channel_id = %channel.chat_id, error = %e, "failed to send discovery report");
        }
    }
}

// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Replays a channel's backup entries into another channel.
//!
//! Every run is a fresh full pass in ascending message-id order. Sends are
//! strictly sequential with a fixed delay between them; a failed send is
//! counted and the run moves on.

use std::sync::Arc;
use std::time::Duration;

use strum::Display;
use tracing::{debug, info, warn};

use chanvault_config::model::RestoreConfig;
use chanvault_core::types::RestoreReport;
use chanvault_core::{ChannelGateway, ChanvaultError, ProgressSink};
use chanvault_storage::Repository;

use crate::metrics;
use crate::progress::ProgressThrottle;
use crate::replies;

/// Lifecycle of one restore run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RestorePhase {
    Idle,
    ScanningSource,
    Sending,
    Completed,
}

#[derive(Clone)]
pub struct RestoreOrchestrator {
    repo: Repository,
    gateway: Arc<dyn ChannelGateway>,
    config: RestoreConfig,
}

impl RestoreOrchestrator {
    pub fn new(repo: Repository, gateway: Arc<dyn ChannelGateway>, config: RestoreConfig) -> Self {
        Self {
            repo,
            gateway,
            config,
        }
    }

    async fn target_title(&self, target: &str) -> String {
        match self.gateway.get_chat(target).await {
            Ok(info) => info.display_title(),
            Err(e) => {
                debug!(target, error = %e, "could not resolve target title");
                target.to_string()
            }
        }
    }

    /// Sends every restorable entry of `source` to `target`.
    ///
    /// Only a failure to load the source entries is an error. Send failures
    /// are counted in the report, and the report is returned even when every
    /// send failed.
    pub async fn restore(
        &self,
        source: &str,
        target: &str,
        sink: &mut dyn ProgressSink,
    ) -> Result<RestoreReport, ChanvaultError> {
        let mut phase = RestorePhase::Idle;
        let title = self.target_title(target).await;
        publish(sink, &replies::restore_started(&title)).await;

        advance(&mut phase, RestorePhase::ScanningSource, source);
        let entries = self.repo.list_backups(source).await?;

        let mut report = RestoreReport {
            total: entries.len() as u64,
            ..RestoreReport::default()
        };
        let mut throttle = ProgressThrottle::new(
            self.config.progress_every,
            Duration::from_secs(self.config.progress_interval_secs),
        );
        let delay = Duration::from_millis(self.config.send_delay_ms);
        let mut sent_any = false;

        advance(&mut phase, RestorePhase::Sending, source);
        for (index, entry) in entries.iter().enumerate() {
            match entry.restorable_content() {
                None => {
                    debug!(source, message_id = entry.message_id, "nothing to send");
                    report.skipped += 1;
                }
                Some(content) => {
                    if sent_any && !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    sent_any = true;
                    match self
                        .gateway
                        .send_content(target, &content, entry.caption.as_deref())
                        .await
                    {
                        Ok(_) => {
                            report.restored += 1;
                            metrics::record_restore_send(true);
                        }
                        Err(e) => {
                            warn!(
                                source,
                                target,
                                message_id = entry.message_id,
                                error = %e,
                                "restore send failed"
                            );
                            report.failed += 1;
                            metrics::record_restore_send(false);
                        }
                    }
                }
            }

            let processed = index as u64 + 1;
            if processed < report.total && throttle.should_publish(processed) {
                publish(sink, &replies::restore_progress(&title, &report, processed)).await;
            }
        }

        advance(&mut phase, RestorePhase::Completed, source);
        info!(
            source,
            target,
            restored = report.restored,
            failed = report.failed,
            skipped = report.skipped,
            "restore finished"
        );
        metrics::record_job("restore");
        publish(sink, &replies::restore_finished(&title, &report)).await;
        Ok(report)
    }
}

fn advance(phase: &mut RestorePhase, next: RestorePhase, source: &str) {
    debug!(source, from = %phase, to = %next, "restore phase");
    *phase = next;
}

async fn publish(sink: &mut dyn ProgressSink, text: &str) {
    if let Err(e) = sink.publish(text).await {
        warn!(error = %e, "failed to publish restore progress");
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chanvault_core::BackupEntry;
    use chanvault_test_utils::{MemoryStore, MockGateway};

    use super::*;

    #[derive(Default)]
    struct Collect(Vec<String>);

    #[async_trait]
    impl ProgressSink for Collect {
        async fn publish(&mut self, text: &str) -> Result<(), ChanvaultError> {
            self.0.push(text.to_string());
            Ok(())
        }
    }

    fn config() -> RestoreConfig {
        RestoreConfig {
            send_delay_ms: 0,
            ..RestoreConfig::default()
        }
    }

    #[tokio::test]
    async fn voice_only_entries_are_skipped() {
        let repo = Repository::new(Arc::new(MemoryStore::new()));
        let gateway = Arc::new(MockGateway::new());
        repo.put_backup(
            "-1",
            &BackupEntry {
                message_id: 1,
                voice: Some("voice-1".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let orchestrator = RestoreOrchestrator::new(repo, gateway.clone(), config());
        let mut sink = Collect::default();
        let report = orchestrator.restore("-1", "-2", &mut sink).await.unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.restored + report.failed, 0);
        assert!(gateway.contents_sent_to("-2").await.is_empty());
    }

    #[tokio::test]
    async fn empty_source_reports_complete() {
        let repo = Repository::new(Arc::new(MemoryStore::new()));
        let orchestrator = RestoreOrchestrator::new(repo, Arc::new(MockGateway::new()), config());
        let mut sink = Collect::default();
        let report = orchestrator.restore("-1", "-2", &mut sink).await.unwrap();

        assert_eq!(report, RestoreReport::default());
        assert!(sink.0.last().unwrap().contains("100%"));
    }

    #[test]
    fn phase_names() {
        assert_eq!(RestorePhase::ScanningSource.to_string(), "scanning_source");
    }
}

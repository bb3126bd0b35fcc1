// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backup orchestration for chanvault.
//!
//! The [`Engine`] wires the components that act on inbound events:
//! - [`BackupRecorder`] stores live channel posts
//! - [`HistoryDiscoverer`] scans a newly registered channel backwards
//! - [`RestoreOrchestrator`] replays backups into another channel
//! - [`PeriodicReconciler`] catches up on posts the recorder missed
//! - [`CommandDispatcher`] handles operator commands in private chats
//!
//! Nothing here fails past [`Engine::handle_event`]: errors are logged and,
//! where an operator is waiting, answered with a short message.

pub mod commands;
pub mod discovery;
pub mod metrics;
pub mod notify;
pub mod probe;
pub mod progress;
pub mod reconcile;
pub mod recorder;
pub mod replies;
pub mod restore;
pub mod shutdown;
pub mod tasks;

use std::sync::Arc;

use tracing::{debug, error, warn};

use chanvault_config::model::ChanvaultConfig;
use chanvault_core::types::{InboundEvent, ReconcileReport};
use chanvault_core::{ChannelGateway, ChanvaultError, ContentStore};
use chanvault_storage::Repository;

pub use commands::CommandDispatcher;
pub use discovery::HistoryDiscoverer;
pub use notify::OwnerNotifier;
pub use probe::{ProbeRecord, Prober};
pub use progress::StatusMessage;
pub use reconcile::{ChannelSweep, PeriodicReconciler};
pub use recorder::BackupRecorder;
pub use restore::{RestoreOrchestrator, RestorePhase};
pub use tasks::BackgroundTasks;

/// Entry point for webhook deliveries and scheduled sweeps.
#[derive(Clone)]
pub struct Engine {
    repo: Repository,
    gateway: Arc<dyn ChannelGateway>,
    recorder: BackupRecorder,
    discoverer: HistoryDiscoverer,
    restorer: RestoreOrchestrator,
    reconciler: PeriodicReconciler,
    commands: CommandDispatcher,
    tasks: BackgroundTasks,
}

impl Engine {
    pub fn new(
        store: Arc<dyn ContentStore>,
        gateway: Arc<dyn ChannelGateway>,
        config: &ChanvaultConfig,
    ) -> Self {
        let repo = Repository::new(store);
        let tasks = BackgroundTasks::new();
        let notifier = OwnerNotifier::new(repo.clone(), gateway.clone());
        let recorder = BackupRecorder::new(repo.clone(), notifier.clone(), config.backup.clone());
        let discoverer =
            HistoryDiscoverer::new(repo.clone(), gateway.clone(), config.discovery.clone());
        let restorer =
            RestoreOrchestrator::new(repo.clone(), gateway.clone(), config.restore.clone());
        let reconciler = PeriodicReconciler::new(
            repo.clone(),
            gateway.clone(),
            notifier,
            config.reconcile.clone(),
        );
        let commands = CommandDispatcher::new(
            repo.clone(),
            gateway.clone(),
            recorder.clone(),
            discoverer.clone(),
            restorer.clone(),
            tasks.clone(),
        );

        Self {
            repo,
            gateway,
            recorder,
            discoverer,
            restorer,
            reconciler,
            commands,
            tasks,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn recorder(&self) -> &BackupRecorder {
        &self.recorder
    }

    pub fn discoverer(&self) -> &HistoryDiscoverer {
        &self.discoverer
    }

    pub fn restorer(&self) -> &RestoreOrchestrator {
        &self.restorer
    }

    /// Background jobs started by this engine.
    pub fn tasks(&self) -> &BackgroundTasks {
        &self.tasks
    }

    /// Handles one inbound event. Long-running work is left running in
    /// [`Engine::tasks`] when this returns.
    pub async fn handle_event(&self, event: InboundEvent) {
        match event {
            InboundEvent::ChannelPost(post) => {
                if let Err(e) = self.recorder.record_channel_post(&post).await {
                    error!(
                        channel_id = %post.chat_id,
                        message_id = post.message_id,
                        error = %e,
                        "failed to record channel post"
                    );
                }
            }
            InboundEvent::Private(msg) => {
                if let Err(e) = self.commands.handle_private(&msg).await {
                    error!(user_id = %msg.user_id, error = %e, "command failed");
                    self.apologize(&msg.chat_id).await;
                }
            }
            InboundEvent::Callback(callback) => {
                if let Err(e) = self.commands.handle_callback(&callback).await {
                    error!(user_id = %callback.user_id, error = %e, "callback failed");
                    if let Err(e) = self
                        .gateway
                        .answer_callback_query(&callback.id, Some(replies::INTERNAL_ERROR))
                        .await
                    {
                        warn!(error = %e, "failed to answer callback");
                    }
                }
            }
            InboundEvent::Ignored => debug!("ignoring unsupported update"),
        }
    }

    async fn apologize(&self, chat: &str) {
        if let Err(e) = self.gateway.send_text(chat, replies::INTERNAL_ERROR).await {
            warn!(chat, error = %e, "failed to send error reply");
        }
    }

    /// Runs one reconciliation sweep and waits for it.
    pub async fn reconcile_all(&self) -> Result<ReconcileReport, ChanvaultError> {
        self.reconciler.reconcile_all().await
    }
}

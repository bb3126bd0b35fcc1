// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator command handling in private chats.
//!
//! Commands are matched against a prefix table. Anything long-running
//! (history discovery, restore) is handed to [`BackgroundTasks`] and the
//! handler returns as soon as the acknowledgement is sent.

use std::sync::Arc;

use tracing::{debug, info, warn};

use chanvault_core::types::{CallbackEvent, ChatInfo, InlineButton, PrivateMessage, RecordResult};
use chanvault_core::{Channel, ChannelGateway, ChanvaultError};
use chanvault_storage::Repository;

use crate::discovery::HistoryDiscoverer;
use crate::progress::StatusMessage;
use crate::recorder::BackupRecorder;
use crate::replies;
use crate::restore::RestoreOrchestrator;
use crate::tasks::BackgroundTasks;

/// Callback data prefix for the restore source buttons.
const RESTORE_CALLBACK: &str = "restore:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start,
    Help,
    AddChannel,
    RemoveChannel,
    Channels,
    Restore,
    Backup,
    Done,
    Notify,
    Status,
}

const COMMANDS: &[(&str, Command)] = &[
    ("/start", Command::Start),
    ("/help", Command::Help),
    ("/addchannel", Command::AddChannel),
    ("/removechannel", Command::RemoveChannel),
    ("/channels", Command::Channels),
    ("/restore", Command::Restore),
    ("/backup", Command::Backup),
    ("/done", Command::Done),
    ("/notify", Command::Notify),
    ("/status", Command::Status),
];

/// Splits `/cmd@botname arg1 arg2` into the table entry and its arguments.
fn parse_command(text: &str) -> Option<(Command, Vec<&str>)> {
    let mut parts = text.split_whitespace();
    let head = parts.next()?;
    let name = head.split('@').next().unwrap_or(head);
    let command = COMMANDS
        .iter()
        .find(|(prefix, _)| name.eq_ignore_ascii_case(prefix))
        .map(|(_, command)| *command)?;
    Some((command, parts.collect()))
}

#[derive(Clone)]
pub struct CommandDispatcher {
    repo: Repository,
    gateway: Arc<dyn ChannelGateway>,
    recorder: BackupRecorder,
    discoverer: HistoryDiscoverer,
    restorer: RestoreOrchestrator,
    tasks: BackgroundTasks,
}

impl CommandDispatcher {
    pub fn new(
        repo: Repository,
        gateway: Arc<dyn ChannelGateway>,
        recorder: BackupRecorder,
        discoverer: HistoryDiscoverer,
        restorer: RestoreOrchestrator,
        tasks: BackgroundTasks,
    ) -> Self {
        Self {
            repo,
            gateway,
            recorder,
            discoverer,
            restorer,
            tasks,
        }
    }

    async fn reply(&self, chat: &str, text: &str) -> Result<(), ChanvaultError> {
        self.gateway.send_text(chat, text).await.map(|_| ())
    }

    /// Handles one private message from an operator.
    pub async fn handle_private(&self, msg: &PrivateMessage) -> Result<(), ChanvaultError> {
        let user_id = msg.user_id.as_str();
        let chat = msg.chat_id.as_str();

        // The pending restore session is consumed by whatever comes next.
        if let Some(source) = self.repo.pending_restore_source(user_id).await? {
            self.repo.clear_restore_session(user_id).await?;
            let reply = msg.text().map(str::trim).filter(|_| msg.post.origin.is_none());
            match reply {
                Some(target) if !target.is_empty() && !target.starts_with('/') => {
                    return self.start_restore(chat, &source, target).await;
                }
                _ => debug!(user_id, "restore session abandoned"),
            }
        }

        if msg.post.origin.is_some() {
            return self.handle_forward(msg).await;
        }

        let Some(text) = msg.text().map(str::trim).filter(|t| t.starts_with('/')) else {
            return self.reply(chat, replies::NOT_A_COMMAND).await;
        };
        let Some((command, args)) = parse_command(text) else {
            return self.reply(chat, replies::UNKNOWN_COMMAND).await;
        };
        debug!(user_id, ?command, "dispatching command");

        match command {
            Command::Start => {
                self.repo.get_or_create_user(user_id).await?;
                self.reply(chat, replies::WELCOME).await
            }
            Command::Help => self.reply(chat, replies::HELP).await,
            Command::AddChannel => match args.first() {
                Some(reference) => self.add_channel(user_id, chat, reference).await,
                None => {
                    self.reply(chat, &replies::usage("/addchannel", "<@channel|id>"))
                        .await
                }
            },
            Command::RemoveChannel => match args.first() {
                Some(reference) => self.remove_channel(user_id, chat, reference).await,
                None => {
                    self.reply(chat, &replies::usage("/removechannel", "<@channel|id>"))
                        .await
                }
            },
            Command::Channels => self.list_channels(user_id, chat).await,
            Command::Restore => match args.as_slice() {
                [] => self.offer_restore_sources(user_id, chat).await,
                [source, target] => self.restore_command(user_id, chat, source, target).await,
                _ => {
                    self.reply(chat, &replies::usage("/restore", "[<source> <target>]"))
                        .await
                }
            },
            Command::Backup => match args.first() {
                Some(reference) => self.arm_manual(user_id, chat, reference).await,
                None => {
                    self.reply(chat, &replies::usage("/backup", "<@channel|id>"))
                        .await
                }
            },
            Command::Done => {
                self.repo.disarm_manual_backup(user_id).await?;
                self.reply(chat, replies::MANUAL_DONE).await
            }
            Command::Notify => match args.first().map(|a| a.to_ascii_lowercase()).as_deref() {
                Some("on") => self.set_notify(user_id, chat, true).await,
                Some("off") => self.set_notify(user_id, chat, false).await,
                _ => self.reply(chat, &replies::usage("/notify", "on|off")).await,
            },
            Command::Status => self.status(user_id, chat).await,
        }
    }

    /// Handles an inline button press.
    pub async fn handle_callback(&self, event: &CallbackEvent) -> Result<(), ChanvaultError> {
        let user_id = event.user_id.as_str();
        let chat = event.chat_id.as_deref().unwrap_or(user_id);

        let Some(source) = event
            .data
            .as_deref()
            .and_then(|d| d.strip_prefix(RESTORE_CALLBACK))
        else {
            debug!(user_id, data = ?event.data, "unhandled callback");
            return self.gateway.answer_callback_query(&event.id, None).await;
        };

        let user = self.repo.get_or_create_user(user_id).await?;
        if !user.has_channel(source) {
            let text = replies::not_registered(source);
            self.gateway
                .answer_callback_query(&event.id, Some(&text))
                .await?;
            return Ok(());
        }

        self.repo.begin_restore_session(user_id, source).await?;
        self.gateway.answer_callback_query(&event.id, None).await?;
        self.reply(chat, replies::ASK_RESTORE_TARGET).await
    }

    /// Resolves `reference` to a channel the bot can see.
    ///
    /// On failure the operator has already been told why and `None` is returned.
    async fn resolve_channel(
        &self,
        chat: &str,
        reference: &str,
    ) -> Result<Option<ChatInfo>, ChanvaultError> {
        let info = match self.gateway.get_chat(reference).await {
            Ok(info) => info,
            Err(e) => {
                debug!(reference, error = %e, "channel lookup failed");
                self.reply(chat, &replies::channel_not_found(reference))
                    .await?;
                return Ok(None);
            }
        };
        if !info.is_channel() {
            self.reply(chat, &replies::not_a_channel(reference)).await?;
            return Ok(None);
        }
        Ok(Some(info))
    }

    async fn add_channel(
        &self,
        user_id: &str,
        chat: &str,
        reference: &str,
    ) -> Result<(), ChanvaultError> {
        let Some(info) = self.resolve_channel(chat, reference).await? else {
            return Ok(());
        };
        let channel = Channel {
            title: info.display_title(),
            chat_id: info.id,
            username: info.username,
            added_at: chrono::Utc::now().timestamp(),
        };

        let mut user = self.repo.get_or_create_user(user_id).await?;
        if !user.add_channel(channel.clone()) {
            return self.reply(chat, &replies::already_added(&channel.title)).await;
        }
        self.repo.put_user(user_id, &user).await?;
        info!(user_id, channel_id = %channel.chat_id, "channel registered");
        self.reply(chat, &replies::channel_added(&channel.title)).await?;

        let discoverer = self.discoverer.clone();
        let user_chat = chat.to_string();
        self.tasks.spawn("discovery", async move {
            discoverer.discover_history(&channel, &user_chat).await;
        });
        Ok(())
    }

    async fn remove_channel(
        &self,
        user_id: &str,
        chat: &str,
        reference: &str,
    ) -> Result<(), ChanvaultError> {
        let mut user = self.repo.get_or_create_user(user_id).await?;
        let Some(removed) = user.remove_channel(reference) else {
            return self.reply(chat, &replies::not_registered(reference)).await;
        };
        self.repo.put_user(user_id, &user).await?;
        info!(user_id, channel_id = %removed.chat_id, "channel removed");
        self.reply(chat, &replies::channel_removed(&removed.title)).await
    }

    async fn list_channels(&self, user_id: &str, chat: &str) -> Result<(), ChanvaultError> {
        let user = self.repo.get_or_create_user(user_id).await?;
        let mut rows = Vec::with_capacity(user.channels.len());
        for channel in user.channels {
            let count = self.repo.count_backups(&channel.chat_id).await?;
            rows.push((channel, count));
        }
        self.reply(chat, &replies::channel_list(&rows)).await
    }

    async fn offer_restore_sources(&self, user_id: &str, chat: &str) -> Result<(), ChanvaultError> {
        let user = self.repo.get_or_create_user(user_id).await?;
        if user.channels.is_empty() {
            return self.reply(chat, replies::NO_CHANNELS).await;
        }
        let buttons: Vec<InlineButton> = user
            .channels
            .iter()
            .map(|c| InlineButton {
                text: c.title.clone(),
                data: format!("{RESTORE_CALLBACK}{}", c.chat_id),
            })
            .collect();
        self.gateway
            .send_keyboard(chat, replies::PICK_RESTORE_SOURCE, &buttons)
            .await
            .map(|_| ())
    }

    async fn restore_command(
        &self,
        user_id: &str,
        chat: &str,
        source: &str,
        target: &str,
    ) -> Result<(), ChanvaultError> {
        let user = self.repo.get_or_create_user(user_id).await?;
        let Some(channel) = user.find_channel(source) else {
            return self.reply(chat, &replies::not_registered(source)).await;
        };
        self.start_restore(chat, &channel.chat_id, target).await
    }

    /// Resolves the target and starts a restore in the background.
    async fn start_restore(
        &self,
        chat: &str,
        source: &str,
        target: &str,
    ) -> Result<(), ChanvaultError> {
        let Some(info) = self.resolve_channel(chat, target).await? else {
            return Ok(());
        };
        info!(source, target = %info.id, "restore requested");

        let restorer = self.restorer.clone();
        let gateway = self.gateway.clone();
        let user_chat = chat.to_string();
        let source = source.to_string();
        self.tasks.spawn("restore", async move {
            let mut status = StatusMessage::new(gateway.clone(), user_chat.clone());
            if let Err(e) = restorer.restore(&source, &info.id, &mut status).await {
                warn!(source = %source, error = %e, "restore failed to start");
                if let Err(e) = gateway
                    .send_text(&user_chat, &replies::restore_failed(&e.to_string()))
                    .await
                {
                    warn!(error = %e, "failed to report restore failure");
                }
            }
        });
        Ok(())
    }

    async fn arm_manual(
        &self,
        user_id: &str,
        chat: &str,
        reference: &str,
    ) -> Result<(), ChanvaultError> {
        let user = self.repo.get_or_create_user(user_id).await?;
        let Some(channel) = user.find_channel(reference) else {
            return self.reply(chat, &replies::not_registered(reference)).await;
        };
        self.repo
            .arm_manual_backup(user_id, &channel.chat_id)
            .await?;
        self.reply(chat, &replies::manual_armed(&channel.title)).await
    }

    async fn handle_forward(&self, msg: &PrivateMessage) -> Result<(), ChanvaultError> {
        let user_id = msg.user_id.as_str();
        let chat = msg.chat_id.as_str();
        let Some(channel_id) = self.repo.armed_manual_backup(user_id).await? else {
            return self.reply(chat, replies::MANUAL_NOT_ARMED).await;
        };

        let text = match self.recorder.record_manual(user_id, &channel_id, &msg.post).await {
            Ok(RecordResult::Saved) => {
                replies::manual_saved(msg.post.origin.as_ref().map_or(0, |o| o.message_id))
            }
            Ok(RecordResult::AlreadyRecorded) => {
                replies::manual_duplicate(msg.post.origin.as_ref().map_or(0, |o| o.message_id))
            }
            Ok(RecordResult::SkippedOversized { size }) => replies::oversized(size),
            Err(ChanvaultError::InvalidInput(_)) => {
                let user = self.repo.get_or_create_user(user_id).await?;
                let title = user
                    .find_channel(&channel_id)
                    .map_or(channel_id.clone(), |c| c.title.clone());
                replies::manual_wrong_source(&title)
            }
            Err(e) => return Err(e),
        };
        self.reply(chat, &text).await
    }

    async fn set_notify(&self, user_id: &str, chat: &str, on: bool) -> Result<(), ChanvaultError> {
        self.repo.set_notifications(user_id, on).await?;
        self.reply(chat, &replies::notifications_set(on)).await
    }

    async fn status(&self, user_id: &str, chat: &str) -> Result<(), ChanvaultError> {
        let user = self.repo.get_or_create_user(user_id).await?;
        let mut backups = 0;
        for channel in &user.channels {
            backups += self.repo.count_backups(&channel.chat_id).await?;
        }
        let notifications = self.repo.notifications_enabled(user_id).await?;
        self.reply(
            chat,
            &replies::status(user.channels.len(), backups, notifications),
        )
        .await
    }
}

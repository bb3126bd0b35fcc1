// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator-facing reply texts.

use chanvault_core::types::{DiscoveryReport, ReconcileReport, RestoreReport};
use chanvault_core::Channel;

use crate::progress::{percent, progress_bar};

pub const WELCOME: &str = "👋 Welcome to chanvault.\n\n\
I keep a copy of every post in the channels you register and can replay \
them into another channel.\n\n\
1. Add me as an administrator of your channel.\n\
2. Send /addchannel @yourchannel (or the numeric id).\n\n\
Send /help for all commands.";

pub const HELP: &str = "Commands:\n\
/addchannel <@channel|id> - register a channel and back up its history\n\
/removechannel <@channel|id> - stop tracking a channel (backups are kept)\n\
/channels - list your channels\n\
/restore - pick a channel to restore\n\
/restore <source> <target> - replay a channel into another channel\n\
/backup <@channel|id> - save messages you forward to me\n\
/done - stop saving forwarded messages\n\
/notify on|off - toggle new-post notifications\n\
/status - show backup totals";

pub const UNKNOWN_COMMAND: &str = "Unknown command. Send /help for the list of commands.";
pub const NOT_A_COMMAND: &str = "Send /help to see what I can do.";
pub const NO_CHANNELS: &str = "You have no channels yet. Use /addchannel @yourchannel first.";
pub const PICK_RESTORE_SOURCE: &str = "Which channel do you want to restore?";
pub const ASK_RESTORE_TARGET: &str =
    "Send me the target channel (@handle or numeric id). I must be an administrator there.";
pub const MANUAL_NOT_ARMED: &str =
    "To save forwarded messages, start with /backup <@channel|id> first.";
pub const MANUAL_DONE: &str = "Manual backup finished.";
pub const INTERNAL_ERROR: &str = "Something went wrong while handling that. Please try again.";

pub fn usage(command: &str, args: &str) -> String {
    format!("Usage: {command} {args}")
}

pub fn channel_not_found(reference: &str) -> String {
    format!(
        "❌ I can't access {reference}. Check the handle and make sure I'm an administrator there."
    )
}

pub fn not_a_channel(reference: &str) -> String {
    format!("❌ {reference} is not a channel.")
}

pub fn not_registered(reference: &str) -> String {
    format!("❌ {reference} is not one of your channels. See /channels.")
}

pub fn already_added(title: &str) -> String {
    format!("ℹ️ {title} is already added.")
}

pub fn channel_added(title: &str) -> String {
    format!("✅ {title} added. Scanning its history now; I'll report back when done.")
}

pub fn channel_removed(title: &str) -> String {
    format!("🗑 {title} removed. Its backups are kept.")
}

pub fn channel_list(rows: &[(Channel, usize)]) -> String {
    if rows.is_empty() {
        return NO_CHANNELS.to_string();
    }
    let mut text = String::from("Your channels:\n");
    for (channel, count) in rows {
        let handle = channel
            .username
            .as_deref()
            .map(|u| format!(" @{u}"))
            .unwrap_or_default();
        text.push_str(&format!(
            "\n• {}{handle} ({}) - {count} backed up",
            channel.title, channel.chat_id
        ));
    }
    text
}

pub fn status(channels: usize, backups: usize, notifications: bool) -> String {
    let notify = if notifications { "on" } else { "off" };
    format!(
        "📊 Status\nChannels: {channels}\nBacked up messages: {backups}\nNotifications: {notify}"
    )
}

pub fn notifications_set(on: bool) -> String {
    if on {
        "🔔 Notifications are on.".to_string()
    } else {
        "🔕 Notifications are off.".to_string()
    }
}

pub fn new_post_saved(title: &str, message_id: i64) -> String {
    format!("💾 New post #{message_id} in {title} backed up.")
}

pub fn reconcile_found(title: &str, found: u64) -> String {
    format!("🔄 Periodic check found {found} new message(s) in {title}.")
}

pub fn manual_armed(title: &str) -> String {
    format!("📥 Forward messages from {title} to me. Send /done when finished.")
}

pub fn manual_saved(message_id: i64) -> String {
    format!("✅ Saved message #{message_id}.")
}

pub fn manual_duplicate(message_id: i64) -> String {
    format!("ℹ️ Message #{message_id} is already backed up.")
}

pub fn manual_wrong_source(title: &str) -> String {
    format!("❌ That message wasn't forwarded from {title}.")
}

pub fn oversized(size: u64) -> String {
    format!(
        "⚠️ Skipped: the attachment is {:.1} MiB, above the size limit.",
        size as f64 / (1024.0 * 1024.0)
    )
}

pub fn discovery_started(title: &str) -> String {
    format!("🔍 Scanning history of {title}...")
}

pub fn discovery_progress(title: &str, report: &DiscoveryReport, current_id: i64) -> String {
    format!(
        "🔍 Scanning history of {title}...\nAt message #{current_id}\nSaved: {}\nAlready backed up: {}",
        report.saved, report.skipped
    )
}

pub fn discovery_finished(title: &str, report: &DiscoveryReport) -> String {
    match &report.error {
        None => format!(
            "✅ History scan of {title} complete.\nSaved: {}\nAlready backed up: {}\nIds checked: {}",
            report.saved, report.skipped, report.scanned
        ),
        Some(error) => format!(
            "⚠️ History scan of {title} stopped early: {error}\nSaved before the error: {}",
            report.saved
        ),
    }
}

pub fn restore_started(target: &str) -> String {
    format!("♻️ Preparing restore to {target}...")
}

pub fn restore_progress(target: &str, report: &RestoreReport, processed: u64) -> String {
    let pct = percent(processed, report.total);
    format!(
        "♻️ Restoring to {target}\n{} {pct}%\nRestored: {}\nFailed: {}",
        progress_bar(pct),
        report.restored,
        report.failed
    )
}

pub fn restore_finished(target: &str, report: &RestoreReport) -> String {
    format!(
        "✅ Restore to {target} complete\n{} 100%\nRestored: {}\nFailed: {}\nSkipped: {}",
        progress_bar(100),
        report.restored,
        report.failed,
        report.skipped
    )
}

pub fn restore_failed(error: &str) -> String {
    format!("❌ Restore could not start: {error}")
}

pub fn reconcile_summary(report: &ReconcileReport) -> String {
    format!(
        "Checked {} channel(s), found {} new message(s), {} error(s).",
        report.channels, report.found, report.errors
    )
}

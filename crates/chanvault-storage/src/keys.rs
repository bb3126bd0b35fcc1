// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key scheme of the content store.
//!
//! The layout is shared with existing deployments and must not change.

pub const USER_PREFIX: &str = "user:";
pub const BACKUP_PREFIX: &str = "backup:";

pub fn user(user_id: &str) -> String {
    format!("{USER_PREFIX}{user_id}")
}

pub fn backup(channel_id: &str, message_id: i64) -> String {
    format!("{BACKUP_PREFIX}{channel_id}:{message_id}")
}

/// Prefix matching every backup of one channel, trailing colon included so
/// `-100` never matches `-1001`.
pub fn backup_prefix(channel_id: &str) -> String {
    format!("{BACKUP_PREFIX}{channel_id}:")
}

pub fn notify(user_id: &str) -> String {
    format!("notify:{user_id}")
}

pub fn restore_state(user_id: &str) -> String {
    format!("restore_state:{user_id}")
}

pub fn restore_source(user_id: &str) -> String {
    format!("restore_temp:{user_id}:source")
}

pub fn manual_backup(user_id: &str) -> String {
    format!("manual_backup:{user_id}")
}

/// Split `user:<id>` into the user id.
pub fn parse_user(key: &str) -> Option<&str> {
    key.strip_prefix(USER_PREFIX).filter(|id| !id.is_empty())
}

/// Split `backup:<channelId>:<messageId>` into its parts.
pub fn parse_backup(key: &str) -> Option<(&str, i64)> {
    let rest = key.strip_prefix(BACKUP_PREFIX)?;
    let (channel, message) = rest.rsplit_once(':')?;
    if channel.is_empty() {
        return None;
    }
    Some((channel, message.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_key_layout() {
        assert_eq!(backup("-100123", 42), "backup:-100123:42");
        assert_eq!(parse_backup("backup:-100123:42"), Some(("-100123", 42)));
    }

    #[test]
    fn malformed_backup_keys_are_rejected() {
        assert_eq!(parse_backup("backup:-100123:"), None);
        assert_eq!(parse_backup("backup::5"), None);
        assert_eq!(parse_backup("backup:-100123:abc"), None);
        assert_eq!(parse_backup("user:5"), None);
    }

    #[test]
    fn workflow_keys() {
        assert_eq!(restore_state("7"), "restore_state:7");
        assert_eq!(restore_source("7"), "restore_temp:7:source");
        assert_eq!(manual_backup("7"), "manual_backup:7");
        assert_eq!(notify("7"), "notify:7");
        assert_eq!(parse_user(&user("7")), Some("7"));
    }
}

// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Edit-in-place status reporting for long-running operations.
//!
//! A [`StatusMessage`] sends one message on first publish and edits it on
//! every later publish. [`ProgressThrottle`] bounds how often callers publish.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::debug;

use chanvault_core::{ChannelGateway, ChanvaultError, ProgressSink};

const BAR_WIDTH: usize = 10;

/// A ten-cell text progress bar.
pub fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!(
        "{}{}",
        "▓".repeat(filled),
        "░".repeat(BAR_WIDTH - filled)
    )
}

/// Integer percentage of `done` out of `total`; an empty job is complete.
pub fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    u8::try_from((done.min(total) * 100) / total).unwrap_or(100)
}

/// Decides when a progress update is due: after `every` more items, or once
/// `interval` has elapsed since the last update.
#[derive(Debug)]
pub struct ProgressThrottle {
    every: u64,
    interval: Duration,
    last_count: u64,
    last_at: Instant,
}

impl ProgressThrottle {
    pub fn new(every: u64, interval: Duration) -> Self {
        Self {
            every,
            interval,
            last_count: 0,
            last_at: Instant::now(),
        }
    }

    /// Returns `true` and resets the window when an update is due at `count`.
    pub fn should_publish(&mut self, count: u64) -> bool {
        let by_count = self.every > 0 && count.saturating_sub(self.last_count) >= self.every;
        let by_time = self.last_at.elapsed() >= self.interval;
        if by_count || by_time {
            self.last_count = count;
            self.last_at = Instant::now();
            return true;
        }
        false
    }
}

/// A single operator-visible status message, edited in place.
pub struct StatusMessage {
    gateway: Arc<dyn ChannelGateway>,
    chat: String,
    message_id: Option<i64>,
}

impl StatusMessage {
    pub fn new(gateway: Arc<dyn ChannelGateway>, chat: impl Into<String>) -> Self {
        Self {
            gateway,
            chat: chat.into(),
            message_id: None,
        }
    }

    /// Id of the status message once it has been sent.
    pub fn message_id(&self) -> Option<i64> {
        self.message_id
    }
}

#[async_trait]
impl ProgressSink for StatusMessage {
    async fn publish(&mut self, text: &str) -> Result<(), ChanvaultError> {
        match self.message_id {
            None => {
                self.message_id = Some(self.gateway.send_text(&self.chat, text).await?);
                Ok(())
            }
            Some(id) => match self.gateway.edit_message_text(&self.chat, id, text).await {
                Err(e) if e.is_not_modified() => {
                    debug!(chat = %self.chat, "status unchanged");
                    Ok(())
                }
                other => other,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use chanvault_test_utils::{GatewayCall, MockGateway};

    use super::*;

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(progress_bar(0), "░░░░░░░░░░");
        assert_eq!(progress_bar(50), "▓▓▓▓▓░░░░░");
        assert_eq!(progress_bar(100), "▓▓▓▓▓▓▓▓▓▓");
        assert_eq!(progress_bar(250), progress_bar(100));
    }

    #[test]
    fn percent_handles_empty_and_partial() {
        assert_eq!(percent(0, 0), 100);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(5, 3), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn throttle_fires_on_count_or_time() {
        let mut throttle = ProgressThrottle::new(10, Duration::from_secs(5));
        assert!(!throttle.should_publish(3));
        assert!(throttle.should_publish(10));
        assert!(!throttle.should_publish(12));

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(throttle.should_publish(13));
        assert!(!throttle.should_publish(14));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_every_means_time_only() {
        let mut throttle = ProgressThrottle::new(0, Duration::from_secs(1));
        assert!(!throttle.should_publish(1_000));
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(throttle.should_publish(1_001));
    }

    #[tokio::test]
    async fn status_is_sent_once_then_edited() {
        let gateway = Arc::new(MockGateway::new());
        let mut status = StatusMessage::new(gateway.clone(), "42");

        status.publish("step 1").await.unwrap();
        status.publish("step 2").await.unwrap();
        // Same text again: the platform rejects it as not modified.
        status.publish("step 2").await.unwrap();

        assert_eq!(status.message_id(), Some(1));
        assert_eq!(
            gateway.calls().await,
            vec![
                GatewayCall::SendText {
                    chat: "42".into(),
                    text: "step 1".into()
                },
                GatewayCall::Edit {
                    chat: "42".into(),
                    message_id: 1,
                    text: "step 2".into()
                },
                GatewayCall::Edit {
                    chat: "42".into(),
                    message_id: 1,
                    text: "step 2".into()
                },
            ]
        );
        assert_eq!(gateway.delivered_texts("42").await, vec!["step 2"]);
    }

    #[tokio::test]
    async fn other_edit_failures_propagate() {
        let gateway = Arc::new(MockGateway::new());
        let mut status = StatusMessage::new(gateway.clone(), "42");
        status.publish("step 1").await.unwrap();
        gateway.delete_message("42", 1).await.unwrap();

        let err = status.publish("step 2").await.unwrap_err();
        assert!(!err.is_not_modified());
    }
}

// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Out-of-band progress reporting for long-running operations.

use async_trait::async_trait;

use crate::error::ChanvaultError;

/// Receives progress text for one long-running operation.
///
/// Implementations show a single status message that is edited in place,
/// never a stream of new messages.
#[async_trait]
pub trait ProgressSink: Send {
    async fn publish(&mut self, text: &str) -> Result<(), ChanvaultError>;
}

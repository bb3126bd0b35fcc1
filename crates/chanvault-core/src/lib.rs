// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for chanvault.
//!
//! Provides the domain types (users, channels, backup entries, reports), the
//! error type, and the traits the orchestration engine depends on: the
//! key-value [`ContentStore`], the remote [`ChannelGateway`], and the
//! [`ProgressSink`] used for in-place status updates.

pub mod error;
pub mod traits;
pub mod types;

pub use error::ChanvaultError;
pub use traits::{ChannelGateway, ContentStore, ProgressSink};
pub use types::{
    BackupEntry, Channel, ChannelPost, ContentKind, MessageContent, Provenance, UserRecord,
};

// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seams between the orchestration engine and its collaborators.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility, so the
//! engine can hold `Arc<dyn ContentStore>` and `Arc<dyn ChannelGateway>`.

pub mod gateway;
pub mod progress;
pub mod store;

pub use gateway::ChannelGateway;
pub use progress::ProgressSink;
pub use store::ContentStore;

// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram adapter for chanvault.
//!
//! Outbound calls go through [`BotApi`], a small JSON RPC client over
//! reqwest; [`TelegramGateway`] implements the engine's
//! [`ChannelGateway`](chanvault_core::ChannelGateway) on top of it. Inbound
//! webhook updates are decoded with teloxide's models in [`handler`].

pub mod api;
pub mod gateway;
pub mod handler;

pub use api::BotApi;
pub use gateway::{BotIdentity, TelegramGateway};
pub use handler::{parse_update, to_event};

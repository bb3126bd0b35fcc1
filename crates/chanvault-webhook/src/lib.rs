// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook ingress for chanvault.
//!
//! Serves the Bot API webhook endpoint plus unauthenticated `/health` and
//! `/metrics` routes. Each delivery is decoded and handed to the
//! [`Engine`](chanvault_engine::Engine); anything long-running keeps going
//! in the background after the response is sent.

pub mod handlers;
pub mod server;

pub use server::{HealthState, WebhookState, router, start_server};

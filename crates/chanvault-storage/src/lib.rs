// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite content store for chanvault.
//!
//! Provides a WAL-mode SQLite key-value table with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`, the key scheme shared
//! with existing deployments, and a typed [`Repository`] over any
//! [`ContentStore`](chanvault_core::ContentStore).

pub mod database;
pub mod keys;
pub mod migrations;
pub mod repository;
pub mod store;

pub use database::Database;
pub use repository::{ChannelOwners, Repository};
pub use store::SqliteStore;

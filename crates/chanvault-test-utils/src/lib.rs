// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for chanvault integration tests.
//!
//! Provides test doubles for the engine's collaborators so scenarios run
//! fast and deterministically without a database or network.
//!
//! # Components
//!
//! - [`MemoryStore`] - In-memory content store with write counters
//! - [`MockGateway`] - Mock chat platform with real forward/delete semantics,
//!   recorded calls, and scripted failures
//! - [`fixtures`] - Message and event builders

pub mod fixtures;
pub mod memory_store;
pub mod mock_gateway;

pub use memory_store::MemoryStore;
pub use mock_gateway::{GatewayCall, MockGateway};

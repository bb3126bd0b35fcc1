// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value persistence substrate.

use async_trait::async_trait;

use crate::error::ChanvaultError;

/// A durable key-value mapping with prefix scans.
///
/// The store is a single logical keyspace with last-write-wins semantics.
/// Implementations must make `put` an overwrite so that repeating a write
/// for the same key never creates a second record.
#[async_trait]
pub trait ContentStore: Send + Sync + 'static {
    /// Reads the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, ChanvaultError>;

    /// Writes `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &str) -> Result<(), ChanvaultError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), ChanvaultError>;

    /// Lists the names of all keys starting with `prefix`, ascending.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, ChanvaultError>;
}

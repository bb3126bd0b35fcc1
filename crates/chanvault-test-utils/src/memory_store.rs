// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory content store for deterministic testing.
//!
//! `MemoryStore` implements `ContentStore` over a `BTreeMap` and counts
//! writes so tests can assert that a repeated operation wrote nothing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use chanvault_core::{ChanvaultError, ContentStore};

#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<BTreeMap<String, String>>,
    puts: AtomicUsize,
    deletes: AtomicUsize,
    fail_writes_after: Mutex<Option<usize>>,
    fail_all: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `put` calls so far.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Let `n` more puts succeed, then fail every later put.
    pub async fn fail_writes_after(&self, n: usize) {
        *self.fail_writes_after.lock().await = Some(self.put_count() + n);
    }

    /// Fail every operation, reads included.
    pub fn fail_everything(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of all keys, ascending.
    pub async fn keys(&self) -> Vec<String> {
        self.data.lock().await.keys().cloned().collect()
    }

    pub async fn raw(&self, key: &str) -> Option<String> {
        self.data.lock().await.get(key).cloned()
    }

    fn check(&self) -> Result<(), ChanvaultError> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(ChanvaultError::storage("memory store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ChanvaultError> {
        self.check()?;
        Ok(self.data.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), ChanvaultError> {
        self.check()?;
        if let Some(limit) = *self.fail_writes_after.lock().await
            && self.put_count() >= limit
        {
            return Err(ChanvaultError::storage("write quota exhausted"));
        }
        self.data
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), ChanvaultError> {
        self.check()?;
        self.data.lock().await.remove(key);
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, ChanvaultError> {
        self.check()?;
        Ok(self
            .data
            .lock()
            .await
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_respects_prefix_and_order() {
        let store = MemoryStore::new();
        store.put("backup:-1:2", "a").await.unwrap();
        store.put("backup:-1:10", "b").await.unwrap();
        store.put("backup:-10:1", "c").await.unwrap();
        assert_eq!(
            store.list("backup:-1:").await.unwrap(),
            vec!["backup:-1:10", "backup:-1:2"]
        );
        assert_eq!(store.put_count(), 3);
    }

    #[tokio::test]
    async fn write_failures_can_be_scripted() {
        let store = MemoryStore::new();
        store.fail_writes_after(1).await;
        store.put("a", "1").await.unwrap();
        assert!(store.put("b", "2").await.is_err());
        assert_eq!(store.put_count(), 1);
    }
}

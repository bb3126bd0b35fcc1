// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of [`ContentStore`].

use async_trait::async_trait;
use rusqlite::{OptionalExtension, params};

use chanvault_config::model::StorageConfig;
use chanvault_core::{ChanvaultError, ContentStore};

use crate::database::{Database, map_tr_err};

/// Key-value store backed by the `kv` table.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open the store described by `config`.
    pub async fn open(config: &StorageConfig) -> Result<Self, ChanvaultError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        Ok(Self { db })
    }

    pub async fn open_in_memory() -> Result<Self, ChanvaultError> {
        Ok(Self {
            db: Database::open_in_memory().await?,
        })
    }

    /// Cheap round trip used by health checks.
    pub async fn ping(&self) -> Result<(), ChanvaultError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("SELECT 1", [], |_| Ok(()))
            })
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoint the WAL before shutdown.
    pub async fn close(&self) -> Result<(), ChanvaultError> {
        self.db.checkpoint().await
    }
}

#[async_trait]
impl ContentStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ChanvaultError> {
        let key = key.to_owned();
        self.db
            .connection()
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                    row.get(0)
                })
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), ChanvaultError> {
        let key = key.to_owned();
        let value = value.to_owned();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO kv (key, value, updated_at)
                     VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                     ON CONFLICT(key) DO UPDATE SET
                         value = excluded.value,
                         updated_at = excluded.updated_at",
                    params![key, value],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn delete(&self, key: &str) -> Result<(), ChanvaultError> {
        let key = key.to_owned();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, ChanvaultError> {
        let prefix = prefix.to_owned();
        self.db
            .connection()
            .call(move |conn| -> Result<Vec<String>, rusqlite::Error> {
                // substr avoids LIKE wildcard escaping for `_` in key prefixes.
                let mut stmt = conn.prepare(
                    "SELECT key FROM kv
                     WHERE key >= ?1 AND substr(key, 1, length(?1)) = ?1
                     ORDER BY key",
                )?;
                let keys = stmt
                    .query_map(params![prefix], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(map_tr_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_overwrites_instead_of_duplicating() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store.put("user:1", "{}").await.unwrap();
        store.put("user:1", r#"{"channels":[]}"#).await.unwrap();

        assert_eq!(
            store.get("user:1").await.unwrap().as_deref(),
            Some(r#"{"channels":[]}"#)
        );
        assert_eq!(store.list("user:").await.unwrap(), vec!["user:1"]);
    }

    #[tokio::test]
    async fn list_is_prefix_exact_and_sorted() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        for key in [
            "backup:-100:2",
            "backup:-100:10",
            "backup:-1001:1",
            "notify:1",
            "restore_temp:1:source",
        ] {
            store.put(key, "x").await.unwrap();
        }

        assert_eq!(
            store.list("backup:-100:").await.unwrap(),
            vec!["backup:-100:10", "backup:-100:2"]
        );
        assert_eq!(
            store.list("restore_").await.unwrap(),
            vec!["restore_temp:1:source"]
        );
        assert!(store.list("missing:").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_key_is_ok() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store.delete("nope").await.unwrap();
        store.put("k", "v").await.unwrap();
        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        store.ping().await.unwrap();
    }
}

// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the `StateStore` trait.

use async_trait::async_trait;

use journeymap_core::{JourneymapError, StateStore};
use rusqlite::params;
use tracing::debug;

use crate::database::{map_tr_err, Database};

/// SQLite-backed persistent key-value state.
///
/// Wraps a [`Database`] handle. Values survive process restarts, which is
/// what keeps session identifiers and the consent flag stable across runs.
#[derive(Clone)]
pub struct SqliteStateStore {
    db: Database,
}

impl SqliteStateStore {
    /// Opens the state store at `path`, creating the database if needed.
    pub async fn open(path: &str) -> Result<Self, JourneymapError> {
        let db = Database::open(path).await?;
        Ok(Self { db })
    }

    /// Wraps an already-open database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Checkpoints and closes the underlying database.
    pub async fn close(&self) -> Result<(), JourneymapError> {
        self.db.close().await
    }
}

#[async_trait]
impl StateStore for SqliteStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>, JourneymapError> {
        let key = key.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                let mut stmt = conn.prepare("SELECT value FROM state WHERE key = ?1")?;
                match stmt.query_row(params![key], |row| row.get(0)) {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e),
                }
            })
            .await
            .map_err(map_tr_err)
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), JourneymapError> {
        let key = key.to_string();
        let value = value.to_string();
        self.db
            .connection()
            .call({
                let key = key.clone();
                move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO state (key, value, updated_at)
                     VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                     ON CONFLICT(key) DO UPDATE SET
                         value = excluded.value,
                         updated_at = excluded.updated_at",
                    params![key, value],
                )?;
                Ok(())
                }
            })
            .await
            .map_err(map_tr_err)?;
        debug!(key, "state value stored");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), JourneymapError> {
        let key = key.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute("DELETE FROM state WHERE key = ?1", params![key])?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

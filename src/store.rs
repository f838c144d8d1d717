//! Durable key-value state for UI preferences and selections.
//!
//! Settings and per-workspace video selections survive restarts through a
//! small SQLite-backed store. Values are stored as JSON text keyed by name,
//! so an absent key is distinguishable from any stored value.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur when reading or writing persisted state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("could not determine application data directory")]
    DataDir,
}

/// SQLite-backed key-value store.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens an in-memory store. Used in tests.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Opens a file-based store at the given path.
    ///
    /// Creates the database file if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Opens the store at its default per-user location, creating parent
    /// directories as needed.
    pub fn open_default() -> Result<Self, StoreError> {
        let path = default_store_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|_| StoreError::DataDir)?;
        }
        Self::open(path)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Reads and deserializes the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key has never been written. A stored
    /// value that no longer deserializes is also treated as absent, so a
    /// schema change in a future version degrades to defaults instead of
    /// failing.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(raw.and_then(|text| serde_json::from_str(&text).ok()))
    }

    /// Serializes and stores `value` under `key`, replacing any prior value.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let text = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, text],
        )?;
        Ok(())
    }

    /// Removes the value stored under `key`, if any.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// Returns the default store location under the per-user data directory.
pub fn default_store_path() -> Result<PathBuf, StoreError> {
    let base = dirs::data_dir().ok_or(StoreError::DataDir)?;
    Ok(base.join("vidqa").join("state.db"))
}

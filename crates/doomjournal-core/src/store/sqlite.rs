//! SQLite-backed key-value store.
//!
//! Values are stored as JSON text in a single `kv` table, one row per
//! [`StoreKey`].

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use super::{KeyValueStore, StoreKey};
use crate::error::{Result, StoreError};
use crate::storage::data_dir;

/// SQLite database holding the persisted fields.
pub struct SqliteStore {
    conn: Connection,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl SqliteStore {
    /// Open the store at `<data_dir>/doomjournal.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("doomjournal.db");
        Ok(Self::open_path(&path)?)
    }

    /// Open (or create) a store at an explicit path.
    pub fn open_path(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store.
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: StoreKey) -> Result<Option<Value>, StoreError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        raw.map(|text| {
            serde_json::from_str(&text).map_err(|e| StoreError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })
        })
        .transpose()
    }

    fn set(&self, values: &[(StoreKey, Value)]) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in values {
            tx.execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key.as_str(), value.to_string()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key.as_str()])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PassStore;
    use serde_json::json;

    #[test]
    fn kv_roundtrip() {
        let store = SqliteStore::open_memory().unwrap();
        assert_eq!(store.get(StoreKey::Enabled).unwrap(), None);
        store
            .set(&[
                (StoreKey::Enabled, json!(true)),
                (StoreKey::PassExpiresAt, json!(123)),
            ])
            .unwrap();
        assert_eq!(store.get(StoreKey::Enabled).unwrap(), Some(json!(true)));
        assert_eq!(store.get(StoreKey::PassExpiresAt).unwrap(), Some(json!(123)));

        store.remove(StoreKey::Enabled).unwrap();
        assert_eq!(store.get(StoreKey::Enabled).unwrap(), None);
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.db");
        {
            let store = PassStore::new(SqliteStore::open_path(&path).unwrap());
            store.complete_entry(None, "kept on disk", 60, 10).unwrap();
        }
        let store = PassStore::new(SqliteStore::open_path(&path).unwrap());
        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content, "kept on disk");
    }
}

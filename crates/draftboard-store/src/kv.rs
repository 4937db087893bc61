//! Key-value operations.
//!
//! Records are JSON documents under namespaced string keys; the store
//! enforces no schema beyond that.

use rusqlite::{params, OptionalExtension};
use serde_json::Value;

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// Fetch one value, or `None` when the key is absent.
    pub fn kv_get(&self, key: &str) -> Result<Option<Value>> {
        let text: Option<String> = self
            .conn()
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match text {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Insert or replace one value.
    pub fn kv_set(&self, key: &str, value: &Value) -> Result<()> {
        self.conn().execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value.to_string()],
        )?;
        Ok(())
    }

    /// Remove one value.  Removing an absent key is not an error.
    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn()
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// List every value whose key starts with `prefix`, ordered by key.
    pub fn kv_get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT value FROM kv WHERE key LIKE ?1 || '%' ORDER BY key")?;

        let rows = stmt.query_map(params![prefix], |row| row.get::<_, String>(0))?;

        let mut values = Vec::new();
        for row in rows {
            values.push(serde_json::from_str(&row?)?);
        }
        Ok(values)
    }
}

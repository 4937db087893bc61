//! v001 -- Initial schema creation.
//!
//! Creates the single `kv` table.  The primary-key index doubles as the
//! scan index for the namespaced key prefixes.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Key-value records
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS kv (
    key   TEXT PRIMARY KEY NOT NULL,   -- namespaced: user:<id>, log:<id>, ...
    value TEXT NOT NULL                -- JSON document
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}

//! SQLite-backed store. One table, one row per key.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, instrument};

use warden_core::errors::StoreError;
use warden_core::traits::{IStore, StoreResult};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv_store (
    key        TEXT PRIMARY KEY NOT NULL,
    value      BLOB NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);
";

/// Durable [`IStore`] over a single SQLite connection.
///
/// Writes are serialized on the connection mutex; the trust store already
/// serializes per principal, so contention here is across principals only.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file.
    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn open(path: &Path, busy_timeout_ms: u32) -> StoreResult<Self> {
        let conn = Connection::open(path).map_err(to_store_error)?;
        conn.busy_timeout(Duration::from_millis(u64::from(busy_timeout_ms)))
            .map_err(to_store_error)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )
        .map_err(to_store_error)?;
        Self::initialize(conn)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(to_store_error)?;
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA).map_err(to_store_error)?;
        debug!("sqlite store initialized");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::unavailable(format!("connection lock poisoned: {e}")))?;
        f(&conn).map_err(to_store_error)
    }
}

impl IStore for SqliteStore {
    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![key, value],
            )?;
            Ok(())
        })
    }

    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()
        })
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
            Ok(())
        })
    }

    fn list(&self, namespace: &str) -> StoreResult<Vec<String>> {
        let keys = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT key FROM kv_store WHERE substr(key, 1, ?2) = ?1 ORDER BY key",
            )?;
            let prefix = format!("{namespace}/");
            let rows = stmt.query_map(params![prefix, prefix.len() as i64], |row| {
                row.get::<_, String>(0)
            })?;
            rows.collect::<rusqlite::Result<Vec<String>>>()
        })?;
        Ok(keys)
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM kv_store WHERE key = ?1)",
                params![key],
                |row| row.get::<_, bool>(0),
            )
        })
    }
}

fn to_store_error(e: rusqlite::Error) -> StoreError {
    StoreError::unavailable(format!("sqlite: {e}"))
}

//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! Everything above it goes through `SnapshotBackend`.

use crate::{
    error::{StoreError, StoreResult},
    types::Timestamp,
};
use rusqlite::{params, Connection, OptionalExtension};

/// Browser local storage gives an origin about this much.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Durable key/value storage for serialized snapshots.
pub trait SnapshotBackend {
    fn read(&self, key: &str) -> StoreResult<Option<String>>;
    fn write(&self, key: &str, state_json: &str, saved_at: Timestamp) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}

pub struct SaveStore {
    conn: Connection,
    quota_bytes: usize,
}

impl SaveStore {
    /// Open (or create) the save database at `path`.
    pub fn open(path: &str) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only matters for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn, quota_bytes: DEFAULT_QUOTA_BYTES })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, quota_bytes: DEFAULT_QUOTA_BYTES })
    }

    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> StoreResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_snapshot.sql"))?;
        Ok(())
    }

    /// When the blob under `key` was last written.
    pub fn saved_at(&self, key: &str) -> StoreResult<Option<Timestamp>> {
        let saved_at = self
            .conn
            .query_row(
                "SELECT saved_at FROM snapshot WHERE key = ?1",
                params![key],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(saved_at)
    }
}

impl SnapshotBackend for SaveStore {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let json = self
            .conn
            .query_row(
                "SELECT state_json FROM snapshot WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(json)
    }

    fn write(&self, key: &str, state_json: &str, saved_at: Timestamp) -> StoreResult<()> {
        if state_json.len() > self.quota_bytes {
            return Err(StoreError::QuotaExceeded {
                size: state_json.len(),
                quota: self.quota_bytes,
            });
        }
        self.conn.execute(
            "INSERT INTO snapshot (key, state_json, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET state_json = excluded.state_json,
                                            saved_at   = excluded.saved_at",
            params![key, state_json, saved_at],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM snapshot WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// Shared handles: the engine writes through one clone while the host
/// keeps another for inspection.
impl<B: SnapshotBackend + ?Sized> SnapshotBackend for std::rc::Rc<B> {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, state_json: &str, saved_at: Timestamp) -> StoreResult<()> {
        (**self).write(key, state_json, saved_at)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}

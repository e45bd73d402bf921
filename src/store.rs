// 💾 Session Store - Durable key-value persistence for the subject list
// One fixed key, value = JSON array of subjects.
// Backends: SQLite (WAL) for real use, in-memory for tests.

use crate::subject::Subject;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Storage key scoped to this application
pub const STORAGE_KEY: &str = "grade-calculator-data";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to serialize subjects: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Stored session is corrupt: {0}")]
    Corrupt(String),

    #[error("Store write failed: {0}")]
    WriteFailed(String),
}

// ============================================================================
// STORE INTERFACE
// ============================================================================

/// Load/save capability for the subject list.
///
/// Callers treat every method as best-effort: errors are logged, never shown
/// to the user (see `Session::restore` and `Session::persist`).
pub trait SessionStore {
    /// `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<Vec<Subject>>, StoreError>;

    /// Overwrite any previously saved list
    fn save(&self, subjects: &[Subject]) -> Result<(), StoreError>;

    /// Forget the saved list entirely
    fn clear(&self) -> Result<(), StoreError>;
}

pub fn encode_subjects(subjects: &[Subject]) -> Result<String, StoreError> {
    Ok(serde_json::to_string(subjects)?)
}

/// Parse and re-validate a stored payload. Anything that would break the
/// subject invariants is reported as `Corrupt`.
pub fn decode_subjects(raw: &str) -> Result<Vec<Subject>, StoreError> {
    let subjects: Vec<Subject> =
        serde_json::from_str(raw).map_err(|e| StoreError::Corrupt(e.to_string()))?;

    let mut seen = HashSet::new();
    for subject in &subjects {
        subject.validate().map_err(StoreError::Corrupt)?;
        if !seen.insert(subject.id.as_str()) {
            return Err(StoreError::Corrupt(format!("duplicate subject id {}", subject.id)));
        }
    }

    Ok(subjects)
}

// ============================================================================
// SQLITE BACKEND
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<(), StoreError> {
    // WAL for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

pub struct SqliteStore {
    conn: Connection,
    key: String,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        setup_database(&conn)?;
        Ok(SqliteStore {
            conn,
            key: STORAGE_KEY.to_string(),
        })
    }

    /// When the list was last written, if ever
    pub fn saved_at(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM kv_store WHERE key = ?1",
                params![self.key],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(text) => DateTime::parse_from_rfc3339(&text)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|e| StoreError::Corrupt(format!("bad timestamp {:?}: {}", text, e))),
            None => Ok(None),
        }
    }

    /// Write a raw value under the store key, bypassing encoding
    pub fn put_raw(&self, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![self.key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

impl SessionStore for SqliteStore {
    fn load(&self) -> Result<Option<Vec<Subject>>, StoreError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![self.key],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|value| decode_subjects(&value)).transpose()
    }

    fn save(&self, subjects: &[Subject]) -> Result<(), StoreError> {
        let value = encode_subjects(subjects)?;
        self.put_raw(&value)
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![self.key])?;
        Ok(())
    }
}

// ============================================================================
// IN-MEMORY BACKEND
// ============================================================================

/// Keeps the encoded payload so tests can inject corrupt data and
/// simulate failing writes.
#[derive(Default)]
pub struct MemoryStore {
    value: RefCell<Option<String>>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a raw payload
    pub fn with_raw(value: &str) -> Self {
        let store = Self::new();
        *store.value.borrow_mut() = Some(value.to_string());
        store
    }

    pub fn raw(&self) -> Option<String> {
        self.value.borrow().clone()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<Subject>>, StoreError> {
        self.value
            .borrow()
            .as_deref()
            .map(decode_subjects)
            .transpose()
    }

    fn save(&self, subjects: &[Subject]) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::WriteFailed("storage unavailable".to_string()));
        }
        let value = encode_subjects(subjects)?;
        *self.value.borrow_mut() = Some(value);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::WriteFailed("storage unavailable".to_string()));
        }
        *self.value.borrow_mut() = None;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

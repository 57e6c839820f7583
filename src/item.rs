//! Stored item - the single record type persisted by the store

use serde::{Deserialize, Serialize};

/// A persisted text record.
///
/// `id` and `created_at` are assigned by SQLite on insert and never change
/// afterwards. `created_at` uses SQLite's `CURRENT_TIMESTAMP` format
/// (`YYYY-MM-DD HH:MM:SS`, UTC), so two inserts within the same second share
/// a timestamp and are ordered by `id` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredItem {
    pub id: i64,
    pub message: String,
    pub created_at: String,
}

impl StoredItem {
    pub(crate) fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            message: row.get(1)?,
            created_at: row.get(2)?,
        })
    }
}

impl std::fmt::Display for StoredItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} [{}] {}", self.id, self.created_at, self.message)
    }
}

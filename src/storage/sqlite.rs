//! SQLite storage implementation

use std::path::{Path, PathBuf};
use rusqlite::{Connection, OpenFlags, params};
use crate::{Result, Error, InitFailure};
use crate::item::StoredItem;
use super::schema;

/// Number of items `list_recent` returns when the caller has no preference
pub const DEFAULT_LIST_LIMIT: usize = 10;

/// The store operation that was running when a SQLite call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Insert,
    ListRecent,
    DeleteById,
    Count,
}

impl StoreOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOperation::Insert => "insert",
            StoreOperation::ListRecent => "list_recent",
            StoreOperation::DeleteById => "delete_by_id",
            StoreOperation::Count => "count",
        }
    }
}

impl std::fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SQLite-backed storage for stored items.
///
/// The connection is dropped by `close`; every operation afterwards fails
/// with [`Error::NotInitialized`].
pub struct ItemStore {
    conn: Option<Connection>,
    path: Option<PathBuf>,
}

impl ItemStore {
    /// Open a database file (creates it and its parent directory if missing)
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::Initialization {
                    path: path.display().to_string(),
                    source: InitFailure::Io(e),
                })?;
            }
        }

        let conn = Connection::open(path).map_err(|e| Error::Initialization {
            path: path.display().to_string(),
            source: e.into(),
        })?;
        let store = Self::initialize(conn, Some(path.to_path_buf()))?;
        tracing::info!("Database initialized at {}", path.display());
        Ok(store)
    }

    /// Open a database file that must already exist. Nothing is created on
    /// disk when it is missing.
    pub fn open_existing(path: &Path) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|e| Error::Initialization {
            path: path.display().to_string(),
            source: e.into(),
        })?;
        Self::initialize(conn, Some(path.to_path_buf()))
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::Initialization {
            path: ":memory:".to_string(),
            source: e.into(),
        })?;
        Self::initialize(conn, None)
    }

    /// Apply pragmas and create the schema
    fn initialize(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        let init_err = |e: rusqlite::Error| Error::Initialization {
            path: path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| ":memory:".to_string()),
            source: e.into(),
        };

        conn.execute_batch(&format!("PRAGMA journal_mode = {};", schema::JOURNAL_MODE))
            .map_err(init_err)?;

        for stmt in schema::all_schema_statements() {
            conn.execute(stmt, []).map_err(init_err)?;
        }

        Ok(Self { conn: Some(conn), path })
    }

    /// Path of the backing file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(Error::NotInitialized)
    }

    // ========== Item Operations ==========

    /// Insert a message and return the row as stored
    pub fn insert(&self, message: &str) -> Result<StoredItem> {
        let item = self
            .conn()?
            .query_row(
                "INSERT INTO test_items (message) VALUES (?1) RETURNING id, message, created_at",
                params![message],
                StoredItem::from_row,
            )
            .map_err(failed(StoreOperation::Insert))?;

        tracing::debug!("Added item {} ({} bytes)", item.id, item.message.len());
        Ok(item)
    }

    /// Up to `limit` items, newest first. Items sharing a timestamp are
    /// ordered by descending id.
    pub fn list_recent(&self, limit: usize) -> Result<Vec<StoredItem>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, message, created_at FROM test_items
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?1",
            )
            .map_err(failed(StoreOperation::ListRecent))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let items = stmt
            .query_map([limit], StoredItem::from_row)
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(failed(StoreOperation::ListRecent))?;

        tracing::debug!("Retrieved {} items", items.len());
        Ok(items)
    }

    /// Delete an item by id. Returns `false` when no such item exists.
    pub fn delete_by_id(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn()?
            .execute("DELETE FROM test_items WHERE id = ?1", [id])
            .map_err(failed(StoreOperation::DeleteById))?;

        tracing::debug!("Delete item {}: {}", id, if changed == 1 { "removed" } else { "not found" });
        Ok(changed == 1)
    }

    /// Count all items
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM test_items", [], |row| row.get(0))
            .map_err(failed(StoreOperation::Count))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Release the connection. Safe to call any number of times.
    pub fn close(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };

        tracing::info!("Closing database connection");
        if let Err((_conn, e)) = conn.close() {
            // The connection is dropped with `_conn`, which finalizes it anyway.
            tracing::warn!("Error closing database: {}", e);
        }
    }
}

impl Drop for ItemStore {
    fn drop(&mut self) {
        self.close();
    }
}

fn failed(operation: StoreOperation) -> impl FnOnce(rusqlite::Error) -> Error {
    move |source| Error::StoreOperationFailed { operation, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(items: &[StoredItem]) -> Vec<&str> {
        items.iter().map(|i| i.message.as_str()).collect()
    }

    #[test]
    fn test_insert_assigns_id_and_timestamp() {
        let store = ItemStore::open_in_memory().unwrap();

        let first = store.insert("hello").unwrap();
        let second = store.insert("hello").unwrap();

        assert_eq!(first.message, "hello");
        assert!(second.id > first.id);
        assert_eq!(first.created_at.len(), "2026-01-01 10:00:00".len());
    }

    #[test]
    fn test_insert_accepts_empty_message() {
        let store = ItemStore::open_in_memory().unwrap();
        let item = store.insert("").unwrap();

        let items = store.list_recent(DEFAULT_LIST_LIMIT).unwrap();
        assert_eq!(items, vec![item]);
    }

    #[test]
    fn test_list_delete_scenario() {
        let store = ItemStore::open_in_memory().unwrap();

        let hello = store.insert("hello").unwrap();
        store.insert("world").unwrap();
        assert_eq!(messages(&store.list_recent(10).unwrap()), vec!["world", "hello"]);

        assert!(store.delete_by_id(hello.id).unwrap());
        assert_eq!(messages(&store.list_recent(10).unwrap()), vec!["world"]);

        assert!(!store.delete_by_id(9999).unwrap());
        assert_eq!(messages(&store.list_recent(10).unwrap()), vec!["world"]);
    }

    #[test]
    fn test_delete_twice_returns_false_second_time() {
        let store = ItemStore::open_in_memory().unwrap();
        let item = store.insert("once").unwrap();

        assert!(store.delete_by_id(item.id).unwrap());
        assert!(!store.delete_by_id(item.id).unwrap());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_list_respects_limit() {
        let store = ItemStore::open_in_memory().unwrap();
        for i in 0..15 {
            store.insert(&format!("item {}", i)).unwrap();
        }

        let items = store.list_recent(DEFAULT_LIST_LIMIT).unwrap();
        assert_eq!(items.len(), 10);
        assert_eq!(items[0].message, "item 14");
        assert!(items.windows(2).all(|w| w[0].id > w[1].id));

        assert_eq!(store.list_recent(3).unwrap().len(), 3);
        assert!(store.list_recent(0).unwrap().is_empty());
        assert_eq!(store.count().unwrap(), 15);
    }

    #[test]
    fn test_list_orders_by_timestamp_before_id() {
        let store = ItemStore::open_in_memory().unwrap();
        store
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO test_items (message, created_at) VALUES ('later', '2999-01-01 00:00:00')",
                [],
            )
            .unwrap();
        store.insert("now").unwrap();

        assert_eq!(messages(&store.list_recent(10).unwrap()), vec!["later", "now"]);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut store = ItemStore::open_in_memory().unwrap();
        store.close();
        store.close();
        assert!(!store.is_open());
    }

    #[test]
    fn test_operations_after_close_fail() {
        let mut store = ItemStore::open_in_memory().unwrap();
        store.close();

        assert!(matches!(store.insert("x"), Err(Error::NotInitialized)));
        assert!(matches!(store.list_recent(10), Err(Error::NotInitialized)));
        assert!(matches!(store.delete_by_id(1), Err(Error::NotInitialized)));
    }

    #[test]
    fn test_file_store_persists_and_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("app.db");

        let id = {
            let store = ItemStore::open(&path).unwrap();
            let mode: String = store
                .conn()
                .unwrap()
                .query_row("PRAGMA journal_mode", [], |row| row.get(0))
                .unwrap();
            assert_eq!(mode.to_lowercase(), "wal");
            store.insert("durable").unwrap().id
        };

        let reopened = ItemStore::open(&path).unwrap();
        assert_eq!(reopened.path(), Some(path.as_path()));
        let items = reopened.list_recent(10).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id);
        assert_eq!(items[0].message, "durable");
    }

    #[test]
    fn test_open_directory_fails_initialization() {
        let dir = tempfile::tempdir().unwrap();
        let result = ItemStore::open(dir.path());
        assert!(matches!(
            result,
            Err(Error::Initialization { source: InitFailure::Sqlite(_), .. })
        ));
    }

    #[test]
    fn test_open_existing_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("app.db");

        let result = ItemStore::open_existing(&path);
        assert!(matches!(result, Err(Error::Initialization { .. })));
        assert!(!path.exists());
        assert!(!dir.path().join("missing").exists());

        let path = dir.path().join("app.db");
        ItemStore::open(&path).unwrap().insert("kept").unwrap();
        let store = ItemStore::open_existing(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_open_under_regular_file_fails_initialization() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, "not a directory").unwrap();

        let path = file.join("sub").join("app.db");
        match ItemStore::open(&path) {
            Err(Error::Initialization { path: reported, source: InitFailure::Io(_) }) => {
                assert_eq!(reported, path.display().to_string());
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_store_error_carries_operation() {
        let store = ItemStore::open_in_memory().unwrap();
        store.conn().unwrap().execute("DROP TABLE test_items", []).unwrap();

        match store.insert("x") {
            Err(Error::StoreOperationFailed { operation, .. }) => {
                assert_eq!(operation, StoreOperation::Insert)
            }
            other => panic!("unexpected result: {:?}", other),
        }
        match store.list_recent(10) {
            Err(err @ Error::StoreOperationFailed { .. }) => {
                assert!(err.to_string().starts_with("list_recent failed"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

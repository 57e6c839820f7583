//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite file with one table:
//! - test_items(id, message, created_at)

pub mod schema;
pub mod sqlite;

pub use sqlite::{ItemStore, StoreOperation, DEFAULT_LIST_LIMIT};

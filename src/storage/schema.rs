//! Database schema definitions

/// Journal mode applied on every open. WAL lets readers proceed while a
/// write is in progress.
pub const JOURNAL_MODE: &str = "WAL";

/// SQL to create the items table
pub const CREATE_ITEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS test_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    message TEXT NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_test_items_created_at ON test_items(created_at)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_ITEMS_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

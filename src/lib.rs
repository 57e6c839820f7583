//! # Itemdesk - Desktop App Template Core
//!
//! Host-side core of a desktop application template: a single-table SQLite
//! store reachable from an isolated presentation context only through a
//! fixed set of request/response endpoints.
//!
//! Itemdesk provides:
//! - `ItemStore`: SQLite-backed persistence for `StoredItem` records
//! - `Bridge`: named channels (`db:test`, `db:add-item`, ...) that never let
//!   a failure escape as anything but a `{success: false}` payload
//! - `DatabaseApi`: the whitelist of four functions the presentation context
//!   may call
//! - HTTP and stdio hosts for the bridge, plus the template `setup` step

pub mod item;
pub mod storage;
pub mod bridge;
pub mod shim;
pub mod server;
pub mod stdio;
pub mod setup;
pub mod config;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use item::StoredItem;
pub use storage::{ItemStore, StoreOperation};
pub use bridge::{Bridge, Channel};
pub use shim::DatabaseApi;

/// Result type alias for Itemdesk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Underlying cause of an [`Error::Initialization`]
#[derive(Debug, thiserror::Error)]
pub enum InitFailure {
    #[error("cannot create data directory: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// Error types for Itemdesk operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to initialize database at {path}: {source}")]
    Initialization {
        path: String,
        #[source]
        source: InitFailure,
    },

    #[error("{operation} failed: {source}")]
    StoreOperationFailed {
        operation: StoreOperation,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Database not initialized")]
    NotInitialized,

    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    #[error("Operation not exposed: {0}")]
    NotExposed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Setup error: {0}")]
    Setup(String),
}

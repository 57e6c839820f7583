//! Bridge Layer - named request/response endpoints over the store
//!
//! Every endpoint answers with a response payload; store failures are logged
//! and folded into `{success: false, ...}` so nothing raw crosses over to the
//! presentation context.

pub mod channel;
pub mod response;

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use crate::storage::{ItemStore, DEFAULT_LIST_LIMIT};
use crate::{Error, Result};

pub use channel::Channel;
pub use response::{
    AddItemResponse, DeleteItemResponse, GetItemsResponse, TestResponse, NOT_INITIALIZED,
};

/// The raw request primitive: send positional JSON arguments to a channel
/// and wait for its JSON response.
#[async_trait]
pub trait Invoke: Send + Sync {
    async fn invoke(&self, channel: Channel, args: Vec<Value>) -> Value;
}

/// Owns the store and relays channel requests to it.
///
/// The store is `None` when initialization failed or after `teardown`; every
/// endpoint then answers "Database not initialized".
pub struct Bridge {
    store: Mutex<Option<ItemStore>>,
    list_limit: usize,
}

impl Bridge {
    /// Open the store at `path` and register the endpoints.
    ///
    /// An initialization failure is logged, not returned: the bridge still
    /// comes up so the presentation context can show the error.
    pub fn setup(path: &Path) -> Self {
        tracing::info!("Setting up database bridge");
        match ItemStore::open(path) {
            Ok(store) => {
                tracing::info!("Database bridge ready");
                Self::with_store(store)
            }
            Err(e) => {
                tracing::error!("Failed to initialize database: {}", e);
                Self::uninitialized()
            }
        }
    }

    pub fn with_store(store: ItemStore) -> Self {
        Self {
            store: Mutex::new(Some(store)),
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }

    pub fn uninitialized() -> Self {
        Self {
            store: Mutex::new(None),
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }

    /// Number of items `db:get-items` and `db:test` return
    pub fn with_list_limit(mut self, limit: usize) -> Self {
        self.list_limit = limit;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().as_ref().is_some_and(ItemStore::is_open)
    }

    fn lock(&self) -> MutexGuard<'_, Option<ItemStore>> {
        // Each store call is a single autocommit statement, so a panic while
        // holding the lock cannot leave the store half-written.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn on_store<T>(&self, f: impl FnOnce(&ItemStore) -> Result<T>) -> Result<T> {
        let guard = self.lock();
        let store = guard.as_ref().ok_or(Error::NotInitialized)?;
        f(store)
    }

    // ========== Endpoints ==========

    /// `db:test` - insert a diagnostic message, then list.
    ///
    /// The insert and the list are independent statements.
    pub async fn test(&self) -> TestResponse {
        tracing::info!("Running database test");
        let result = self.on_store(|store| {
            let added = store.insert(&diagnostic_message())?;
            let items = store.list_recent(self.list_limit)?;
            Ok((added, items))
        });

        match result {
            Ok((added, items)) => {
                let response = TestResponse::ok(&added, items);
                tracing::info!("{}", response.message);
                response
            }
            Err(Error::NotInitialized) => TestResponse::failed(NOT_INITIALIZED),
            Err(e) => {
                tracing::error!("Database test error: {}", e);
                TestResponse::failed(format!("Database test failed: {}", e))
            }
        }
    }

    /// `db:add-item`
    pub async fn add_item(&self, message: &str) -> AddItemResponse {
        match self.on_store(|store| store.insert(message)) {
            Ok(item) => AddItemResponse::ok(item),
            Err(Error::NotInitialized) => AddItemResponse::failed(NOT_INITIALIZED),
            Err(e) => {
                tracing::error!("Add item error: {}", e);
                AddItemResponse::failed(format!("Failed to add item: {}", e))
            }
        }
    }

    /// `db:get-items`
    pub async fn get_items(&self) -> GetItemsResponse {
        match self.on_store(|store| store.list_recent(self.list_limit)) {
            Ok(items) => GetItemsResponse::ok(items),
            Err(Error::NotInitialized) => GetItemsResponse::failed(NOT_INITIALIZED),
            Err(e) => {
                tracing::error!("Get items error: {}", e);
                GetItemsResponse::failed(format!("Failed to get items: {}", e))
            }
        }
    }

    /// `db:delete-item`
    pub async fn delete_item(&self, id: i64) -> DeleteItemResponse {
        match self.on_store(|store| store.delete_by_id(id)) {
            Ok(removed) => DeleteItemResponse::deleted(id, removed),
            Err(Error::NotInitialized) => DeleteItemResponse::failed(NOT_INITIALIZED),
            Err(e) => {
                tracing::error!("Delete item error: {}", e);
                DeleteItemResponse::failed(format!("Failed to delete item: {}", e))
            }
        }
    }

    /// Dispatch by channel name, as received off the wire
    pub async fn invoke_named(&self, channel: &str, args: Vec<Value>) -> Result<Value> {
        let channel: Channel = channel.parse()?;
        Ok(self.dispatch(channel, args).await)
    }

    async fn dispatch(&self, channel: Channel, args: Vec<Value>) -> Value {
        match channel {
            Channel::Test => to_payload(self.test().await),
            Channel::AddItem => match arg::<String>(channel, &args, 0) {
                Ok(message) => to_payload(self.add_item(&message).await),
                Err(e) => to_payload(AddItemResponse::failed(e)),
            },
            Channel::GetItems => to_payload(self.get_items().await),
            Channel::DeleteItem => match arg::<i64>(channel, &args, 0) {
                Ok(id) => to_payload(self.delete_item(id).await),
                Err(e) => to_payload(DeleteItemResponse::failed(e)),
            },
        }
    }

    /// Close the store and drop it. Safe to call more than once.
    pub fn teardown(&self) {
        let mut guard = self.lock();
        if let Some(mut store) = guard.take() {
            tracing::info!("Cleaning up database");
            store.close();
        }
    }
}

#[async_trait]
impl Invoke for Bridge {
    async fn invoke(&self, channel: Channel, args: Vec<Value>) -> Value {
        self.dispatch(channel, args).await
    }
}

fn diagnostic_message() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("Test message {}", millis)
}

/// Decode positional argument `index` for `channel`
fn arg<T: DeserializeOwned>(channel: Channel, args: &[Value], index: usize) -> std::result::Result<T, String> {
    let value = args.get(index).cloned().unwrap_or(Value::Null);
    serde_json::from_value(value)
        .map_err(|e| format!("Invalid arguments for {}: {}", channel, e))
}

fn to_payload<T: Serialize>(response: T) -> Value {
    serde_json::to_value(response).unwrap_or_else(|e| {
        tracing::error!("Failed to serialize response: {}", e);
        serde_json::json!({ "success": false, "error": e.to_string() })
    })
}

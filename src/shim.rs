//! Context Exposure Shim - the only surface the presentation context sees
//!
//! Four functions, each forwarding to one bridge channel. The presentation
//! side never gets the store, the file system, or the raw `Invoke` handle.

use std::sync::Arc;
use serde_json::{Value, json};
use crate::bridge::{Channel, Invoke};
use crate::{Error, Result};

/// Exposed name to channel. Fixed at compile time.
pub const EXPOSED: &[(&str, Channel)] = &[
    ("test", Channel::Test),
    ("addItem", Channel::AddItem),
    ("getItems", Channel::GetItems),
    ("deleteItem", Channel::DeleteItem),
];

/// Resolve an exposed function name to its channel
pub fn lookup(name: &str) -> Option<Channel> {
    EXPOSED
        .iter()
        .find(|(exposed, _)| *exposed == name)
        .map(|(_, channel)| *channel)
}

/// The `databaseAPI` object handed to the presentation context
#[derive(Clone)]
pub struct DatabaseApi {
    ipc: Arc<dyn Invoke>,
}

impl DatabaseApi {
    pub fn new(ipc: Arc<dyn Invoke>) -> Self {
        Self { ipc }
    }

    pub async fn test(&self) -> Value {
        self.ipc.invoke(Channel::Test, Vec::new()).await
    }

    pub async fn add_item(&self, message: &str) -> Value {
        self.ipc.invoke(Channel::AddItem, vec![json!(message)]).await
    }

    pub async fn get_items(&self) -> Value {
        self.ipc.invoke(Channel::GetItems, Vec::new()).await
    }

    pub async fn delete_item(&self, id: i64) -> Value {
        self.ipc.invoke(Channel::DeleteItem, vec![json!(id)]).await
    }

    /// Call an exposed function by name with positional arguments.
    ///
    /// Names outside [`EXPOSED`] fail with [`Error::NotExposed`]; channel
    /// names such as `db:test` are not accepted here.
    pub async fn call(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        let channel = lookup(name).ok_or_else(|| Error::NotExposed(name.to_string()))?;
        tracing::debug!("{} -> {}", name, channel);
        Ok(self.ipc.invoke(channel, args).await)
    }

    /// Names of the exposed functions, in declaration order
    pub fn exposed_names() -> impl Iterator<Item = &'static str> {
        EXPOSED.iter().map(|(name, _)| *name)
    }
}

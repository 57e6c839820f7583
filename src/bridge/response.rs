//! Response payloads returned across the bridge.
//!
//! Each endpoint answers with a flat JSON object tagged by `success`. Fields
//! that do not apply to an outcome are omitted rather than sent as `null`.

use serde::{Deserialize, Serialize};
use crate::item::StoredItem;

pub const NOT_INITIALIZED: &str = "Database not initialized";

/// `db:test` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResponse {
    pub success: bool,
    pub message: String,
    pub items: Vec<StoredItem>,
}

impl TestResponse {
    pub fn ok(added: &StoredItem, items: Vec<StoredItem>) -> Self {
        Self {
            success: true,
            message: format!(
                "Database test successful! Added item with ID {}. Total items: {}",
                added.id,
                items.len()
            ),
            items,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            items: Vec::new(),
        }
    }
}

/// `db:add-item` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItemResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<StoredItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AddItemResponse {
    pub fn ok(item: StoredItem) -> Self {
        Self {
            success: true,
            message: Some(format!("Added: \"{}\"", item.message)),
            item: Some(item),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            item: None,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// `db:get-items` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetItemsResponse {
    pub success: bool,
    pub items: Vec<StoredItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GetItemsResponse {
    pub fn ok(items: Vec<StoredItem>) -> Self {
        Self { success: true, items, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            items: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// `db:delete-item` response
///
/// A missing id is a normal outcome: `success` is false and `message` says
/// so, with no `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteItemResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeleteItemResponse {
    pub fn deleted(id: i64, removed: bool) -> Self {
        let message = if removed {
            format!("Deleted item {}", id)
        } else {
            format!("Failed to delete item {}", id)
        };
        Self {
            success: removed,
            message: Some(message),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

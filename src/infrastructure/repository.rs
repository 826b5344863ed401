//! Repository trait for todo lists.
//!
//! The store holds everything in memory and never performs I/O, so the
//! operations are synchronous: callers on async tasks invoke them directly
//! without an `.await` inside the critical section.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::domain::{ItemId, KeyError, ListTitle, TodoItem};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors returned by list store operations.
///
/// Every variant is definitive ("not found now"); none is worth retrying.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No list has the given title.
    #[error("List not found")]
    NotFound(String),

    /// The list exists but holds no item with the given id.
    #[error("Item not found")]
    ItemNotFound {
        /// Title of the list that was searched.
        title: String,
        /// The id that was looked for.
        item_id: ItemId,
    },

    /// The composite key did not have exactly one separator.
    #[error("Invalid key format")]
    InvalidKey(String),

    /// The id segment of the composite key is not an integer.
    #[error("Invalid item ID")]
    InvalidItemId(String),
}

impl From<KeyError> for StoreError {
    fn from(error: KeyError) -> Self {
        match error {
            KeyError::InvalidFormat(key) => Self::InvalidKey(key),
            KeyError::InvalidItemId(segment) => Self::InvalidItemId(segment),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// A point-in-time copy of every list, keyed by title in ascending order.
pub type TodoLists = BTreeMap<String, Vec<TodoItem>>;

// =============================================================================
// List Repository
// =============================================================================

/// Operations over the shared title → items mapping.
///
/// Each call must appear atomic to concurrent callers: an existence check
/// and the mutation that depends on it happen under the same guard.
pub trait ListRepository: Send + Sync {
    /// Installs `items` under `title`, replacing any existing list wholesale.
    ///
    /// Returns a snapshot of the whole store after the write.
    fn create_or_replace(&self, title: ListTitle, items: Vec<TodoItem>) -> TodoLists;

    /// Returns a snapshot of every list.
    fn all(&self) -> TodoLists;

    /// Returns the items of one list.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if `title` is absent.
    fn get(&self, title: &str) -> Result<Vec<TodoItem>, StoreError>;

    /// Appends `item` to a list, assigning its id.
    ///
    /// Any id carried by `item` is ignored. Returns the stored item.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if `title` is absent.
    fn append_item(&self, title: &str, item: TodoItem) -> Result<TodoItem, StoreError>;

    /// The "update" operation: removes the list and returns its items.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if `title` is absent.
    fn replace(&self, title: &str) -> Result<Vec<TodoItem>, StoreError>;

    /// Removes a list.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if `title` is absent.
    fn delete(&self, title: &str) -> Result<(), StoreError>;

    /// Removes the first item matching a `"<title>/<id>"` key and returns it.
    ///
    /// The remaining items keep their relative order.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidKey`] / [`StoreError::InvalidItemId`] for a
    ///   malformed key, checked before any lookup. A bad id on a missing
    ///   list is therefore a 400, where a list-first lookup would give 404.
    /// - [`StoreError::NotFound`] if the list is absent.
    /// - [`StoreError::ItemNotFound`] if no item has the id.
    fn delete_item(&self, composite_key: &str) -> Result<TodoItem, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_key_error_conversion() {
        let error: StoreError = KeyError::InvalidFormat("Personal".to_string()).into();
        assert_eq!(error, StoreError::InvalidKey("Personal".to_string()));

        let error: StoreError = KeyError::InvalidItemId("abc".to_string()).into();
        assert_eq!(error, StoreError::InvalidItemId("abc".to_string()));
    }

    #[rstest]
    fn test_store_error_messages() {
        assert_eq!(
            StoreError::NotFound("x".to_string()).to_string(),
            "List not found"
        );
        assert_eq!(
            StoreError::ItemNotFound {
                title: "x".to_string(),
                item_id: ItemId::new(1),
            }
            .to_string(),
            "Item not found"
        );
    }
}

//! In-memory list store.
//!
//! # Features
//!
//! - One `parking_lot::Mutex` guards the whole title → list mapping
//! - Every operation runs to completion under the guard, with no `.await`
//! - Titles are kept in a `BTreeMap`, so snapshots list them in order
//! - Item ids come from a configurable [`ItemIdPolicy`]

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use parking_lot::Mutex;

use crate::domain::{ItemId, ItemKey, ListTitle, TodoItem, seed_lists};
use crate::infrastructure::{ListRepository, StoreError, TodoLists};

// =============================================================================
// Item Id Policy
// =============================================================================

/// How an appended item gets its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemIdPolicy {
    /// `number of items already in the list + 1`.
    ///
    /// After a deletion this can hand out an id that is still in use.
    #[default]
    Length,
    /// One more than the highest id the list has ever held.
    ///
    /// Ids are never reused, even after the item holding the highest id is
    /// deleted.
    Monotonic,
}

impl FromStr for ItemIdPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "length" | "len" => Ok(Self::Length),
            "monotonic" | "counter" => Ok(Self::Monotonic),
            _ => Err(value.to_string()),
        }
    }
}

impl fmt::Display for ItemIdPolicy {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length => write!(formatter, "length"),
            Self::Monotonic => write!(formatter, "monotonic"),
        }
    }
}

// =============================================================================
// Stored List
// =============================================================================

#[derive(Debug, Clone)]
struct StoredList {
    items: Vec<TodoItem>,
    /// Highest id this list has held since it was installed.
    high_water: ItemId,
}

impl StoredList {
    fn new(items: Vec<TodoItem>) -> Self {
        let high_water = items.iter().map(|item| item.id).max().unwrap_or_default();
        Self { items, high_water }
    }

    fn next_id(&self, policy: ItemIdPolicy) -> ItemId {
        match policy {
            ItemIdPolicy::Length => {
                let count = i32::try_from(self.items.len()).unwrap_or(i32::MAX);
                ItemId::new(count).next()
            }
            ItemIdPolicy::Monotonic => self.high_water.next(),
        }
    }

    fn push(&mut self, item: TodoItem) {
        self.high_water = self.high_water.max(item.id);
        self.items.push(item);
    }
}

// =============================================================================
// In-Memory List Store
// =============================================================================

/// The process-wide list store.
///
/// # Example
///
/// ```
/// use todo_lists_api::domain::TodoItem;
/// use todo_lists_api::infrastructure::{InMemoryListStore, ListRepository};
///
/// let store = InMemoryListStore::seeded();
/// let item = store
///     .append_item("Personal", TodoItem::new(0, "x", false))
///     .unwrap();
/// assert_eq!(item.id.value(), 4);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryListStore {
    lists: Mutex<BTreeMap<String, StoredList>>,
    id_policy: ItemIdPolicy,
}

impl InMemoryListStore {
    /// Creates an empty store using the default id policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store using `id_policy`.
    #[must_use]
    pub fn with_id_policy(id_policy: ItemIdPolicy) -> Self {
        Self {
            lists: Mutex::new(BTreeMap::new()),
            id_policy,
        }
    }

    /// Creates a store holding the seed lists, using the default id policy.
    #[must_use]
    pub fn seeded() -> Self {
        Self::seeded_with_id_policy(ItemIdPolicy::default())
    }

    /// Creates a store holding the seed lists, using `id_policy`.
    #[must_use]
    pub fn seeded_with_id_policy(id_policy: ItemIdPolicy) -> Self {
        let lists = seed_lists()
            .into_iter()
            .map(|(title, items)| (title.into_inner(), StoredList::new(items)))
            .collect();
        Self {
            lists: Mutex::new(lists),
            id_policy,
        }
    }

    /// Returns the id policy in effect.
    #[must_use]
    pub const fn id_policy(&self) -> ItemIdPolicy {
        self.id_policy
    }
}

fn snapshot(lists: &BTreeMap<String, StoredList>) -> TodoLists {
    lists
        .iter()
        .map(|(title, list)| (title.clone(), list.items.clone()))
        .collect()
}

#[allow(clippy::significant_drop_tightening)]
impl ListRepository for InMemoryListStore {
    fn create_or_replace(&self, title: ListTitle, items: Vec<TodoItem>) -> TodoLists {
        let mut guard = self.lists.lock();
        tracing::debug!(title = %title, items = items.len(), "Installing list");
        guard.insert(title.into_inner(), StoredList::new(items));
        snapshot(&guard)
    }

    fn all(&self) -> TodoLists {
        snapshot(&self.lists.lock())
    }

    fn get(&self, title: &str) -> Result<Vec<TodoItem>, StoreError> {
        self.lists
            .lock()
            .get(title)
            .map(|list| list.items.clone())
            .ok_or_else(|| StoreError::NotFound(title.to_string()))
    }

    fn append_item(&self, title: &str, item: TodoItem) -> Result<TodoItem, StoreError> {
        let mut guard = self.lists.lock();
        let list = guard
            .get_mut(title)
            .ok_or_else(|| StoreError::NotFound(title.to_string()))?;

        let stored = item.with_id(list.next_id(self.id_policy));
        list.push(stored.clone());
        tracing::debug!(title, item_id = %stored.id, "Appended item");
        Ok(stored)
    }

    fn replace(&self, title: &str) -> Result<Vec<TodoItem>, StoreError> {
        let removed = self
            .lists
            .lock()
            .remove(title)
            .ok_or_else(|| StoreError::NotFound(title.to_string()))?;
        tracing::debug!(title, items = removed.items.len(), "Replaced list by removal");
        Ok(removed.items)
    }

    fn delete(&self, title: &str) -> Result<(), StoreError> {
        self.lists
            .lock()
            .remove(title)
            .ok_or_else(|| StoreError::NotFound(title.to_string()))?;
        tracing::debug!(title, "Deleted list");
        Ok(())
    }

    fn delete_item(&self, composite_key: &str) -> Result<TodoItem, StoreError> {
        let key = ItemKey::parse(composite_key)?;

        let mut guard = self.lists.lock();
        let list = guard
            .get_mut(key.title)
            .ok_or_else(|| StoreError::NotFound(key.title.to_string()))?;

        let position = list
            .items
            .iter()
            .position(|item| item.id == key.item_id)
            .ok_or_else(|| StoreError::ItemNotFound {
                title: key.title.to_string(),
                item_id: key.item_id,
            })?;

        let removed = list.items.remove(position);
        tracing::debug!(title = key.title, item_id = %removed.id, "Deleted item");
        Ok(removed)
    }
}

// =============================================================================
// Tests
// =============================================================================

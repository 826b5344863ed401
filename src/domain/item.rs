//! Todo item and list value types.
//!
//! Items are plain values: the store owns them and hands out clones, so
//! nothing here carries interior mutability.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Identifier of an item within its owning list.
///
/// Ids are only unique per list and are not stable across deletions, so
/// this wraps the raw `i32` used on the wire without adding any global
/// meaning.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(i32);

impl ItemId {
    /// Creates an `ItemId` from its raw value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Returns the id following this one, saturating at `i32::MAX`.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = std::num::ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.parse::<i32>().map(Self)
    }
}

impl From<i32> for ItemId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// Title of a list.
///
/// The title is the list's only identifier, so an empty one is rejected
/// at construction and never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ListTitle(String);

impl ListTitle {
    /// Creates a title, returning `None` when `title` is empty.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title: String = title.into();
        if title.is_empty() {
            None
        } else {
            Some(Self(title))
        }
    }

    /// Returns the title as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the title and returns the owned string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ListTitle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl AsRef<str> for ListTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Todo Item
// =============================================================================

/// A single entry of a todo list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Identifier, unique within the owning list at any instant.
    pub id: ItemId,
    /// Free-form text.
    pub text: String,
    /// Whether the item is done.
    pub completed: bool,
}

impl TodoItem {
    /// Creates an item.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, text: impl Into<String>, completed: bool) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            completed,
        }
    }

    /// Returns a copy of this item carrying `id` instead of its own.
    #[must_use]
    pub fn with_id(self, id: ItemId) -> Self {
        Self { id, ..self }
    }
}

// =============================================================================
// Tests
// =============================================================================

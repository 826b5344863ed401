//! Domain module for todo lists.
//!
//! This module contains the item and title value types, composite key
//! parsing and the seed data.

pub mod item;
pub mod key;
pub mod seed;

pub use item::{ItemId, ListTitle, TodoItem};
pub use key::{ItemKey, KEY_SEPARATOR, KeyError, split_key};
pub use seed::seed_lists;

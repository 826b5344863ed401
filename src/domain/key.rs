//! Composite `"<title>/<id>"` keys used to address a single item.

use thiserror::Error;

use super::item::ItemId;

/// Separator between the list title and the item id.
pub const KEY_SEPARATOR: char = '/';

/// Reasons a composite key cannot be parsed.
///
/// A malformed key is a format problem, never a lookup miss, so these are
/// kept apart from the store's not-found errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The key did not split into exactly two segments.
    #[error("Invalid key format")]
    InvalidFormat(String),

    /// The second segment is not a 32-bit integer.
    #[error("Invalid item ID")]
    InvalidItemId(String),
}

/// A parsed composite key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemKey<'a> {
    /// Title of the list holding the item. May be empty.
    pub title: &'a str,
    /// Id of the item inside that list.
    pub item_id: ItemId,
}

impl<'a> ItemKey<'a> {
    /// Parses `"<title>/<id>"`.
    ///
    /// # Errors
    ///
    /// - [`KeyError::InvalidFormat`] unless the key contains exactly one `/`.
    /// - [`KeyError::InvalidItemId`] if the id segment is not an `i32`.
    pub fn parse(key: &'a str) -> Result<Self, KeyError> {
        let (title, id) = split_key(key)?;
        let item_id = id
            .parse::<ItemId>()
            .map_err(|_| KeyError::InvalidItemId(id.to_string()))?;

        Ok(Self { title, item_id })
    }
}

/// Splits a composite key on its single separator.
///
/// # Errors
///
/// Returns [`KeyError::InvalidFormat`] when the key has zero or more than
/// one separator.
pub fn split_key(key: &str) -> Result<(&str, &str), KeyError> {
    let mut segments = key.split(KEY_SEPARATOR);
    match (segments.next(), segments.next(), segments.next()) {
        (Some(title), Some(id), None) => Ok((title, id)),
        _ => Err(KeyError::InvalidFormat(key.to_string())),
    }
}

// =============================================================================
// Tests
// =============================================================================

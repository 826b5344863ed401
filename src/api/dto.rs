//! Request payloads and query parameters.
//!
//! Bodies are decoded from raw bytes so a missing or unexpected
//! `Content-Type` never changes the outcome; every item field defaults to
//! its zero value and unknown fields are ignored.

use serde::Deserialize;

use super::error::ApiErrorResponse;
use crate::domain::TodoItem;

/// Item as accepted in request bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TodoItemPayload {
    /// Kept by `POST /todos`, replaced by the store on append.
    pub id: i32,
    pub text: String,
    pub completed: bool,
}

impl From<TodoItemPayload> for TodoItem {
    fn from(payload: TodoItemPayload) -> Self {
        Self::new(payload.id, payload.text, payload.completed)
    }
}

/// Query string of `POST /todos`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateListQuery {
    #[serde(default)]
    pub title: Option<String>,
}

/// Decodes a JSON array of items; `null` is an empty list.
///
/// # Errors
///
/// Returns a 400 carrying the decoder message if the body is not valid.
pub fn decode_items(body: &[u8]) -> Result<Vec<TodoItem>, ApiErrorResponse> {
    let payloads: Option<Vec<TodoItemPayload>> =
        serde_json::from_slice(body).map_err(|error| ApiErrorResponse::decode(&error))?;

    Ok(payloads
        .unwrap_or_default()
        .into_iter()
        .map(TodoItem::from)
        .collect())
}

/// Decodes a single JSON item; `null` is an item with every field zeroed.
///
/// # Errors
///
/// Returns a 400 carrying the decoder message if the body is not valid.
pub fn decode_item(body: &[u8]) -> Result<TodoItem, ApiErrorResponse> {
    let payload: Option<TodoItemPayload> =
        serde_json::from_slice(body).map_err(|error| ApiErrorResponse::decode(&error))?;

    Ok(TodoItem::from(payload.unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use rstest::rstest;

    #[rstest]
    fn test_decode_items_keeps_ids_and_order() {
        let items = decode_items(br#"[{"id":5,"text":"a","completed":true},{"id":2,"text":"b"}]"#)
            .unwrap();

        assert_eq!(
            items,
            vec![TodoItem::new(5, "a", true), TodoItem::new(2, "b", false)]
        );
    }

    #[rstest]
    #[case(b"null".as_slice())]
    #[case(b"[]".as_slice())]
    fn test_decode_items_empty(#[case] body: &[u8]) {
        assert_eq!(decode_items(body), Ok(Vec::new()));
    }

    #[rstest]
    #[case(b"".as_slice())]
    #[case(b"{\"text\":\"x\"}".as_slice())]
    #[case(b"[{\"id\":\"one\"}]".as_slice())]
    fn test_decode_items_rejects_malformed(#[case] body: &[u8]) {
        let error = decode_items(body).unwrap_err();

        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert!(!error.message.is_empty());
    }

    #[rstest]
    fn test_decode_item_defaults_and_ignores_unknown_fields() {
        let item = decode_item(br#"{"text":"x","priority":"high"}"#).unwrap();

        assert_eq!(item, TodoItem::new(0, "x", false));
    }

    #[rstest]
    fn test_decode_item_null_is_zero_valued() {
        assert_eq!(decode_item(b"null"), Ok(TodoItem::new(0, "", false)));
    }

    #[rstest]
    fn test_decode_item_rejects_wrong_field_type() {
        let error = decode_item(br#"{"completed":"yes"}"#).unwrap_err();

        assert_eq!(error.status, StatusCode::BAD_REQUEST);
    }
}

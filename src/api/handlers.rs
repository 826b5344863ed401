//! HTTP handlers for the `/todos` routes.
//!
//! Handlers are thin adapters: they extract path, query and body, call one
//! store operation and turn the result into a response. The store never
//! awaits, so no handler holds the store guard across an `.await`.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};

use super::dto::{CreateListQuery, decode_item, decode_items};
use super::error::{ApiErrorResponse, MISSING_TITLE_MESSAGE};
use crate::domain::{ListTitle, TodoItem};
use crate::infrastructure::{IdentityProvider, ListRepository, TodoLists};

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
///
/// Uses trait objects so the binary and the tests can plug in different
/// identity providers without changing the router type.
#[derive(Clone)]
pub struct AppState {
    /// The list store.
    pub store: Arc<dyn ListRepository + Send + Sync>,
    /// Identity provider used by `/auth` and the token gate.
    pub identity: Arc<dyn IdentityProvider + Send + Sync>,
    /// Whether `/todos` requires a verified bearer token.
    pub require_auth: bool,
}

impl AppState {
    /// Creates state with the token gate disabled.
    #[must_use]
    pub fn new(
        store: Arc<dyn ListRepository + Send + Sync>,
        identity: Arc<dyn IdentityProvider + Send + Sync>,
    ) -> Self {
        Self {
            store,
            identity,
            require_auth: false,
        }
    }

    /// Enables or disables the token gate.
    #[must_use]
    pub const fn with_require_auth(mut self, require_auth: bool) -> Self {
        self.require_auth = require_auth;
        self
    }
}

// =============================================================================
// POST /todos?title=T
// =============================================================================

/// Creates or replaces the list named by the `title` query parameter.
///
/// The body is a JSON array of items, stored as given.
///
/// # Response
///
/// - **200 OK**: every list in the store, keyed by title
/// - **400 Bad Request**: `title` missing or empty, or body undecodable
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] with status 400 for a missing title or a
/// malformed body.
pub async fn create_list(
    State(state): State<AppState>,
    Query(query): Query<CreateListQuery>,
    body: Bytes,
) -> Result<Json<TodoLists>, ApiErrorResponse> {
    let title = query
        .title
        .and_then(ListTitle::new)
        .ok_or_else(|| ApiErrorResponse::bad_request(MISSING_TITLE_MESSAGE))?;
    let items = decode_items(&body)?;

    Ok(Json(state.store.create_or_replace(title, items)))
}

// =============================================================================
// GET /todos
// =============================================================================

/// Returns every list keyed by title.
pub async fn list_all(State(state): State<AppState>) -> Json<TodoLists> {
    Json(state.store.all())
}

// =============================================================================
// GET /todos/{key}
// =============================================================================

/// Returns the items of one list.
///
/// # Errors
///
/// A missing list answers **400**, not 404, on this route.
pub async fn get_list(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Vec<TodoItem>>, ApiErrorResponse> {
    state
        .store
        .get(&key)
        .map(Json)
        .map_err(|error| ApiErrorResponse::from(error).with_status(StatusCode::BAD_REQUEST))
}

// =============================================================================
// PUT /todos/{key}
// =============================================================================

/// The "update" route. It removes the list, exactly like `DELETE`.
///
/// # Errors
///
/// Returns 404 if the list does not exist.
pub async fn update_list(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiErrorResponse> {
    state.store.replace(&key)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// DELETE /todos/{key}
// =============================================================================

/// Deletes a list.
///
/// # Errors
///
/// Returns 404 if the list does not exist.
pub async fn delete_list(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiErrorResponse> {
    state.store.delete(&key)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// PUT /todos/item/{key}
// =============================================================================

/// Appends an item to a list and returns it with its assigned id.
///
/// The body is decoded before the list is looked up.
///
/// # Errors
///
/// - 400 if the body is undecodable
/// - 404 if the list does not exist
pub async fn append_item(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<Json<TodoItem>, ApiErrorResponse> {
    let item = decode_item(&body)?;
    let stored = state.store.append_item(&key, item)?;
    Ok(Json(stored))
}

// =============================================================================
// DELETE /todos/item/{key}
// =============================================================================

/// Deletes one item addressed by a `"<title>/<id>"` key.
///
/// # Errors
///
/// - 400 if the key is malformed or the id is not an integer
/// - 404 if the list or the item does not exist
pub async fn delete_item(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiErrorResponse> {
    state.store.delete_item(&key)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// GET /health
// =============================================================================

/// Health check response body.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =============================================================================
// Tests
// =============================================================================

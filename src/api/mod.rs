//! API module for HTTP handlers.
//!
//! This module contains route definitions and request/response handlers.

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;

pub use auth::{bearer_token, get_user, require_token};
pub use dto::{CreateListQuery, TodoItemPayload};
pub use error::ApiErrorResponse;
pub use handlers::{
    AppState, HealthResponse, append_item, create_list, delete_item, delete_list, get_list,
    health_check, list_all, update_list,
};
pub use router::router;

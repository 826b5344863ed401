//! API error handling.
//!
//! Errors are answered with a status code and a plain-text body holding
//! the error message verbatim.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::infrastructure::{IdentityError, StoreError};

/// Message returned when `POST /todos` has no usable `title` parameter.
pub const MISSING_TITLE_MESSAGE: &str = "Please pass a title in the query parameter";

// =============================================================================
// API Error Response
// =============================================================================

/// API error response containing status code and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Body text.
    pub message: String,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request response.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates the 400 answered for an undecodable request body.
    #[must_use]
    pub fn decode(error: &serde_json::Error) -> Self {
        Self::bad_request(error.to_string())
    }

    /// Returns the same message under a different status.
    #[must_use]
    pub fn with_status(self, status: StatusCode) -> Self {
        Self { status, ..self }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

impl From<StoreError> for ApiErrorResponse {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(_) | StoreError::ItemNotFound { .. } => {
                Self::not_found(error.to_string())
            }
            StoreError::InvalidKey(_) | StoreError::InvalidItemId(_) => {
                Self::bad_request(error.to_string())
            }
        }
    }
}

impl From<IdentityError> for ApiErrorResponse {
    fn from(error: IdentityError) -> Self {
        Self::bad_request(error.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================

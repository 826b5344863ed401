//! Identity routes and the bearer-token gate.

use axum::{
    Json,
    extract::{Path, Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use super::error::ApiErrorResponse;
use super::handlers::AppState;
use crate::infrastructure::UserRecord;

// =============================================================================
// GET /auth/{userUid}
// =============================================================================

/// Looks up a user account by uid.
///
/// # Errors
///
/// Any identity provider failure answers 400 with the provider's message.
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_uid): Path<String>,
) -> Result<Json<UserRecord>, ApiErrorResponse> {
    let user = state.identity.lookup_user(&user_uid).await?;
    Ok(Json(user))
}

// =============================================================================
// Token gate
// =============================================================================

/// Returns the credential part of an `Authorization: <scheme> <token>`
/// header, or an empty string when there is none.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> &str {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(' ').nth(1))
        .unwrap_or_default()
}

/// Middleware that lets a request through only with a verified token.
///
/// The verified [`UserIdentity`](crate::infrastructure::UserIdentity) is
/// stored in the request extensions for downstream handlers.
///
/// # Errors
///
/// Verification failures answer 400 with the provider's message.
pub async fn require_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiErrorResponse> {
    let token = bearer_token(request.headers()).to_string();
    let identity = state
        .identity
        .verify_token(&token)
        .await
        .inspect_err(|error| {
            tracing::warn!(
                %error,
                provider = state.identity.provider_name(),
                "Token verification failed"
            );
        })?;

    tracing::debug!(uid = %identity.uid, "User successfully authenticated");
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

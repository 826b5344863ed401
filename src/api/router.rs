//! Route table.

use axum::{
    Router, middleware,
    routing::{get, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::auth::{get_user, require_token};
use super::handlers::{
    AppState, append_item, create_list, delete_item, delete_list, get_list, health_check,
    list_all, update_list,
};

/// Builds the application router.
///
/// `/todos` routes sit behind [`require_token`] when
/// [`AppState::require_auth`] is set; `/auth` and `/health` never do.
///
/// `/todos/item/{*key}` is a catch-all so the composite `"title/id"` key
/// may arrive either percent-encoded or as two raw segments.
pub fn router(state: AppState) -> Router {
    let todos = Router::new()
        .route("/todos", get(list_all).post(create_list))
        .route(
            "/todos/{key}",
            get(get_list).put(update_list).delete(delete_list),
        )
        .route("/todos/item/{*key}", put(append_item).delete(delete_item));

    let todos = if state.require_auth {
        todos.route_layer(middleware::from_fn_with_state(state.clone(), require_token))
    } else {
        todos
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/{user_uid}", get(get_user))
        .merge(todos)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

//! Common test helpers for integration tests.
//!
//! Builds routers over a seeded in-memory store and drives them with
//! `tower::ServiceExt::oneshot`, so no socket is opened.
//!
//! # Note
//!
//! Each integration test file is compiled as its own crate, so helpers used
//! by only one of them would otherwise trip dead code warnings.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use todo_lists_api::api::{AppState, router};
use todo_lists_api::infrastructure::{
    IdentityError, InMemoryListStore, ItemIdPolicy, StubIdentityProvider, UserRecord,
};

pub const TEST_TOKEN: &str = "valid-token";
pub const TEST_UID: &str = "user-1";

// =============================================================================
// AppState Creation Helpers
// =============================================================================

/// The user known to [`stub_identity`].
pub fn test_user() -> UserRecord {
    UserRecord::new(TEST_UID).with_email("user@example.com")
}

/// An identity provider that accepts [`TEST_TOKEN`] for [`test_user`].
pub fn stub_identity() -> StubIdentityProvider {
    StubIdentityProvider::with_user(TEST_TOKEN, test_user())
}

/// Seeded store, stub identity, no token gate.
pub fn create_test_app_state() -> AppState {
    create_test_app_state_with_policy(ItemIdPolicy::Length)
}

pub fn create_test_app_state_with_policy(policy: ItemIdPolicy) -> AppState {
    AppState::new(
        Arc::new(InMemoryListStore::seeded_with_id_policy(policy)),
        Arc::new(stub_identity()),
    )
}

/// Seeded store with an identity provider that fails every call.
pub fn create_test_app_state_with_failing_identity(error: IdentityError) -> AppState {
    AppState::new(
        Arc::new(InMemoryListStore::seeded()),
        Arc::new(StubIdentityProvider::with_error(error)),
    )
}

pub fn test_router() -> Router {
    router(create_test_app_state())
}

pub fn gated_router() -> Router {
    router(create_test_app_state().with_require_auth(true))
}

// =============================================================================
// Request Helpers
// =============================================================================

/// A response with its body fully collected.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body should be JSON")
    }
}

pub fn request(method: Method, uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .expect("request should build")
}

pub fn request_with_token(method: Method, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build")
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes()
        .to_vec();

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, request(Method::GET, uri, Body::empty())).await
}

/// Returns the ids of the items in `title`, read through `GET /todos`.
pub async fn item_ids(app: &Router, title: &str) -> Vec<i64> {
    let all = get(app, "/todos").await.json();
    all[title]
        .as_array()
        .expect("list should exist")
        .iter()
        .map(|item| item["id"].as_i64().expect("id should be an integer"))
        .collect()
}

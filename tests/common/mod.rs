// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use digicard::config::{AuthMode, Config};
use digicard::db::{new_document_id, FirestoreDb, MemoryDb, UserRepository};
use digicard::middleware::auth::{DemoAuthResolver, JwtAuthResolver};
use digicard::models::User;
use digicard::routes::create_router;
use digicard::services::password::hash_password;
use digicard::time_utils::now_rfc3339;
use digicard::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a Firestore emulator connection.
#[allow(dead_code)]
pub async fn test_firestore() -> FirestoreDb {
    FirestoreDb::new("test-project", "(default)")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Demo-auth app over a fresh in-memory store.
/// Returns the router, the shared state and a handle on the store.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>, MemoryDb) {
    let db = MemoryDb::new();
    let state = Arc::new(AppState {
        config: Config::test_default(),
        store: Some(Arc::new(db.clone())),
        auth: Arc::new(DemoAuthResolver),
    });
    (create_router(state.clone()), state, db)
}

/// JWT-auth app over a fresh in-memory store.
#[allow(dead_code)]
pub fn create_jwt_test_app() -> (Router, Arc<AppState>, MemoryDb) {
    let db = MemoryDb::new();
    let config = Config {
        auth_mode: AuthMode::Jwt,
        ..Config::test_default()
    };
    let state = Arc::new(AppState {
        auth: Arc::new(JwtAuthResolver::new(config.jwt_signing_key.clone())),
        config,
        store: Some(Arc::new(db.clone())),
    });
    (create_router(state.clone()), state, db)
}

/// App with no document store configured.
#[allow(dead_code)]
pub fn create_unconfigured_app() -> Router {
    let state = Arc::new(AppState {
        config: Config {
            store: None,
            ..Config::test_default()
        },
        store: None,
        auth: Arc::new(DemoAuthResolver),
    });
    create_router(state)
}

/// Insert a user directly into the store.
#[allow(dead_code)]
pub async fn seed_user(db: &MemoryDb, name: &str, slug: &str, is_admin: bool) -> User {
    let now = now_rfc3339();
    let user = User {
        id: new_document_id().unwrap(),
        name: name.to_string(),
        email: format!("{}@example.com", slug),
        password_hash: hash_password("password123").unwrap(),
        is_admin,
        profile_slug: Some(slug.to_string()),
        created_at: now.clone(),
        updated_at: now,
    };
    db.insert_user(&user).await.unwrap();
    user
}

/// Response pieces returned by [`send`].
#[allow(dead_code)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

#[allow(dead_code)]
impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body should be JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("response body should be UTF-8")
    }
}

/// Send one request through the router.
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();

    TestResponse {
        status,
        headers,
        body,
    }
}

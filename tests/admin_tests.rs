// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin user management tests.
//!
//! Demo auth acts as the demo user, who is an admin.

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use digicard::config::Config;
use digicard::db::{
    new_document_id, DocumentStore, MemoryDb, ProfileRepository, SocialLinkRepository,
    UserRepository,
};
use digicard::error::{AppError, Result};
use digicard::middleware::auth::DemoAuthResolver;
use digicard::models::{AdminUserUpdate, Profile, ProfileUpdate, SocialLink, User};
use digicard::routes::create_router;
use digicard::time_utils::now_rfc3339;
use digicard::AppState;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

mod common;
use common::{create_test_app, seed_user, send};

async fn seed_dependents(db: &MemoryDb, user: &User) {
    let update = ProfileUpdate {
        company: Some(format!("{} Inc", user.name)),
        ..Default::default()
    };
    db.upsert_profile(&user.id, &update).await.unwrap();

    let now = now_rfc3339();
    for platform in ["website", "github"] {
        db.insert_social_link(&SocialLink {
            id: new_document_id().unwrap(),
            user_id: user.id.clone(),
            platform: platform.to_string(),
            url: format!("https://{}.example/{}", platform, user.id),
            created_at: now.clone(),
            updated_at: now.clone(),
        })
        .await
        .unwrap();
    }
}

#[tokio::test]
async fn test_list_users_hides_credentials() {
    let (app, _, db) = create_test_app();
    seed_user(&db, "Jane Doe", "jane", false).await;

    let response = send(&app, Method::GET, "/api/admin/users", None, None).await;
    assert_eq!(response.status, StatusCode::OK);

    let users = response.json();
    let users = users.as_array().unwrap();
    // Seeded user plus the bootstrapped demo user
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["name"], "Jane Doe");
    assert_eq!(users[1]["name"], "Flames Blue");
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));
}

#[tokio::test]
async fn test_get_user_id_policy() {
    let (app, _, db) = create_test_app();
    let jane = seed_user(&db, "Jane Doe", "jane", false).await;

    let response = send(
        &app,
        Method::GET,
        &format!("/api/admin/users/{}", jane.id),
        None,
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["email"], "jane@example.com");

    let unknown = new_document_id().unwrap();
    for method in [Method::GET, Method::DELETE] {
        let response = send(
            &app,
            method.clone(),
            &format!("/api/admin/users/{}", unknown),
            None,
            None,
        )
        .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{}", method);
        assert_eq!(response.json(), json!({"detail": "User not found"}));

        let response = send(&app, method.clone(), "/api/admin/users/not-an-id", None, None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", method);
        assert_eq!(response.json(), json!({"detail": "Invalid user id"}));
    }

    let response = send(
        &app,
        Method::PUT,
        "/api/admin/users/not-an-id",
        Some(json!({"name": "X"})),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        Method::PUT,
        &format!("/api/admin/users/{}", unknown),
        Some(json!({"name": "X"})),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_user_partial() {
    let (app, _, db) = create_test_app();
    let jane = seed_user(&db, "Jane Doe", "jane", false).await;

    let response = send(
        &app,
        Method::PUT,
        &format!("/api/admin/users/{}", jane.id),
        Some(json!({"is_admin": true, "profile_slug": "jane-doe"})),
        None,
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({
            "id": jane.id,
            "name": "Jane Doe",
            "email": "jane@example.com",
            "is_admin": true,
            "profile_slug": "jane-doe",
        })
    );

    let stored = db.get_user(&jane.id).await.unwrap().unwrap();
    assert_eq!(stored.password_hash, jane.password_hash);
    assert_ne!(stored.updated_at, "");
}

#[tokio::test]
async fn test_empty_update_is_no_op() {
    let (app, _, db) = create_test_app();
    let jane = seed_user(&db, "Jane Doe", "jane", false).await;

    let response = send(
        &app,
        Method::PUT,
        &format!("/api/admin/users/{}", jane.id),
        Some(json!({})),
        None,
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({"status": "no_changes"}));

    let stored = db.get_user(&jane.id).await.unwrap().unwrap();
    assert_eq!(stored.updated_at, jane.updated_at);
}

#[tokio::test]
async fn test_update_rejects_taken_slug_and_email() {
    let (app, _, db) = create_test_app();
    let jane = seed_user(&db, "Jane Doe", "jane", false).await;
    seed_user(&db, "John Roe", "john", false).await;

    for body in [
        json!({"profile_slug": "john"}),
        json!({"email": "john@example.com"}),
    ] {
        let response = send(
            &app,
            Method::PUT,
            &format!("/api/admin/users/{}", jane.id),
            Some(body),
            None,
        )
        .await;
        assert_eq!(response.status, StatusCode::CONFLICT);
    }

    // Re-asserting one's own slug is fine
    let response = send(
        &app,
        Method::PUT,
        &format!("/api/admin/users/{}", jane.id),
        Some(json!({"profile_slug": "jane"})),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_cascades_to_own_documents_only() {
    let (app, _, db) = create_test_app();
    let jane = seed_user(&db, "Jane Doe", "jane", false).await;
    let john = seed_user(&db, "John Roe", "john", false).await;
    seed_dependents(&db, &jane).await;
    seed_dependents(&db, &john).await;

    let response = send(
        &app,
        Method::DELETE,
        &format!("/api/admin/users/{}", jane.id),
        None,
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({"status": "deleted"}));

    assert!(db.get_user(&jane.id).await.unwrap().is_none());
    assert!(db.get_profile_for_user(&jane.id).await.unwrap().is_none());
    assert!(db
        .list_social_links_for_user(&jane.id)
        .await
        .unwrap()
        .is_empty());

    assert!(db.get_user(&john.id).await.unwrap().is_some());
    assert!(db.get_profile_for_user(&john.id).await.unwrap().is_some());
    assert_eq!(db.list_social_links_for_user(&john.id).await.unwrap().len(), 2);

    let response = send(&app, Method::GET, "/api/p/jane", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_user() {
    let (app, _, db) = create_test_app();

    let response = send(
        &app,
        Method::POST,
        "/api/admin/users",
        Some(json!({
            "name": "New Person",
            "email": "new@example.com",
            "password": "long enough",
            "profile_slug": "new-person",
        })),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let body = response.json();
    assert_eq!(body["is_admin"], false);
    let id = body["id"].as_str().unwrap();
    let stored = db.get_user(id).await.unwrap().unwrap();
    assert_ne!(stored.password_hash, "long enough");

    let response = send(&app, Method::GET, "/api/p/new-person", None, None).await;
    assert_eq!(response.status, StatusCode::OK);

    // Same email again
    let response = send(
        &app,
        Method::POST,
        "/api/admin/users",
        Some(json!({
            "name": "Copy",
            "email": "new@example.com",
            "password": "long enough",
        })),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = send(
        &app,
        Method::POST,
        "/api/admin/users",
        Some(json!({
            "name": "Bad",
            "email": "not-an-email",
            "password": "long enough",
        })),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_demo_admin_demoted_loses_access() {
    let (app, _, db) = create_test_app();
    send(&app, Method::GET, "/api/user", None, None).await;
    let demo = db
        .find_user_by_email(digicard::services::demo::DEMO_EMAIL)
        .await
        .unwrap()
        .unwrap();

    let response = send(
        &app,
        Method::PUT,
        &format!("/api/admin/users/{}", demo.id),
        Some(json!({"is_admin": false})),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = send(&app, Method::GET, "/api/admin/users", None, None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.json(), json!({"detail": "Admin only"}));
}

/// Memory store whose next bulk link delete fails.
struct FlakyLinkStore {
    inner: MemoryDb,
    fail_next_link_delete: AtomicBool,
}

#[async_trait]
impl UserRepository for FlakyLinkStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.inner.get_user(id).await
    }

    async fn find_user_by_slug(&self, slug: &str) -> Result<Option<User>> {
        self.inner.find_user_by_slug(slug).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.inner.find_user_by_email(email).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.inner.list_users().await
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        self.inner.insert_user(user).await
    }

    async fn update_user(&self, id: &str, changes: &AdminUserUpdate) -> Result<Option<User>> {
        self.inner.update_user(id, changes).await
    }

    async fn delete_user(&self, id: &str) -> Result<bool> {
        self.inner.delete_user(id).await
    }
}

#[async_trait]
impl ProfileRepository for FlakyLinkStore {
    async fn get_profile_for_user(&self, user_id: &str) -> Result<Option<Profile>> {
        self.inner.get_profile_for_user(user_id).await
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<()> {
        self.inner.insert_profile(profile).await
    }

    async fn upsert_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<Profile> {
        self.inner.upsert_profile(user_id, update).await
    }

    async fn delete_profiles_for_user(&self, user_id: &str) -> Result<usize> {
        self.inner.delete_profiles_for_user(user_id).await
    }
}

#[async_trait]
impl SocialLinkRepository for FlakyLinkStore {
    async fn get_social_link(&self, id: &str) -> Result<Option<SocialLink>> {
        self.inner.get_social_link(id).await
    }

    async fn list_social_links_for_user(&self, user_id: &str) -> Result<Vec<SocialLink>> {
        self.inner.list_social_links_for_user(user_id).await
    }

    async fn insert_social_link(&self, link: &SocialLink) -> Result<()> {
        self.inner.insert_social_link(link).await
    }

    async fn delete_social_link(&self, id: &str) -> Result<bool> {
        self.inner.delete_social_link(id).await
    }

    async fn delete_social_links_for_user(&self, user_id: &str) -> Result<usize> {
        if self.fail_next_link_delete.swap(false, Ordering::SeqCst) {
            return Err(AppError::Database("commit failed".to_string()));
        }
        self.inner.delete_social_links_for_user(user_id).await
    }
}

#[async_trait]
impl DocumentStore for FlakyLinkStore {
    fn backend_name(&self) -> &'static str {
        "flaky"
    }

    async fn collections(&self) -> Result<Vec<String>> {
        self.inner.collections().await
    }
}

#[tokio::test]
async fn test_delete_retry_finishes_cascade() {
    let db = MemoryDb::new();
    let state = Arc::new(AppState {
        config: Config::test_default(),
        store: Some(Arc::new(FlakyLinkStore {
            inner: db.clone(),
            fail_next_link_delete: AtomicBool::new(true),
        })),
        auth: Arc::new(DemoAuthResolver),
    });
    let app = create_router(state);

    let jane = seed_user(&db, "Jane Doe", "jane", false).await;
    seed_dependents(&db, &jane).await;
    let uri = format!("/api/admin/users/{}", jane.id);

    let response = send(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    // The user survives a failed cascade so the delete can be retried
    assert!(db.get_user(&jane.id).await.unwrap().is_some());
    assert_eq!(db.list_social_links_for_user(&jane.id).await.unwrap().len(), 2);

    let response = send(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({"status": "deleted"}));

    assert!(db.get_user(&jane.id).await.unwrap().is_none());
    assert!(db.get_profile_for_user(&jane.id).await.unwrap().is_none());
    assert!(db
        .list_social_links_for_user(&jane.id)
        .await
        .unwrap()
        .is_empty());

    let response = send(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin user management routes.
//!
//! Every `{id}` route treats ids the same way: malformed → 400, unknown → 404,
//! store failure → 500.

use crate::db::{
    is_valid_document_id, new_document_id, DocumentStore, ProfileRepository,
    SocialLinkRepository, UserRepository,
};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{AdminUserCreate, AdminUserUpdate, User, UserView};
use crate::routes::api::StatusResponse;
use crate::services::password::hash_password;
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use std::sync::Arc;
use validator::Validate;

/// Admin routes. `require_user` and `require_admin` are applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/users", get(list_users).post(create_user))
        .route(
            "/api/admin/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

fn check_id(id: &str) -> Result<()> {
    if is_valid_document_id(id) {
        Ok(())
    } else {
        Err(AppError::BadRequest(AppError::INVALID_USER_ID.to_string()))
    }
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

/// Reject an email or slug already held by a different user.
async fn check_unique(
    store: &dyn DocumentStore,
    user_id: Option<&str>,
    email: Option<&str>,
    slug: Option<&str>,
) -> Result<()> {
    let held_by_other = |holder: Option<User>| holder.is_some_and(|u| Some(u.id.as_str()) != user_id);

    if let Some(email) = email {
        if held_by_other(store.find_user_by_email(email).await?) {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }
    }
    if let Some(slug) = slug {
        if held_by_other(store.find_user_by_slug(slug).await?) {
            return Err(AppError::Conflict("Profile slug already in use".to_string()));
        }
    }
    Ok(())
}

async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserView>>> {
    let users = state.store()?.list_users().await?;
    Ok(Json(users.iter().map(UserView::from).collect()))
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Json(payload): Json<AdminUserCreate>,
) -> Result<Response> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let store = state.store()?;
    check_unique(
        store,
        None,
        Some(&payload.email),
        payload.profile_slug.as_deref(),
    )
    .await?;

    let now = now_rfc3339();
    let user = User {
        id: new_document_id()?,
        name: payload.name,
        email: payload.email,
        password_hash: hash_password(&payload.password)?,
        is_admin: payload.is_admin,
        profile_slug: payload.profile_slug,
        created_at: now.clone(),
        updated_at: now,
    };
    store.insert_user(&user).await?;

    tracing::info!(admin_id = %admin.id, user_id = %user.id, "Admin created user");

    Ok((StatusCode::CREATED, Json(UserView::from(&user))).into_response())
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserView>> {
    check_id(&id)?;

    let user = state
        .store()?
        .get_user(&id)
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Json(UserView::from(&user)))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<AdminUserUpdate>,
) -> Result<Response> {
    // Nothing to write: answer before touching the store
    if payload.is_empty() {
        return Ok(StatusResponse::new("no_changes").into_response());
    }

    check_id(&id)?;
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let store = state.store()?;
    check_unique(
        store,
        Some(&id),
        payload.email.as_deref(),
        payload.profile_slug.as_deref(),
    )
    .await?;

    let user = store
        .update_user(&id, &payload)
        .await?
        .ok_or_else(user_not_found)?;

    tracing::info!(admin_id = %admin.id, user_id = %id, "Admin updated user");

    Ok(Json(UserView::from(&user)).into_response())
}

/// Delete a user and cascade to that user's profile and social links.
///
/// Dependents go first and the user document last, so a retry after a
/// partial failure still finds the user and finishes the cascade.
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>> {
    check_id(&id)?;

    let store = state.store()?;
    if store.get_user(&id).await?.is_none() {
        return Err(user_not_found());
    }

    let (profiles, links) = futures_util::future::try_join(
        store.delete_profiles_for_user(&id),
        store.delete_social_links_for_user(&id),
    )
    .await?;

    if !store.delete_user(&id).await? {
        return Err(user_not_found());
    }

    tracing::info!(
        admin_id = %admin.id,
        user_id = %id,
        profiles,
        links,
        "Admin deleted user"
    );

    Ok(StatusResponse::new("deleted"))
}

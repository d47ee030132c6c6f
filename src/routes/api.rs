// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for the acting user.

use crate::db::{is_valid_document_id, new_document_id, ProfileRepository, SocialLinkRepository};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{ProfileUpdate, SocialLink, SocialLinkCreate};
use crate::services::ProfileBundle;
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// API routes (require an acting user).
/// The `require_user` middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/user", get(get_me))
        .route("/api/profile", put(update_profile))
        .route("/api/social-links", post(create_social_link))
        .route("/api/social-links/{id}", delete(delete_social_link))
}

/// Generic `{"status": ...}` acknowledgement.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: &str) -> Json<Self> {
        Json(Self {
            status: status.to_string(),
        })
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CreatedResponse {
    pub id: String,
}

// ─── User Profile ────────────────────────────────────────────

/// Get the acting user's bundle.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ProfileBundle>> {
    let bundle = ProfileBundle::for_user(state.store()?, &user).await?;
    Ok(Json(bundle))
}

/// Partially update the acting user's profile, creating it on first write.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<StatusResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let profile = state.store()?.upsert_profile(&user.id, &payload).await?;

    tracing::info!(
        user_id = %user.id,
        profile_id = %profile.id,
        "Profile updated"
    );

    Ok(StatusResponse::new("ok"))
}

// ─── Social Links ────────────────────────────────────────────

async fn create_social_link(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<SocialLinkCreate>,
) -> Result<Json<CreatedResponse>> {
    let now = now_rfc3339();
    let link = SocialLink {
        id: new_document_id()?,
        user_id: user.id.clone(),
        platform: payload.platform,
        url: payload.url,
        created_at: now.clone(),
        updated_at: now,
    };

    state.store()?.insert_social_link(&link).await?;

    tracing::info!(
        user_id = %user.id,
        link_id = %link.id,
        platform = %link.platform,
        "Social link created"
    );

    Ok(Json(CreatedResponse { id: link.id }))
}

/// Delete one of the acting user's links.
///
/// A link owned by someone else answers exactly like a missing one.
async fn delete_social_link(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>> {
    let not_found = || AppError::NotFound("Not found".to_string());

    if !is_valid_document_id(&id) {
        return Err(not_found());
    }

    let store = state.store()?;
    let owned = store
        .get_social_link(&id)
        .await?
        .is_some_and(|link| link.user_id == user.id);
    if !owned {
        return Err(not_found());
    }

    if !store.delete_social_link(&id).await? {
        return Err(not_found());
    }

    tracing::info!(user_id = %user.id, link_id = %id, "Social link deleted");

    Ok(StatusResponse::new("deleted"))
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public routes: liveness, store diagnostics and published profiles.

use crate::error::{AppError, Result};
use crate::services::{ensure_demo_user, ProfileBundle, UserKey, VCard};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const MAX_REPORTED_COLLECTIONS: usize = 10;
const MAX_REPORTED_ERROR_CHARS: usize = 50;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/test", get(diagnostics))
        .route("/api/p/{slug}", get(get_public_profile))
        .route("/api/p/{slug}/vcf", get(get_vcard))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RootResponse {
    pub message: String,
}

/// Liveness message.
async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Digital Business Card API (demo)".to_string(),
    })
}

/// Store diagnostic report. Always 200; the body describes what works.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DiagnosticsResponse {
    pub backend: String,
    pub database: String,
    pub database_url: Option<String>,
    pub database_name: Option<String>,
    pub connection_status: String,
    pub collections: Vec<String>,
}

fn set_or_not(set: bool) -> String {
    if set { "Set" } else { "Not Set" }.to_string()
}

async fn diagnostics(State(state): State<Arc<AppState>>) -> Json<DiagnosticsResponse> {
    let mut response = DiagnosticsResponse {
        backend: "Running".to_string(),
        database: "Not Available".to_string(),
        database_url: None,
        database_name: None,
        connection_status: "Not Connected".to_string(),
        collections: vec![],
    };

    let Some(store) = state.store.as_deref() else {
        response.database_url = Some(set_or_not(false));
        return Json(response);
    };

    response.database = format!("Available ({})", store.backend_name());
    response.database_url = Some(set_or_not(true));
    response.database_name = Some(set_or_not(state.config.database_name_set));

    match store.collections().await {
        Ok(mut collections) => {
            collections.truncate(MAX_REPORTED_COLLECTIONS);
            response.collections = collections;
            response.database = "Connected & Working".to_string();
            response.connection_status = "Connected".to_string();

            if let Err(e) = ensure_demo_user(store).await {
                tracing::warn!(error = %e, "Demo bootstrap failed during diagnostics");
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Store diagnostic failed");
            let short: String = e.to_string().chars().take(MAX_REPORTED_ERROR_CHARS).collect();
            response.database = format!("Connected but Error: {}", short);
        }
    }

    Json(response)
}

async fn load_by_slug(state: &AppState, slug: &str) -> Result<ProfileBundle> {
    ProfileBundle::load(state.store()?, UserKey::Slug(slug))
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}

/// Published profile bundle.
async fn get_public_profile(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<ProfileBundle>> {
    Ok(Json(load_by_slug(&state, &slug).await?))
}

/// Published profile as a vCard download.
async fn get_vcard(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let bundle = load_by_slug(&state, &slug).await?;
    let card = VCard::from_bundle(&bundle);

    let disposition = HeaderValue::from_str(&card.content_disposition())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Bad Content-Disposition: {}", e)))?;

    tracing::debug!(slug = %slug, filename = %card.filename, "Serving vCard");

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/vcard; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        card.body,
    ))
}

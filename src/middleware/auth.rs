// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Acting-user resolution and admin gating.
//!
//! Handlers never decide who is calling. `require_user` asks the configured
//! [`AuthResolver`] and stores the result as a [`CurrentUser`] extension.

use crate::db::{DocumentStore, UserRepository};
use crate::error::{AppError, Result};
use crate::models::User;
use crate::services::demo::ensure_demo_user;
use crate::AppState;
use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Cookie carrying the session token in JWT mode.
pub const SESSION_COOKIE: &str = "digicard_token";

const SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user document ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// The user a request acts as.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Decides which user a request acts as.
#[async_trait]
pub trait AuthResolver: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap, store: &dyn DocumentStore) -> Result<User>;
}

/// Every request acts as the demo user, bootstrapped on first use.
pub struct DemoAuthResolver;

#[async_trait]
impl AuthResolver for DemoAuthResolver {
    async fn resolve(&self, _headers: &HeaderMap, store: &dyn DocumentStore) -> Result<User> {
        ensure_demo_user(store).await
    }
}

/// Resolves the user from an HS256 token in the session cookie or a bearer header.
pub struct JwtAuthResolver {
    signing_key: Vec<u8>,
}

impl JwtAuthResolver {
    pub fn new(signing_key: Vec<u8>) -> Self {
        Self { signing_key }
    }

    fn user_id_from(&self, headers: &HeaderMap) -> Result<String> {
        // Try cookie first, then header
        let jar = CookieJar::from_headers(headers);
        let token = match jar.get(SESSION_COOKIE) {
            Some(cookie) => cookie.value().to_string(),
            None => headers
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(str::to_string)
                .ok_or(AppError::Unauthorized)?,
        };

        let key = DecodingKey::from_secret(&self.signing_key);
        let validation = Validation::new(Algorithm::HS256);

        let token_data =
            decode::<Claims>(&token, &key, &validation).map_err(|_| AppError::Unauthorized)?;

        Ok(token_data.claims.sub)
    }
}

#[async_trait]
impl AuthResolver for JwtAuthResolver {
    async fn resolve(&self, headers: &HeaderMap, store: &dyn DocumentStore) -> Result<User> {
        let user_id = self.user_id_from(headers)?;

        // A valid token for a deleted user is no longer a session
        store.get_user(&user_id).await?.ok_or_else(|| {
            tracing::debug!(user_id = %user_id, "Token subject no longer exists");
            AppError::Unauthorized
        })
    }
}

/// Middleware that resolves the acting user and attaches it to the request.
pub async fn require_user(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let store = state.store()?;
    let user = state.auth.resolve(request.headers(), store).await?;

    tracing::debug!(user_id = %user.id, "Resolved acting user");
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

/// Middleware that rejects non-admin users. Must run after `require_user`.
pub async fn require_admin(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response> {
    if !user.is_admin {
        tracing::warn!(user_id = %user.id, path = %request.uri().path(), "Blocked non-admin request");
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}

/// Create a JWT for a user session.
pub fn create_jwt(user_id: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now as usize,
        exp: (now + SESSION_TTL_SECS) as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

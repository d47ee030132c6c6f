// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod admin;
pub mod api;
pub mod auth;
pub mod public;

use crate::config::AuthMode;
use crate::middleware::{auth::require_admin, auth::require_user, security};
use crate::AppState;
use axum::http::{header, Method};
use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Any origin may call the API
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    // Public routes (no acting user)
    let mut public_routes = public::routes();
    if state.config.auth_mode == AuthMode::Jwt {
        public_routes = public_routes.merge(auth::routes());
    }

    // Routes for the acting user
    let user_routes = api::routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    // Admin routes: require_user runs first (outer layer), then require_admin
    let admin_routes = admin::routes()
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    let private_routes = Router::new()
        .merge(user_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn(security::private_response_headers));

    Router::new()
        .merge(public_routes)
        .merge(private_routes)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

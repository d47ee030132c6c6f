// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Digicard: digital business card backend
//!
//! Users keep a profile and a list of social links, published under a public
//! slug as JSON and as a downloadable vCard. Admins manage all users.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::{AuthMode, Config, StoreBackend};
use db::{DocumentStore, FirestoreDb, MemoryDb};
use error::AppError;
use middleware::auth::{AuthResolver, DemoAuthResolver, JwtAuthResolver};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// `None` when no `DATABASE_URL` was configured.
    pub store: Option<Arc<dyn DocumentStore>>,
    pub auth: Arc<dyn AuthResolver>,
}

impl AppState {
    /// Build state from config, connecting to the configured store.
    pub async fn from_config(config: Config) -> Result<Self, AppError> {
        let store: Option<Arc<dyn DocumentStore>> = match &config.store {
            Some(StoreBackend::Firestore { project_id }) => Some(Arc::new(
                FirestoreDb::new(project_id, &config.database_name).await?,
            )),
            Some(StoreBackend::Memory) => {
                tracing::info!("Using in-memory document store");
                Some(Arc::new(MemoryDb::new()))
            }
            None => {
                tracing::warn!("DATABASE_URL not set; data routes will report not configured");
                None
            }
        };

        let auth = auth_resolver(&config);

        Ok(Self {
            config,
            store,
            auth,
        })
    }

    /// The configured store, or `NotConfigured`.
    pub fn store(&self) -> Result<&dyn DocumentStore, AppError> {
        self.store.as_deref().ok_or(AppError::NotConfigured)
    }
}

/// Resolver matching `config.auth_mode`.
pub fn auth_resolver(config: &Config) -> Arc<dyn AuthResolver> {
    match config.auth_mode {
        AuthMode::Demo => Arc::new(DemoAuthResolver),
        AuthMode::Jwt => Arc::new(JwtAuthResolver::new(config.jwt_signing_key.clone())),
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Read once at startup. A missing `DATABASE_URL` is not fatal: the server
//! still starts and data-bearing routes answer with "not configured".

use std::env;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DATABASE_NAME: &str = "(default)";

/// Which document store backs the repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Google Cloud Firestore in the given GCP project.
    Firestore { project_id: String },
    /// Process-local store, lost on restart.
    Memory,
}

/// How the acting user of a request is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Every request acts as the bootstrapped demo user.
    Demo,
    /// Requests carry an HS256 session token.
    Jwt,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Store selected by `DATABASE_URL`, `None` when unset
    pub store: Option<StoreBackend>,
    /// Firestore database id
    pub database_name: String,
    /// Whether `DATABASE_NAME` was given explicitly (reported by `/test`)
    pub database_name_set: bool,
    pub auth_mode: AuthMode,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let store = env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| parse_database_url(v.trim()))
            .transpose()?;

        let database_name = env::var("DATABASE_NAME").ok();

        let auth_mode = match env::var("AUTH_MODE").as_deref() {
            Ok("jwt") => AuthMode::Jwt,
            Ok("demo") | Err(_) => AuthMode::Demo,
            Ok(other) => return Err(ConfigError::Invalid("AUTH_MODE", other.to_string())),
        };

        let jwt_signing_key = match auth_mode {
            AuthMode::Jwt => env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            AuthMode::Demo => env::var("JWT_SIGNING_KEY")
                .map(String::into_bytes)
                .unwrap_or_default(),
        };

        Ok(Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            store,
            database_name_set: database_name.is_some(),
            database_name: database_name.unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
            auth_mode,
            jwt_signing_key,
        })
    }

    /// Config for tests: in-memory store, demo auth.
    pub fn test_default() -> Self {
        Self {
            port: DEFAULT_PORT,
            store: Some(StoreBackend::Memory),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            database_name_set: false,
            auth_mode: AuthMode::Demo,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

/// Parse `firestore://<project-id>` or `memory://`.
pub fn parse_database_url(url: &str) -> Result<StoreBackend, ConfigError> {
    if let Some(project) = url.strip_prefix("firestore://") {
        let project = project.trim_end_matches('/');
        if project.is_empty() {
            return Err(ConfigError::Invalid("DATABASE_URL", url.to_string()));
        }
        return Ok(StoreBackend::Firestore {
            project_id: project.to_string(),
        });
    }

    if url == "memory://" || url == "memory:" {
        return Ok(StoreBackend::Memory);
    }

    Err(ConfigError::Invalid("DATABASE_URL", url.to_string()))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (acting user, admin gate, response headers).

pub mod auth;
pub mod security;

pub use auth::{require_admin, require_user, AuthResolver, CurrentUser};

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod bundle;
pub mod demo;
pub mod password;
pub mod vcard;

pub use bundle::{ProfileBundle, UserKey};
pub use demo::ensure_demo_user;
pub use vcard::VCard;

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod profile;
pub mod social_link;
pub mod user;

pub use profile::{Profile, ProfileUpdate, ProfileView};
pub use social_link::{SocialLink, SocialLinkCreate, SocialLinkView};
pub use user::{AdminUserCreate, AdminUserUpdate, User, UserView};

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Demo data bootstrap.
//!
//! Idempotent but not atomic: two concurrent first requests can both see no
//! demo user and both insert one. Acceptable for a demo-only path.

use crate::db::{
    new_document_id, DocumentStore, ProfileRepository, SocialLinkRepository, UserRepository,
};
use crate::error::Result;
use crate::models::{Profile, SocialLink, User};
use crate::services::password::hash_password;
use crate::time_utils::now_rfc3339;

pub const DEMO_EMAIL: &str = "demo@flamesblue.com";
pub const DEMO_PASSWORD: &str = "demo";
pub const DEMO_SLUG: &str = "flames-blue";

const DEMO_LINKS: [(&str, &str); 3] = [
    ("website", "https://flamesblue.com"),
    ("linkedin", "https://linkedin.com/company/flamesblue"),
    ("github", "https://github.com/"),
];

/// Return the demo user, creating it with a profile and links on first call.
pub async fn ensure_demo_user(store: &dyn DocumentStore) -> Result<User> {
    if let Some(user) = store.find_user_by_email(DEMO_EMAIL).await? {
        return Ok(user);
    }

    let now = now_rfc3339();
    let user = User {
        id: new_document_id()?,
        name: "Flames Blue".to_string(),
        email: DEMO_EMAIL.to_string(),
        password_hash: hash_password(DEMO_PASSWORD)?,
        is_admin: true,
        profile_slug: Some(DEMO_SLUG.to_string()),
        created_at: now.clone(),
        updated_at: now.clone(),
    };
    store.insert_user(&user).await?;

    store
        .insert_profile(&Profile {
            id: user.id.clone(),
            user_id: user.id.clone(),
            job_title: Some("Vibe Coding Agent".to_string()),
            company: Some("FlamesBlue".to_string()),
            phone_number: Some("+1 555 123 4567".to_string()),
            bio: Some("We build beautiful digital identity experiences.".to_string()),
            profile_image_path: None,
            created_at: now.clone(),
            updated_at: now.clone(),
        })
        .await?;

    for (platform, url) in DEMO_LINKS {
        store
            .insert_social_link(&SocialLink {
                id: new_document_id()?,
                user_id: user.id.clone(),
                platform: platform.to_string(),
                url: url.to_string(),
                created_at: now.clone(),
                updated_at: now.clone(),
            })
            .await?;
    }

    tracing::info!(user_id = %user.id, slug = DEMO_SLUG, "Demo user bootstrapped");

    Ok(user)
}

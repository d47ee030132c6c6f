// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer: repository traits and their Firestore and in-memory backends.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::{AppError, Result};
use crate::models::{AdminUserUpdate, Profile, ProfileUpdate, SocialLink, User};
use async_trait::async_trait;
use ring::rand::{SecureRandom, SystemRandom};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "user";
    pub const PROFILES: &str = "profile";
    pub const SOCIAL_LINKS: &str = "sociallink";

    pub const ALL: [&str; 3] = [USERS, PROFILES, SOCIAL_LINKS];
}

const DOCUMENT_ID_BYTES: usize = 12;

/// Generate a random 24-hex-char document ID.
pub fn new_document_id() -> Result<String> {
    let mut bytes = [0u8; DOCUMENT_ID_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
    Ok(hex::encode(bytes))
}

/// Whether `id` has the shape produced by [`new_document_id`].
pub fn is_valid_document_id(id: &str) -> bool {
    id.len() == DOCUMENT_ID_BYTES * 2 && id.bytes().all(|b| b.is_ascii_hexdigit())
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: &str) -> Result<Option<User>>;

    async fn find_user_by_slug(&self, slug: &str) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn list_users(&self) -> Result<Vec<User>>;

    /// Store a new user. The caller assigns `user.id`.
    async fn insert_user(&self, user: &User) -> Result<()>;

    /// Apply `changes` to an existing user. `None` if no user has this ID.
    async fn update_user(&self, id: &str, changes: &AdminUserUpdate) -> Result<Option<User>>;

    /// Returns `false` if no user has this ID.
    async fn delete_user(&self, id: &str) -> Result<bool>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_profile_for_user(&self, user_id: &str) -> Result<Option<Profile>>;

    async fn insert_profile(&self, profile: &Profile) -> Result<()>;

    /// Apply a partial update, creating the profile on first write.
    async fn upsert_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<Profile>;

    /// Returns the number of profiles removed.
    async fn delete_profiles_for_user(&self, user_id: &str) -> Result<usize>;
}

#[async_trait]
pub trait SocialLinkRepository: Send + Sync {
    async fn get_social_link(&self, id: &str) -> Result<Option<SocialLink>>;

    /// Links in creation order.
    async fn list_social_links_for_user(&self, user_id: &str) -> Result<Vec<SocialLink>>;

    async fn insert_social_link(&self, link: &SocialLink) -> Result<()>;

    /// Returns `false` if no link has this ID.
    async fn delete_social_link(&self, id: &str) -> Result<bool>;

    /// Returns the number of links removed.
    async fn delete_social_links_for_user(&self, user_id: &str) -> Result<usize>;
}

/// A backend that serves all three collections.
#[async_trait]
pub trait DocumentStore: UserRepository + ProfileRepository + SocialLinkRepository {
    /// Short backend name for diagnostics.
    fn backend_name(&self) -> &'static str;

    /// Round-trip to the backend and list the collections it serves.
    async fn collections(&self) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_shape() {
        let id = new_document_id().unwrap();
        assert!(is_valid_document_id(&id));
        assert_ne!(id, new_document_id().unwrap());
    }

    #[test]
    fn test_rejects_malformed_ids() {
        assert!(!is_valid_document_id(""));
        assert!(!is_valid_document_id("not-an-id"));
        assert!(!is_valid_document_id("zzzzzzzzzzzzzzzzzzzzzzzz"));
        assert!(!is_valid_document_id("65f0c0ffee0000000000000"));
        assert!(is_valid_document_id("65f0c0ffee00000000000001"));
    }
}

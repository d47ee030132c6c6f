// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper implementing the repository traits.
//!
//! Provides typed operations for:
//! - Users (identity records, keyed by generated ID)
//! - Profiles (one per user, keyed by the user's ID)
//! - Social links (many per user, looked up by `user_id`)

use crate::db::{
    collections, DocumentStore, ProfileRepository, SocialLinkRepository, UserRepository,
};
use crate::error::{AppError, Result};
use crate::models::{AdminUserUpdate, Profile, ProfileUpdate, SocialLink, User};
use crate::time_utils::now_rfc3339;
use async_trait::async_trait;
use firestore::FirestoreQueryDirection;

// Must stay under Firestore's 500-write transaction limit.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str, database_id: &str) -> Result<Self> {
        let options = firestore::FirestoreDbOptions::new(project_id.to_string())
            .with_database_id(database_id.to_string());

        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(options).await;
        }

        let client = firestore::FirestoreDb::with_options(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(
            project = project_id,
            database = database_id,
            "Connected to Firestore"
        );

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(options: firestore::FirestoreDbOptions) -> Result<Self> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let project = options.google_project_id.clone();
        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = %project,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    /// Write a whole document under `id`, returning it as stored.
    async fn write<T>(&self, collection: &str, id: &str, doc: &T) -> Result<T>
    where
        T: serde::Serialize + for<'de> serde::Deserialize<'de> + Send + Sync,
    {
        self.client
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id)
            .object(doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn get_by_id<T>(&self, collection: &str, id: &str) -> Result<Option<T>>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        self.client
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<()> {
        self.client
            .fluent()
            .delete()
            .from(collection)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Documents in `collection` whose `field` equals `value`, oldest first.
    async fn find_by_field<T>(&self, collection: &str, field: &str, value: &str) -> Result<Vec<T>>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        self.client
            .fluent()
            .select()
            .from(collection)
            .filter(|q| q.for_all([q.field(field).eq(value)]))
            .order_by([("created_at", FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Helper to batch delete documents using transactions.
    async fn batch_delete(&self, ids: &[String], collection: &str) -> Result<()> {
        for chunk in ids.chunks(BATCH_SIZE) {
            let mut transaction =
                self.client.begin_transaction().await.map_err(|e| {
                    AppError::Database(format!("Failed to begin transaction: {}", e))
                })?;

            for doc_id in chunk {
                self.client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}

// ─── User Operations ─────────────────────────────────────────

#[async_trait]
impl UserRepository for FirestoreDb {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.get_by_id(collections::USERS, id).await
    }

    async fn find_user_by_slug(&self, slug: &str) -> Result<Option<User>> {
        let users: Vec<User> = self
            .find_by_field(collections::USERS, "profile_slug", slug)
            .await?;
        Ok(users.into_iter().next())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let users: Vec<User> = self
            .find_by_field(collections::USERS, "email", email)
            .await?;
        Ok(users.into_iter().next())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.client
            .fluent()
            .select()
            .from(collections::USERS)
            .order_by([("created_at", FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        self.write(collections::USERS, &user.id, user).await?;
        Ok(())
    }

    async fn update_user(&self, id: &str, changes: &AdminUserUpdate) -> Result<Option<User>> {
        // Fetch-modify-write to preserve fields the update leaves out
        let Some(mut user) = self.get_user(id).await? else {
            return Ok(None);
        };
        user.apply(changes, &now_rfc3339());
        self.write(collections::USERS, id, &user).await.map(Some)
    }

    async fn delete_user(&self, id: &str) -> Result<bool> {
        // Firestore deletes of missing documents succeed, so check first
        if self.get_user(id).await?.is_none() {
            return Ok(false);
        }
        self.delete_by_id(collections::USERS, id).await?;
        Ok(true)
    }
}

// ─── Profile Operations ──────────────────────────────────────

#[async_trait]
impl ProfileRepository for FirestoreDb {
    async fn get_profile_for_user(&self, user_id: &str) -> Result<Option<Profile>> {
        self.get_by_id(collections::PROFILES, user_id).await
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<()> {
        self.write(collections::PROFILES, &profile.id, profile)
            .await?;
        Ok(())
    }

    async fn upsert_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<Profile> {
        let now = now_rfc3339();

        // Keyed by user ID, so concurrent first writes land on one document
        let mut profile = self
            .get_profile_for_user(user_id)
            .await?
            .unwrap_or_else(|| Profile::empty_for(user_id, &now));
        profile.apply(update, &now);

        self.write(collections::PROFILES, &profile.id, &profile)
            .await
    }

    async fn delete_profiles_for_user(&self, user_id: &str) -> Result<usize> {
        let profiles: Vec<Profile> = self
            .find_by_field(collections::PROFILES, "user_id", user_id)
            .await?;
        let ids: Vec<String> = profiles.into_iter().map(|p| p.id).collect();
        self.batch_delete(&ids, collections::PROFILES).await?;
        Ok(ids.len())
    }
}

// ─── Social Link Operations ──────────────────────────────────

#[async_trait]
impl SocialLinkRepository for FirestoreDb {
    async fn get_social_link(&self, id: &str) -> Result<Option<SocialLink>> {
        self.get_by_id(collections::SOCIAL_LINKS, id).await
    }

    async fn list_social_links_for_user(&self, user_id: &str) -> Result<Vec<SocialLink>> {
        self.find_by_field(collections::SOCIAL_LINKS, "user_id", user_id)
            .await
    }

    async fn insert_social_link(&self, link: &SocialLink) -> Result<()> {
        self.write(collections::SOCIAL_LINKS, &link.id, link)
            .await?;
        Ok(())
    }

    async fn delete_social_link(&self, id: &str) -> Result<bool> {
        if self.get_social_link(id).await?.is_none() {
            return Ok(false);
        }
        self.delete_by_id(collections::SOCIAL_LINKS, id).await?;
        Ok(true)
    }

    async fn delete_social_links_for_user(&self, user_id: &str) -> Result<usize> {
        let links = self.list_social_links_for_user(user_id).await?;
        let ids: Vec<String> = links.into_iter().map(|l| l.id).collect();
        self.batch_delete(&ids, collections::SOCIAL_LINKS).await?;
        Ok(ids.len())
    }
}

#[async_trait]
impl DocumentStore for FirestoreDb {
    fn backend_name(&self) -> &'static str {
        "firestore"
    }

    async fn collections(&self) -> Result<Vec<String>> {
        // One cheap read per collection proves the connection and credentials work
        for collection in collections::ALL {
            self.client
                .fluent()
                .select()
                .from(collection)
                .limit(1)
                .query()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(collections::ALL.iter().map(|c| c.to_string()).collect())
    }
}

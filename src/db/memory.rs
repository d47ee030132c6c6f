// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Process-local document store.
//!
//! Used for local development (`DATABASE_URL=memory://`) and the test suite.
//! Every document carries an insertion sequence number so listings come back
//! in creation order.

use crate::db::{
    collections, DocumentStore, ProfileRepository, SocialLinkRepository, UserRepository,
};
use crate::error::Result;
use crate::models::{AdminUserUpdate, Profile, ProfileUpdate, SocialLink, User};
use crate::time_utils::now_rfc3339;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type Collection<T> = DashMap<String, (u64, T)>;

#[derive(Default)]
struct Inner {
    seq: AtomicU64,
    users: Collection<User>,
    profiles: Collection<Profile>,
    social_links: Collection<SocialLink>,
}

/// In-memory store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryDb {
    inner: Arc<Inner>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.inner.seq.fetch_add(1, Ordering::Relaxed)
    }
}

/// Clone out the documents matching `pred`, oldest first.
fn select<T: Clone>(col: &Collection<T>, pred: impl Fn(&T) -> bool) -> Vec<T> {
    let mut rows: Vec<(u64, T)> = col
        .iter()
        .filter(|entry| pred(&entry.value().1))
        .map(|entry| entry.value().clone())
        .collect();
    rows.sort_by_key(|(seq, _)| *seq);
    rows.into_iter().map(|(_, doc)| doc).collect()
}

/// Remove the documents matching `pred`, returning how many went.
fn remove_where<T>(col: &Collection<T>, pred: impl Fn(&T) -> bool) -> usize {
    let before = col.len();
    col.retain(|_, (_, doc)| !pred(&*doc));
    before - col.len()
}

#[async_trait]
impl UserRepository for MemoryDb {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.inner.users.get(id).map(|entry| entry.value().1.clone()))
    }

    async fn find_user_by_slug(&self, slug: &str) -> Result<Option<User>> {
        Ok(select(&self.inner.users, |u| u.profile_slug.as_deref() == Some(slug))
            .into_iter()
            .next())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(select(&self.inner.users, |u| u.email == email)
            .into_iter()
            .next())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(select(&self.inner.users, |_| true))
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        let seq = self.next_seq();
        self.inner.users.insert(user.id.clone(), (seq, user.clone()));
        Ok(())
    }

    async fn update_user(&self, id: &str, changes: &AdminUserUpdate) -> Result<Option<User>> {
        let now = now_rfc3339();
        Ok(self.inner.users.get_mut(id).map(|mut entry| {
            let user = &mut entry.value_mut().1;
            user.apply(changes, &now);
            user.clone()
        }))
    }

    async fn delete_user(&self, id: &str) -> Result<bool> {
        Ok(self.inner.users.remove(id).is_some())
    }
}

#[async_trait]
impl ProfileRepository for MemoryDb {
    async fn get_profile_for_user(&self, user_id: &str) -> Result<Option<Profile>> {
        Ok(self
            .inner
            .profiles
            .get(user_id)
            .map(|entry| entry.value().1.clone()))
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<()> {
        let seq = self.next_seq();
        self.inner
            .profiles
            .insert(profile.id.clone(), (seq, profile.clone()));
        Ok(())
    }

    async fn upsert_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<Profile> {
        let now = now_rfc3339();
        let seq = self.next_seq();

        // The entry lock makes create-or-update atomic per user
        let mut entry = self
            .inner
            .profiles
            .entry(user_id.to_string())
            .or_insert_with(|| (seq, Profile::empty_for(user_id, &now)));
        let profile = &mut entry.value_mut().1;
        profile.apply(update, &now);
        Ok(profile.clone())
    }

    async fn delete_profiles_for_user(&self, user_id: &str) -> Result<usize> {
        Ok(remove_where(&self.inner.profiles, |p| p.user_id == user_id))
    }
}

#[async_trait]
impl SocialLinkRepository for MemoryDb {
    async fn get_social_link(&self, id: &str) -> Result<Option<SocialLink>> {
        Ok(self
            .inner
            .social_links
            .get(id)
            .map(|entry| entry.value().1.clone()))
    }

    async fn list_social_links_for_user(&self, user_id: &str) -> Result<Vec<SocialLink>> {
        Ok(select(&self.inner.social_links, |l| l.user_id == user_id))
    }

    async fn insert_social_link(&self, link: &SocialLink) -> Result<()> {
        let seq = self.next_seq();
        self.inner
            .social_links
            .insert(link.id.clone(), (seq, link.clone()));
        Ok(())
    }

    async fn delete_social_link(&self, id: &str) -> Result<bool> {
        Ok(self.inner.social_links.remove(id).is_some())
    }

    async fn delete_social_links_for_user(&self, user_id: &str) -> Result<usize> {
        Ok(remove_where(&self.inner.social_links, |l| {
            l.user_id == user_id
        }))
    }
}

#[async_trait]
impl DocumentStore for MemoryDb {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn collections(&self) -> Result<Vec<String>> {
        Ok(collections::ALL.iter().map(|c| c.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::new_document_id;

    fn link(user_id: &str, platform: &str) -> SocialLink {
        let now = now_rfc3339();
        SocialLink {
            id: new_document_id().unwrap(),
            user_id: user_id.to_string(),
            platform: platform.to_string(),
            url: format!("https://{}.example", platform),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_links_come_back_in_insertion_order() {
        let db = MemoryDb::new();
        for platform in ["github", "website", "linkedin", "mastodon"] {
            db.insert_social_link(&link("u1", platform)).await.unwrap();
        }
        db.insert_social_link(&link("u2", "other")).await.unwrap();

        let platforms: Vec<String> = db
            .list_social_links_for_user("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.platform)
            .collect();

        assert_eq!(platforms, ["github", "website", "linkedin", "mastodon"]);
    }

    #[tokio::test]
    async fn test_upsert_profile_creates_then_updates() {
        let db = MemoryDb::new();
        let first = ProfileUpdate {
            job_title: Some("Engineer".to_string()),
            ..Default::default()
        };
        let created = db.upsert_profile("u1", &first).await.unwrap();

        let second = ProfileUpdate {
            company: Some("Acme".to_string()),
            ..Default::default()
        };
        let updated = db.upsert_profile("u1", &second).await.unwrap();

        assert_eq!(created.id, updated.id);
        assert_eq!(updated.job_title.as_deref(), Some("Engineer"));
        assert_eq!(updated.company.as_deref(), Some("Acme"));
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(created.id, "u1");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_writes_make_one_profile() {
        let db = MemoryDb::new();

        let writers: Vec<_> = (0..8)
            .map(|i| {
                let db = db.clone();
                tokio::spawn(async move {
                    let update = ProfileUpdate {
                        bio: Some(format!("writer {}", i)),
                        ..Default::default()
                    };
                    db.upsert_profile("u1", &update).await.unwrap()
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }

        assert_eq!(db.delete_profiles_for_user("u1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_for_user_is_scoped() {
        let db = MemoryDb::new();
        db.insert_social_link(&link("u1", "a")).await.unwrap();
        db.insert_social_link(&link("u1", "b")).await.unwrap();
        db.insert_social_link(&link("u2", "c")).await.unwrap();

        assert_eq!(db.delete_social_links_for_user("u1").await.unwrap(), 2);
        assert!(db.list_social_links_for_user("u1").await.unwrap().is_empty());
        assert_eq!(db.list_social_links_for_user("u2").await.unwrap().len(), 1);
    }
}

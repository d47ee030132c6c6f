// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile bundle assembly: a user joined with its profile and social links.

use crate::db::{DocumentStore, ProfileRepository, SocialLinkRepository, UserRepository};
use crate::error::Result;
use crate::models::{ProfileView, SocialLinkView, User, UserView};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// How to look up the user at the root of a bundle.
#[derive(Debug, Clone, Copy)]
pub enum UserKey<'a> {
    Slug(&'a str),
    Id(&'a str),
}

/// Read-only composite served by the public and `/api/user` routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileBundle {
    pub user: UserView,
    pub profile: ProfileView,
    pub social_links: Vec<SocialLinkView>,
}

impl ProfileBundle {
    /// Look up the user by `key` and assemble its bundle.
    ///
    /// Returns `None` when no user matches. A missing profile is not an
    /// error: its fields come back null.
    pub async fn load(store: &dyn DocumentStore, key: UserKey<'_>) -> Result<Option<Self>> {
        let user = match key {
            UserKey::Slug(slug) => store.find_user_by_slug(slug).await?,
            UserKey::Id(id) => store.get_user(id).await?,
        };

        match user {
            Some(user) => Ok(Some(Self::for_user(store, &user).await?)),
            None => {
                tracing::debug!(?key, "No user for bundle");
                Ok(None)
            }
        }
    }

    /// Assemble the bundle for an already loaded user.
    pub async fn for_user(store: &dyn DocumentStore, user: &User) -> Result<Self> {
        let (profile, links) = futures_util::future::try_join(
            store.get_profile_for_user(&user.id),
            store.list_social_links_for_user(&user.id),
        )
        .await?;

        Ok(Self {
            user: UserView::from(user),
            profile: ProfileView::from(profile),
            social_links: links.into_iter().map(SocialLinkView::from).collect(),
        })
    }
}

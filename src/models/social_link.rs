// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Social link model.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Social link document stored in the `sociallink` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialLink {
    pub id: String,
    /// Owning user ID
    pub user_id: String,
    /// Free-form label, e.g. "linkedin" or "website"
    pub platform: String,
    pub url: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SocialLinkView {
    pub id: String,
    pub platform: String,
    pub url: String,
}

impl From<SocialLink> for SocialLinkView {
    fn from(link: SocialLink) -> Self {
        Self {
            id: link.id,
            platform: link.platform,
            url: link.url,
        }
    }
}

/// Body of `POST /api/social-links`. Both fields must be present.
#[derive(Debug, Clone, Deserialize)]
pub struct SocialLinkCreate {
    pub platform: String,
    pub url: String,
}

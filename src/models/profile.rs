// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile model (job title, company, contact details).

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Profile document stored in the `profile` collection, at most one per user.
///
/// The document ID is the owning user's ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    /// Owning user ID
    pub user_id: String,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub profile_image_path: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Profile {
    /// Empty profile for `user_id`, keyed by the user's ID.
    pub fn empty_for(user_id: &str, now: &str) -> Self {
        Self {
            id: user_id.to_string(),
            user_id: user_id.to_string(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
            ..Default::default()
        }
    }

    /// Overwrite every field present in `update`, even with an empty string.
    pub fn apply(&mut self, update: &ProfileUpdate, now: &str) {
        let fields = [
            (&mut self.job_title, &update.job_title),
            (&mut self.company, &update.company),
            (&mut self.phone_number, &update.phone_number),
            (&mut self.bio, &update.bio),
        ];
        for (current, new) in fields {
            if let Some(value) = new {
                *current = Some(value.clone());
            }
        }
        self.updated_at = now.to_string();
    }
}

/// Profile fields in a bundle. All null when the user has no profile yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileView {
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub profile_image_path: Option<String>,
}

impl From<Option<Profile>> for ProfileView {
    fn from(profile: Option<Profile>) -> Self {
        match profile {
            Some(p) => Self {
                job_title: p.job_title,
                company: p.company,
                phone_number: p.phone_number,
                bio: p.bio,
                profile_image_path: p.profile_image_path,
            },
            None => Self::default(),
        }
    }
}

/// Partial profile update from `PUT /api/profile`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(max = 200))]
    pub job_title: Option<String>,
    #[validate(length(max = 200))]
    pub company: Option<String>,
    #[validate(length(max = 50))]
    pub phone_number: Option<String>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! User model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

/// User document stored in the `user` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Document ID (24 hex chars)
    pub id: String,
    /// Full display name
    pub name: String,
    /// Email address, unique across users
    pub email: String,
    /// PBKDF2 credential, see `services::password`
    pub password_hash: String,
    #[serde(default)]
    pub is_admin: bool,
    /// Public profile slug, unique when set
    #[serde(default)]
    pub profile_slug: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// Apply the non-null fields of an admin update.
    pub fn apply(&mut self, changes: &AdminUserUpdate, now: &str) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(email) = &changes.email {
            self.email = email.clone();
        }
        if let Some(is_admin) = changes.is_admin {
            self.is_admin = is_admin;
        }
        if let Some(slug) = &changes.profile_slug {
            self.profile_slug = Some(slug.clone());
        }
        self.updated_at = now.to_string();
    }
}

/// User as returned by the API (never carries the credential).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub profile_slug: Option<String>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            profile_slug: user.profile_slug.clone(),
        }
    }
}

/// Admin partial update. Absent and null fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct AdminUserUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub is_admin: Option<bool>,
    #[validate(custom(function = "validate_slug"))]
    pub profile_slug: Option<String>,
}

impl AdminUserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.is_admin.is_none()
            && self.profile_slug.is_none()
    }
}

/// Admin request to create a user.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminUserCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
    #[validate(custom(function = "validate_slug"))]
    pub profile_slug: Option<String>,
}

/// Slugs are 1-64 chars of lowercase ASCII letters, digits and inner hyphens.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let well_formed = !slug.is_empty()
        && slug.len() <= 64
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::new("slug"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "65f0c0ffee00000000000001".to_string(),
            name: "Jane Doe".to_string(),
            email: "jane@acme.com".to_string(),
            password_hash: "secret".to_string(),
            is_admin: false,
            profile_slug: Some("jane".to_string()),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_view_omits_credential() {
        let json = serde_json::to_value(UserView::from(&sample_user())).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["id"], "65f0c0ffee00000000000001");
        assert_eq!(json["profile_slug"], "jane");
    }

    #[test]
    fn test_apply_only_touches_provided_fields() {
        let mut user = sample_user();
        let changes = AdminUserUpdate {
            is_admin: Some(true),
            ..Default::default()
        };
        user.apply(&changes, "2026-02-01T00:00:00Z");

        assert!(user.is_admin);
        assert_eq!(user.name, "Jane Doe");
        assert_eq!(user.email, "jane@acme.com");
        assert_eq!(user.updated_at, "2026-02-01T00:00:00Z");
    }

    #[test]
    fn test_slug_rules() {
        assert!(validate_slug("flames-blue").is_ok());
        assert!(validate_slug("a1").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Upper").is_err());
        assert!(validate_slug("-edge").is_err());
        assert!(validate_slug("has space").is_err());
    }

    #[test]
    fn test_update_validation() {
        let bad = AdminUserUpdate {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        assert!(AdminUserUpdate::default().is_empty());
    }
}

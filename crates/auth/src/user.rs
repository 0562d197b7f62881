//! User accounts.
//!
//! A `User` never carries credential material; the password hash is stored
//! beside the record and only reachable through the credential operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::{DomainResult, Entity, UserId};

use crate::validate;

// ─────────────────────────────────────────────────────────────────────────────
// Record
// ─────────────────────────────────────────────────────────────────────────────

/// A user account as returned to callers.
///
/// # Invariants
/// - `username` is unique among live users.
/// - `created_at` never changes after creation.
/// - `updated_at` is refreshed on every successful update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh active user from validated input.
    pub fn from_new(new: NewUser, now: DateTime<Utc>) -> Self {
        Self {
            id: new.id.unwrap_or_default(),
            username: new.username,
            email: new.email,
            display_name: new.display_name,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a validated change set. Identity and `created_at` are untouched.
    pub fn apply(&mut self, changes: UserChanges) {
        if let Some(username) = changes.username {
            self.username = username;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(display_name) = changes.display_name {
            self.display_name = display_name;
        }
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }
    }

    /// Exact-match filter over username or email.
    pub fn matches_filter(&self, filter: &str) -> bool {
        filter.is_empty() || self.username == filter || self.email == filter
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn natural_key(&self) -> &str {
        &self.username
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inputs
// ─────────────────────────────────────────────────────────────────────────────

/// Input for creating a user. The password travels separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    /// Caller-supplied identifier; generated when absent.
    pub id: Option<UserId>,
    pub username: String,
    pub email: String,
    pub display_name: String,
}

impl NewUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }

    /// Normalize and validate every field.
    pub fn validated(self) -> DomainResult<Self> {
        Ok(Self {
            id: self.id,
            username: validate::username(&self.username)?,
            email: validate::email(&self.email)?,
            display_name: self.display_name.trim().to_string(),
        })
    }
}

/// Partial update of a user; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub is_active: Option<bool>,
}

impl UserChanges {
    pub fn validated(self) -> DomainResult<Self> {
        Ok(Self {
            username: self.username.as_deref().map(validate::username).transpose()?,
            email: self.email.as_deref().map(validate::email).transpose()?,
            display_name: self.display_name.map(|d| d.trim().to_string()),
            is_active: self.is_active,
        })
    }
}

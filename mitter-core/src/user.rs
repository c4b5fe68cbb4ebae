//! User accounts
//!
//! | Field        | Type       | Description                                   |
//! | ------------ | ---------- | --------------------------------------------- |
//! | `id`         | `UserId`   | Opaque unique identifier.                     |
//! | `login`      | `String`   | Unique sign-in name, 2 to 50 characters.      |
//! | `name`       | `String`   | Display name, 2 to 50 characters.             |
//! | `created_at` | `DateTime` | The timestamp when the user signed up.        |
//! | `updated_at` | `DateTime` | The timestamp when the profile last changed.  |
//!
//! The password hash is deliberately absent from [`User`]. It is only
//! reachable through [`PasswordRepository`](crate::repositories::PasswordRepository),
//! so a profile can be handed to any caller without leaking credentials.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::prefixed_id;

prefixed_id!(
    /// A unique, stable identifier for a specific user
    UserId,
    "usr"
);

impl Default for UserId {
    fn default() -> Self {
        Self::new_random()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub login: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for a new account. The password must already be hashed.
#[derive(Clone)]
pub struct NewUser {
    pub id: UserId,
    pub login: String,
    pub name: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn new(login: &str, name: &str, password_hash: String) -> Self {
        Self {
            id: UserId::new_random(),
            login: login.to_string(),
            name: name.to_string(),
            password_hash,
        }
    }
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("id", &self.id)
            .field("login", &self.login)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Partial profile update. Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
}

impl UserUpdate {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

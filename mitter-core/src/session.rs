//! Session management
//!
//! A session maps an opaque bearer token to a user id until a fixed expiry.
//!
//! | Field        | Type           | Description                                 |
//! | ------------ | -------------- | ------------------------------------------- |
//! | `token`      | `SessionToken` | Opaque random token handed to the client.   |
//! | `user_id`    | `UserId`       | The user the token authenticates.           |
//! | `created_at` | `DateTime`     | The timestamp when the session was issued.  |
//! | `expires_at` | `DateTime`     | The timestamp after which the token is void. |
//!
//! Stores persist [`SessionToken::token_hash`] rather than the token itself.
use chrono::{DateTime, Duration, Utc};

use crate::{
    UserId,
    crypto::{generate_secure_token, hash_token, verify_token_hash},
    error::CryptoError,
};

/// Default lifetime of a session.
pub const DEFAULT_SESSION_EXPIRY_HOURS: i64 = 24;

pub fn default_session_expiry() -> Duration {
    Duration::hours(DEFAULT_SESSION_EXPIRY_HOURS)
}

/// Opaque session token with 256 bits of entropy.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: &str) -> Self {
        Self(token.to_string())
    }

    pub fn new_random() -> Result<Self, CryptoError> {
        generate_secure_token().map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// SHA-256 digest of the token, the form stores persist.
    pub fn token_hash(&self) -> String {
        hash_token(&self.0)
    }

    pub fn verify_hash(&self, stored_hash: &str) -> bool {
        verify_token_hash(&self.0, stored_hash)
    }
}

impl From<String> for SessionToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: SessionToken,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Issue a fresh session for `user_id` that lives for `expires_in`.
    pub fn issue(user_id: &UserId, expires_in: Duration) -> Result<Self, CryptoError> {
        let now = Utc::now();
        Ok(Self {
            token: SessionToken::new_random()?,
            user_id: user_id.clone(),
            created_at: now,
            expires_at: now + expires_in,
        })
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

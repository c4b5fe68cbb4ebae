//! Runtime configuration
//!
//! [`MitterConfig`] collects everything needed to stand up a [`Mitter`](crate::Mitter)
//! instance. It can be built by hand or loaded from the process environment
//! (and a `.env` file, if one is present).
//!
//! | Variable                     | Default           | Meaning                                  |
//! | ---------------------------- | ----------------- | ---------------------------------------- |
//! | `MITTER_DATABASE_URL`        | `sqlite::memory:` | Storage connection URL                   |
//! | `MITTER_SESSION_TTL_SECS`    | `86400`           | Lifetime of an issued session in seconds |
//! | `MITTER_DEFAULT_PAGE_LIMIT`  | `30`              | Page size when a caller sends no limit   |
//! | `MITTER_APPLY_MIGRATIONS`    | `true`            | Run schema migrations while building     |
use chrono::Duration;
use mitter_core::{pagination::DEFAULT_LIMIT, session::default_session_expiry};

use crate::MitterBuilderError;

pub const DATABASE_URL_VAR: &str = "MITTER_DATABASE_URL";
pub const SESSION_TTL_VAR: &str = "MITTER_SESSION_TTL_SECS";
pub const DEFAULT_PAGE_LIMIT_VAR: &str = "MITTER_DEFAULT_PAGE_LIMIT";
pub const APPLY_MIGRATIONS_VAR: &str = "MITTER_APPLY_MIGRATIONS";

/// The configuration for issued sessions.
///
/// # Example
///
/// ```rust
/// use mitter::SessionConfig;
/// use chrono::Duration;
///
/// let config = SessionConfig::default().expires_in(Duration::hours(1));
/// assert_eq!(config.expires_in, Duration::hours(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// The duration until a session expires
    pub expires_in: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expires_in: default_session_expiry(),
        }
    }
}

impl SessionConfig {
    pub fn expires_in(mut self, duration: Duration) -> Self {
        self.expires_in = duration;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MitterConfig {
    pub database_url: String,
    pub session_expiry: Duration,
    pub default_page_limit: u32,
    pub apply_migrations: bool,
}

impl Default for MitterConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            session_expiry: default_session_expiry(),
            default_page_limit: DEFAULT_LIMIT,
            apply_migrations: true,
        }
    }
}

impl MitterConfig {
    /// Load configuration from the environment, after reading a `.env` file
    /// from the working directory or its parents when one exists.
    ///
    /// Unset variables keep their default. Set but malformed variables are an
    /// error.
    pub fn from_env() -> Result<Self, MitterBuilderError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "Failed to read .env file");
            }
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MitterBuilderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(DATABASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
            config.database_url = url;
        }

        if let Some(raw) = lookup(SESSION_TTL_VAR) {
            let secs = raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| invalid(SESSION_TTL_VAR, &raw))?;
            config.session_expiry = Duration::seconds(secs);
        }

        if let Some(raw) = lookup(DEFAULT_PAGE_LIMIT_VAR) {
            config.default_page_limit = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or_else(|| invalid(DEFAULT_PAGE_LIMIT_VAR, &raw))?;
        }

        if let Some(raw) = lookup(APPLY_MIGRATIONS_VAR) {
            config.apply_migrations =
                parse_bool(&raw).ok_or_else(|| invalid(APPLY_MIGRATIONS_VAR, &raw))?;
        }

        Ok(config)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(var: &str, value: &str) -> MitterBuilderError {
    MitterBuilderError::InvalidConfiguration(format!("{var} has an invalid value: {value:?}"))
}

//! SQLite storage backend for mitter
//!
//! [`SqliteRepositoryProvider`] implements every repository contract of
//! `mitter-core` over a single [`SqlitePool`]. Timestamps are stored as unix
//! milliseconds and foreign keys are enforced, so deleting a user removes
//! their sessions, follow edges and likes while their mitts stay.
//!
//! ```rust,no_run
//! use mitter_core::RepositoryProvider;
//! use mitter_storage_sqlite::SqliteRepositoryProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repositories = SqliteRepositoryProvider::connect("sqlite::memory:").await?;
//! repositories.migrate().await?;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod migrations;
pub mod repositories;

pub use repositories::{
    SqliteFollowRepository, SqliteLikeRepository, SqliteMittRepository,
    SqlitePasswordRepository, SqliteRepositoryProvider, SqliteSessionRepository,
    SqliteUserRepository,
};

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

impl SqliteRepositoryProvider {
    /// Open a pool for the given SQLite URL, creating the database file if
    /// it does not exist.
    ///
    /// An in-memory database lives inside a single connection, so its pool
    /// is capped at one connection that is never recycled.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = if url.contains(":memory:") || url.contains("mode=memory") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePool::connect_with(options).await?
        };

        Ok(Self::new(pool))
    }
}

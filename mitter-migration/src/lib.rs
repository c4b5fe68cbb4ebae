//! Schema migrations for mitter storage backends
//!
//! A backend lists its schema changes as [`Migration`] values with strictly
//! increasing versions and applies them through a [`MigrationManager`], which
//! records each applied version in a ledger table so a migration runs at
//! most once per database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mitter_core::StorageError;
use sqlx::Database;
use thiserror::Error;

/// Name of the ledger table recording applied migrations.
pub const MIGRATION_TABLE: &str = "_mitter_migrations";

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration failed: {0}")]
    Migration(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<MigrationError> for StorageError {
    fn from(err: MigrationError) -> Self {
        StorageError::Migration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;

#[async_trait]
pub trait Migration<DB: Database>: Send + Sync {
    /// Apply the schema change
    async fn up<'a>(&'a self, conn: &'a mut <DB as Database>::Connection) -> Result<()>;

    /// Unique version number, migrations apply in ascending order
    fn version(&self) -> i64;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    /// Unix seconds
    pub applied_at: i64,
}

impl MigrationRecord {
    pub fn applied_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.applied_at, 0)
    }
}

/// Reject a migration list whose versions are not strictly increasing.
pub fn check_ordering<DB: Database>(migrations: &[Box<dyn Migration<DB>>]) -> Result<()> {
    for pair in migrations.windows(2) {
        if pair[1].version() <= pair[0].version() {
            return Err(MigrationError::Migration(format!(
                "migration {} (version {}) must come after {} (version {})",
                pair[1].name(),
                pair[1].version(),
                pair[0].name(),
                pair[0].version()
            )));
        }
    }
    Ok(())
}

#[async_trait]
pub trait MigrationManager<DB: Database>: Send + Sync {
    fn get_migration_table_name(&self) -> &str {
        MIGRATION_TABLE
    }

    /// Create the ledger table if it does not exist
    async fn initialize(&self) -> Result<()>;

    /// Apply every migration not yet recorded in the ledger
    async fn up(&self, migrations: &[Box<dyn Migration<DB>>]) -> Result<()>;

    /// Applied migrations ordered by version
    async fn get_applied_migrations(&self) -> Result<Vec<MigrationRecord>>;

    async fn is_applied(&self, version: i64) -> Result<bool>;

    /// Highest applied version, `None` on a fresh database
    async fn current_version(&self) -> Result<Option<i64>> {
        Ok(self
            .get_applied_migrations()
            .await?
            .iter()
            .map(|record| record.version)
            .max())
    }
}

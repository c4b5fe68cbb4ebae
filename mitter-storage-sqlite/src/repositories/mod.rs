//! Repository implementations for SQLite storage

pub mod follow;
pub mod like;
pub mod mitt;
pub mod password;
pub mod session;
pub mod user;

pub use follow::SqliteFollowRepository;
pub use like::SqliteLikeRepository;
pub use mitt::SqliteMittRepository;
pub use password::SqlitePasswordRepository;
pub use session::SqliteSessionRepository;
pub use user::SqliteUserRepository;

use async_trait::async_trait;
use mitter_core::{
    StorageError,
    repositories::{
        FollowRepositoryProvider, LikeRepositoryProvider, MittRepositoryProvider,
        PasswordRepositoryProvider, RepositoryProvider, SessionRepositoryProvider,
        UserRepositoryProvider,
    },
};
use mitter_migration::{MigrationManager, check_ordering};
use sqlx::SqlitePool;

use crate::error::DatabaseResultExt;
use crate::migrations::{self, SqliteMigrationManager};

/// Repository provider implementation for SQLite
///
/// Every repository shares one connection pool.
pub struct SqliteRepositoryProvider {
    pool: SqlitePool,
    user: SqliteUserRepository,
    password: SqlitePasswordRepository,
    session: SqliteSessionRepository,
    follow: SqliteFollowRepository,
    mitt: SqliteMittRepository,
    like: SqliteLikeRepository,
}

impl SqliteRepositoryProvider {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            user: SqliteUserRepository::new(pool.clone()),
            password: SqlitePasswordRepository::new(pool.clone()),
            session: SqliteSessionRepository::new(pool.clone()),
            follow: SqliteFollowRepository::new(pool.clone()),
            mitt: SqliteMittRepository::new(pool.clone()),
            like: SqliteLikeRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl UserRepositoryProvider for SqliteRepositoryProvider {
    type UserRepo = SqliteUserRepository;

    fn user(&self) -> &Self::UserRepo {
        &self.user
    }
}

impl PasswordRepositoryProvider for SqliteRepositoryProvider {
    type PasswordRepo = SqlitePasswordRepository;

    fn password(&self) -> &Self::PasswordRepo {
        &self.password
    }
}

impl SessionRepositoryProvider for SqliteRepositoryProvider {
    type SessionRepo = SqliteSessionRepository;

    fn session(&self) -> &Self::SessionRepo {
        &self.session
    }
}

impl FollowRepositoryProvider for SqliteRepositoryProvider {
    type FollowRepo = SqliteFollowRepository;

    fn graph(&self) -> &Self::FollowRepo {
        &self.follow
    }
}

impl MittRepositoryProvider for SqliteRepositoryProvider {
    type MittRepo = SqliteMittRepository;

    fn mitt(&self) -> &Self::MittRepo {
        &self.mitt
    }
}

impl LikeRepositoryProvider for SqliteRepositoryProvider {
    type LikeRepo = SqliteLikeRepository;

    fn likes(&self) -> &Self::LikeRepo {
        &self.like
    }
}

#[async_trait]
impl RepositoryProvider for SqliteRepositoryProvider {
    async fn migrate(&self) -> Result<(), StorageError> {
        let migrations = migrations::all();
        check_ordering(&migrations)?;

        let manager = SqliteMigrationManager::new(self.pool.clone());
        manager.initialize().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to initialize migrations");
            StorageError::from(e)
        })?;

        manager.up(&migrations).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            StorageError::from(e)
        })?;

        Ok(())
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_db_err()?;
        Ok(())
    }
}

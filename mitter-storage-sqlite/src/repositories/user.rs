use async_trait::async_trait;
use chrono::Utc;
use mitter_core::{NewUser, StorageError, User, UserId, UserUpdate, repositories::UserRepository};
use sqlx::SqlitePool;

use crate::error::{DatabaseResultExt, from_millis};

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SqliteUser {
    id: String,
    login: String,
    name: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<SqliteUser> for User {
    type Error = StorageError;

    fn try_from(user: SqliteUser) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::new(&user.id),
            login: user.login,
            name: user.name,
            created_at: from_millis("users.created_at", user.created_at)?,
            updated_at: from_millis("users.updated_at", user.updated_at)?,
        })
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, StorageError> {
        let now = Utc::now().timestamp_millis();

        let sqlite_user = sqlx::query_as::<_, SqliteUser>(
            r#"
            INSERT INTO users (id, login, name, password_hash, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING id, login, name, created_at, updated_at
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.login)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_db_err()?;

        sqlite_user.try_into()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StorageError> {
        sqlx::query_as::<_, SqliteUser>(
            "SELECT id, login, name, created_at, updated_at FROM users WHERE id = ?1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_db_err()?
        .map(User::try_from)
        .transpose()
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StorageError> {
        sqlx::query_as::<_, SqliteUser>(
            "SELECT id, login, name, created_at, updated_at FROM users WHERE login = ?1",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_db_err()?
        .map(User::try_from)
        .transpose()
    }

    async fn update(&self, id: &UserId, update: &UserUpdate) -> Result<(), StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE(?2, name), updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id.as_str())
        .bind(update.name.as_deref())
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await
        .map_db_err()?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_db_err()?;

        Ok(())
    }
}

use async_trait::async_trait;
use chrono::Utc;
use mitter_core::{
    Session, StorageError, UserId, repositories::SessionRepository, session::SessionToken,
};
use sqlx::SqlitePool;

use crate::error::{DatabaseResultExt, from_millis};

pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SqliteSession {
    token: String, // SHA-256 digest of the token
    user_id: String,
    created_at: i64,
    expires_at: i64,
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn create(&self, session: &Session) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token, user_id, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(session.token.token_hash())
        .bind(session.user_id.as_str())
        .bind(session.created_at.timestamp_millis())
        .bind(session.expires_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_db_err()?;

        Ok(())
    }

    async fn find_by_token(&self, token: &SessionToken) -> Result<Option<Session>, StorageError> {
        let sqlite_session = sqlx::query_as::<_, SqliteSession>(
            "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = ?1",
        )
        .bind(token.token_hash())
        .fetch_optional(&self.pool)
        .await
        .map_db_err()?;

        match sqlite_session {
            Some(s) if token.verify_hash(&s.token) => Ok(Some(Session {
                token: token.clone(),
                user_id: UserId::new(&s.user_id),
                created_at: from_millis("sessions.created_at", s.created_at)?,
                expires_at: from_millis("sessions.expires_at", s.expires_at)?,
            })),
            _ => Ok(None),
        }
    }

    async fn delete(&self, token: &SessionToken) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?1")
            .bind(token.token_hash())
            .execute(&self.pool)
            .await
            .map_db_err()?;

        Ok(())
    }

    async fn cleanup_expired(&self) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?1")
            .bind(Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await
            .map_db_err()?;

        Ok(result.rows_affected())
    }
}

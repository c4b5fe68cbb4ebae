use async_trait::async_trait;
use chrono::Utc;
use mitter_core::{MittId, StorageError, UserId, repositories::LikeRepository};
use sqlx::SqlitePool;

use crate::error::DatabaseResultExt;

pub struct SqliteLikeRepository {
    pool: SqlitePool,
}

impl SqliteLikeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for SqliteLikeRepository {
    async fn is_liked(&self, user: &UserId, mitt: &MittId) -> Result<bool, StorageError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM likes WHERE user_id = ?1 AND mitt_id = ?2)",
        )
        .bind(user.as_str())
        .bind(mitt.as_str())
        .fetch_one(&self.pool)
        .await
        .map_db_err()
    }

    async fn like(&self, user: &UserId, mitt: &MittId) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO likes (user_id, mitt_id, created_at) VALUES (?1, ?2, ?3)
            ON CONFLICT (user_id, mitt_id) DO NOTHING
            "#,
        )
        .bind(user.as_str())
        .bind(mitt.as_str())
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await
        .map_db_err()?;

        Ok(result.rows_affected() == 1)
    }

    async fn unlike(&self, user: &UserId, mitt: &MittId) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = ?1 AND mitt_id = ?2")
            .bind(user.as_str())
            .bind(mitt.as_str())
            .execute(&self.pool)
            .await
            .map_db_err()?;

        Ok(result.rows_affected() == 1)
    }

    async fn count(&self, mitt: &MittId) -> Result<i64, StorageError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE mitt_id = ?1")
            .bind(mitt.as_str())
            .fetch_one(&self.pool)
            .await
            .map_db_err()
    }
}

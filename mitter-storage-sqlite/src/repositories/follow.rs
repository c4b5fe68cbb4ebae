use async_trait::async_trait;
use chrono::Utc;
use mitter_core::{Page, StorageError, UserId, repositories::FollowRepository};
use sqlx::SqlitePool;

use crate::error::DatabaseResultExt;

pub struct SqliteFollowRepository {
    pool: SqlitePool,
}

impl SqliteFollowRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn into_ids(rows: Vec<String>) -> Vec<UserId> {
    rows.into_iter().map(UserId::from).collect()
}

#[async_trait]
impl FollowRepository for SqliteFollowRepository {
    async fn follow(&self, follower: &UserId, followee: &UserId) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO follows (follower_id, followee_id, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(follower.as_str())
        .bind(followee.as_str())
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await
        .map_db_err()?;

        Ok(())
    }

    async fn unfollow(&self, follower: &UserId, followee: &UserId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM follows WHERE follower_id = ?1 AND followee_id = ?2")
            .bind(follower.as_str())
            .bind(followee.as_str())
            .execute(&self.pool)
            .await
            .map_db_err()?;

        Ok(())
    }

    async fn follows(&self, follower: &UserId, page: Page) -> Result<Vec<UserId>, StorageError> {
        let rows = sqlx::query_scalar::<_, String>(
            r#"
            SELECT followee_id FROM follows
            WHERE follower_id = ?1
            ORDER BY created_at DESC, followee_id ASC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(follower.as_str())
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await
        .map_db_err()?;

        Ok(into_ids(rows))
    }

    async fn followers(
        &self,
        followee: &UserId,
        page: Page,
    ) -> Result<Vec<UserId>, StorageError> {
        let rows = sqlx::query_scalar::<_, String>(
            r#"
            SELECT follower_id FROM follows
            WHERE followee_id = ?1
            ORDER BY created_at DESC, follower_id ASC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(followee.as_str())
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await
        .map_db_err()?;

        Ok(into_ids(rows))
    }

    async fn friends(&self, user: &UserId) -> Result<Vec<UserId>, StorageError> {
        let rows = sqlx::query_scalar::<_, String>(
            r#"
            SELECT incoming.follower_id FROM follows AS incoming
            JOIN follows AS outgoing
              ON outgoing.follower_id = incoming.followee_id
             AND outgoing.followee_id = incoming.follower_id
            WHERE incoming.followee_id = ?1
            ORDER BY incoming.created_at DESC, incoming.follower_id ASC
            "#,
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await
        .map_db_err()?;

        Ok(into_ids(rows))
    }
}

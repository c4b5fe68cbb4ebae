use async_trait::async_trait;
use chrono::Utc;
use mitter_core::{
    Mitt, MittId, NewMitt, Page, StorageError, UserId, repositories::MittRepository,
};
use sqlx::SqlitePool;

use crate::error::{DatabaseResultExt, from_millis};

pub struct SqliteMittRepository {
    pool: SqlitePool,
}

impl SqliteMittRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SqliteMitt {
    id: String,
    author_id: String,
    content: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<SqliteMitt> for Mitt {
    type Error = StorageError;

    fn try_from(mitt: SqliteMitt) -> Result<Self, Self::Error> {
        Ok(Mitt {
            id: MittId::new(&mitt.id),
            author: UserId::new(&mitt.author_id),
            author_name: String::new(),
            content: mitt.content,
            created_at: from_millis("mitts.created_at", mitt.created_at)?,
            updated_at: from_millis("mitts.updated_at", mitt.updated_at)?,
            likes: 0,
        })
    }
}

fn into_mitts(rows: Vec<SqliteMitt>) -> Result<Vec<Mitt>, StorageError> {
    rows.into_iter().map(Mitt::try_from).collect()
}

#[async_trait]
impl MittRepository for SqliteMittRepository {
    async fn create(&self, mitt: NewMitt) -> Result<Mitt, StorageError> {
        let now = Utc::now().timestamp_millis();

        sqlx::query_as::<_, SqliteMitt>(
            r#"
            INSERT INTO mitts (id, author_id, content, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            RETURNING id, author_id, content, created_at, updated_at
            "#,
        )
        .bind(mitt.id.as_str())
        .bind(mitt.author.as_str())
        .bind(&mitt.content)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_db_err()?
        .try_into()
    }

    async fn find_by_id(&self, id: &MittId) -> Result<Option<Mitt>, StorageError> {
        sqlx::query_as::<_, SqliteMitt>(
            "SELECT id, author_id, content, created_at, updated_at FROM mitts WHERE id = ?1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_db_err()?
        .map(Mitt::try_from)
        .transpose()
    }

    async fn find_by_author(
        &self,
        author: &UserId,
        page: Page,
    ) -> Result<Vec<Mitt>, StorageError> {
        let rows = sqlx::query_as::<_, SqliteMitt>(
            r#"
            SELECT id, author_id, content, created_at, updated_at FROM mitts
            WHERE author_id = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(author.as_str())
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await
        .map_db_err()?;

        into_mitts(rows)
    }

    async fn update(&self, id: &MittId, content: &str) -> Result<Option<Mitt>, StorageError> {
        sqlx::query_as::<_, SqliteMitt>(
            r#"
            UPDATE mitts SET content = ?2, updated_at = ?3
            WHERE id = ?1
            RETURNING id, author_id, content, created_at, updated_at
            "#,
        )
        .bind(id.as_str())
        .bind(content)
        .bind(Utc::now().timestamp_millis())
        .fetch_optional(&self.pool)
        .await
        .map_db_err()?
        .map(Mitt::try_from)
        .transpose()
    }

    async fn delete(&self, id: &MittId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM mitts WHERE id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_db_err()?;

        Ok(())
    }

    async fn feed(&self, page: Page) -> Result<Vec<Mitt>, StorageError> {
        let rows = sqlx::query_as::<_, SqliteMitt>(
            r#"
            SELECT id, author_id, content, created_at, updated_at FROM mitts
            ORDER BY created_at DESC, id DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await
        .map_db_err()?;

        into_mitts(rows)
    }
}

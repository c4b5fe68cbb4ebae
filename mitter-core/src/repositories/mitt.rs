use crate::{Mitt, MittId, NewMitt, Page, StorageError, UserId};
use async_trait::async_trait;

/// Repository for mitt data access
///
/// Returned mitts carry stored fields only; `author_name` and `likes` are
/// left at their zero values for the service to fill in.
#[async_trait]
pub trait MittRepository: Send + Sync + 'static {
    async fn create(&self, mitt: NewMitt) -> Result<Mitt, StorageError>;

    async fn find_by_id(&self, id: &MittId) -> Result<Option<Mitt>, StorageError>;

    /// One author's mitts, newest first
    async fn find_by_author(&self, author: &UserId, page: Page)
    -> Result<Vec<Mitt>, StorageError>;

    /// Replace the content of a mitt, returning the updated record
    async fn update(&self, id: &MittId, content: &str) -> Result<Option<Mitt>, StorageError>;

    async fn delete(&self, id: &MittId) -> Result<(), StorageError>;

    /// Mitts across all authors ordered by creation time descending, id
    /// descending as tiebreak
    async fn feed(&self, page: Page) -> Result<Vec<Mitt>, StorageError>;
}

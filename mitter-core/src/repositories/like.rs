use crate::{MittId, StorageError, UserId};
use async_trait::async_trait;

/// Repository for like edges
#[async_trait]
pub trait LikeRepository: Send + Sync + 'static {
    async fn is_liked(&self, user: &UserId, mitt: &MittId) -> Result<bool, StorageError>;

    /// Insert the like if absent. Returns `true` when a row was written.
    async fn like(&self, user: &UserId, mitt: &MittId) -> Result<bool, StorageError>;

    /// Remove the like if present. Returns `true` when a row was removed.
    async fn unlike(&self, user: &UserId, mitt: &MittId) -> Result<bool, StorageError>;

    /// Number of likes on a mitt
    ///
    /// A mitt the store does not know may be reported as
    /// [`StorageError::NotFound`] or as zero.
    async fn count(&self, mitt: &MittId) -> Result<i64, StorageError>;
}

use crate::{Page, StorageError, UserId};
use async_trait::async_trait;

/// Repository for the directed follow graph
#[async_trait]
pub trait FollowRepository: Send + Sync + 'static {
    /// Insert the edge `follower -> followee`
    ///
    /// An existing edge is reported as [`StorageError::UniqueViolation`].
    async fn follow(&self, follower: &UserId, followee: &UserId) -> Result<(), StorageError>;

    /// Remove the edge `follower -> followee` if it exists
    async fn unfollow(&self, follower: &UserId, followee: &UserId) -> Result<(), StorageError>;

    /// Ids of the users `follower` follows
    async fn follows(&self, follower: &UserId, page: Page) -> Result<Vec<UserId>, StorageError>;

    /// Ids of the users following `followee`
    async fn followers(&self, followee: &UserId, page: Page)
    -> Result<Vec<UserId>, StorageError>;

    /// Ids of the users that follow `user` and are followed back
    async fn friends(&self, user: &UserId) -> Result<Vec<UserId>, StorageError>;
}

use crate::{NewUser, StorageError, User, UserId, UserUpdate};
use async_trait::async_trait;

/// Repository for user data access
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Create a new user
    ///
    /// A login already in use is reported as [`StorageError::UniqueViolation`].
    async fn create(&self, user: NewUser) -> Result<User, StorageError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StorageError>;

    /// Find a user by login
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StorageError>;

    /// Apply the provided fields of `update`, leaving the others untouched
    async fn update(&self, id: &UserId, update: &UserUpdate) -> Result<(), StorageError>;

    /// Delete a user by ID
    async fn delete(&self, id: &UserId) -> Result<(), StorageError>;
}

use crate::{StorageError, UserId};
use async_trait::async_trait;

/// Repository for password-related data access
#[async_trait]
pub trait PasswordRepository: Send + Sync + 'static {
    /// Store a password hash for a user
    async fn set_password_hash(&self, user_id: &UserId, hash: &str) -> Result<(), StorageError>;

    /// Retrieve a user's password hash, `None` when the user does not exist
    async fn get_password_hash(&self, user_id: &UserId) -> Result<Option<String>, StorageError>;
}

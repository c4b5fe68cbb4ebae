use crate::{Session, StorageError, session::SessionToken};
use async_trait::async_trait;

/// Repository for session data access
///
/// Implementations key sessions by [`SessionToken::token_hash`]; the plaintext
/// token is never stored.
#[async_trait]
pub trait SessionRepository: Send + Sync + 'static {
    /// Store a new session
    async fn create(&self, session: &Session) -> Result<(), StorageError>;

    /// Find a session by token, expired or not
    async fn find_by_token(&self, token: &SessionToken) -> Result<Option<Session>, StorageError>;

    /// Delete a session by token
    async fn delete(&self, token: &SessionToken) -> Result<(), StorageError>;

    /// Remove expired sessions, returning how many were removed
    async fn cleanup_expired(&self) -> Result<u64, StorageError>;
}

pub mod utilities;

pub use utilities::{OptionalResultExt, StorageResultExt};

use thiserror::Error;

/// Message carried by every [`ErrorKind::Internal`] error. Storage and
/// hashing failures are logged where they happen and never reach callers.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Status class of a service error.
///
/// The boundary layer maps each class 1:1 onto a transport status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthorized,
    BadRequest,
    Conflict,
    NotFound,
    Forbidden,
    Internal,
}

impl ErrorKind {
    /// The canonical HTTP status number for this class.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Unauthorized => 401,
            ErrorKind::BadRequest => 400,
            ErrorKind::Conflict => 409,
            ErrorKind::NotFound => 404,
            ErrorKind::Forbidden => 403,
            ErrorKind::Internal => 500,
        }
    }
}

/// Structured error returned by every service operation: a status class plus
/// a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn internal() -> Self {
        Self::new(ErrorKind::Internal, INTERNAL_MESSAGE)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }
}

/// Errors reported by repository implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Record not found")]
    NotFound,

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound)
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StorageError::UniqueViolation(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid login: {0}")]
    InvalidLogin(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid content: {0}")]
    InvalidContent(String),

    #[error("{0}")]
    InvalidPagination(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::bad_request(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Random generator failed: {0}")]
    Random(String),
}

impl From<CryptoError> for Error {
    fn from(err: CryptoError) -> Self {
        tracing::error!(error = %err, "Cryptographic operation failed");
        Error::internal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_is_message_only() {
        let err = Error::unauthorized("Invalid login or password");
        assert_eq!(err.to_string(), "Invalid login or password");
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_internal_error_hides_details() {
        let err = Error::internal();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.message(), INTERNAL_MESSAGE);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::Unauthorized.status_code(), 401);
        assert_eq!(ErrorKind::BadRequest.status_code(), 400);
        assert_eq!(ErrorKind::Conflict.status_code(), 409);
        assert_eq!(ErrorKind::NotFound.status_code(), 404);
        assert_eq!(ErrorKind::Forbidden.status_code(), 403);
        assert_eq!(Error::internal().status_code(), 500);
    }

    #[test]
    fn test_storage_error_predicates() {
        assert!(StorageError::NotFound.is_not_found());
        assert!(StorageError::UniqueViolation("users.login".to_string()).is_unique_violation());
        assert!(!StorageError::Database("boom".to_string()).is_unique_violation());
        assert!(!StorageError::Database("boom".to_string()).is_not_found());
    }

    #[test]
    fn test_validation_error_becomes_bad_request() {
        let err: Error = ValidationError::InvalidName("too short".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.message(), "Invalid name: too short");
    }

    #[test]
    fn test_crypto_error_becomes_internal() {
        let err: Error = CryptoError::PasswordHash("bad phc string".to_string()).into();
        assert_eq!(err, Error::internal());
    }
}

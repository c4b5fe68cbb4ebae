use chrono::{DateTime, Utc};
use mitter_core::StorageError;

/// Translate a driver error into the repository error taxonomy.
///
/// Constraint violations are recognised by the driver's error code, never by
/// message text.
pub(crate) fn to_storage_error(err: sqlx::Error) -> StorageError {
    match err {
        sqlx::Error::RowNotFound => StorageError::NotFound,
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StorageError::UniqueViolation(db.message().to_string())
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StorageError::Connection(err.to_string())
        }
        other => StorageError::Database(other.to_string()),
    }
}

/// Extension trait mapping sqlx results onto [`StorageError`].
///
/// ```rust,ignore
/// sqlx::query("DELETE FROM users WHERE id = ?1")
///     .bind(id.as_str())
///     .execute(&self.pool)
///     .await
///     .map_db_err()?;
/// ```
pub(crate) trait DatabaseResultExt<T> {
    fn map_db_err(self) -> Result<T, StorageError>;
}

impl<T> DatabaseResultExt<T> for Result<T, sqlx::Error> {
    fn map_db_err(self) -> Result<T, StorageError> {
        self.map_err(to_storage_error)
    }
}

/// Decode a stored unix-millisecond timestamp.
pub(crate) fn from_millis(column: &str, value: i64) -> Result<DateTime<Utc>, StorageError> {
    DateTime::from_timestamp_millis(value)
        .ok_or_else(|| StorageError::Database(format!("invalid timestamp in {column}: {value}")))
}

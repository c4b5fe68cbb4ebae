use crate::{Error, StorageError};

/// Extension trait for repository results that collapses any storage failure
/// into an internal error.
///
/// The storage error is logged with the given context and dropped, so raw
/// storage text never reaches the caller.
///
/// # Example
///
/// ```rust,ignore
/// use mitter_core::error::StorageResultExt;
///
/// let mitts = self.mitts.feed(page).await.or_internal("error getting feed")?;
/// ```
pub trait StorageResultExt<T> {
    fn or_internal(self, context: &str) -> Result<T, Error>;
}

impl<T> StorageResultExt<T> for Result<T, StorageError> {
    fn or_internal(self, context: &str) -> Result<T, Error> {
        self.map_err(|e| {
            tracing::error!(error = %e, "{context}");
            Error::internal()
        })
    }
}

/// Extension trait for optional lookups.
///
/// A missing row, reported either as `Ok(None)` or as
/// [`StorageError::NotFound`], becomes a not-found error with the given
/// message; every other failure is internal.
pub trait OptionalResultExt<T> {
    fn or_not_found(self, message: &str, context: &str) -> Result<T, Error>;
}

impl<T> OptionalResultExt<T> for Result<Option<T>, StorageError> {
    fn or_not_found(self, message: &str, context: &str) -> Result<T, Error> {
        match self {
            Ok(Some(value)) => Ok(value),
            Ok(None) | Err(StorageError::NotFound) => Err(Error::not_found(message)),
            Err(e) => {
                tracing::error!(error = %e, "{context}");
                Err(Error::internal())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_or_internal_collapses_storage_errors() {
        let result: Result<(), StorageError> =
            Err(StorageError::Database("disk I/O error".to_string()));
        let err = result.or_internal("error writing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(!err.message().contains("disk"));
    }

    #[test]
    fn test_or_internal_passes_values_through() {
        let result: Result<i64, StorageError> = Ok(3);
        assert_eq!(result.or_internal("error counting").unwrap(), 3);
    }

    #[test]
    fn test_or_not_found() {
        let found: Result<Option<u8>, StorageError> = Ok(Some(1));
        assert_eq!(found.or_not_found("Thing not found", "ctx").unwrap(), 1);

        let missing: Result<Option<u8>, StorageError> = Ok(None);
        let err = missing.or_not_found("Thing not found", "ctx").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), "Thing not found");

        let no_rows: Result<Option<u8>, StorageError> = Err(StorageError::NotFound);
        let err = no_rows.or_not_found("Thing not found", "ctx").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let broken: Result<Option<u8>, StorageError> =
            Err(StorageError::Connection("refused".to_string()));
        let err = broken.or_not_found("Thing not found", "ctx").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}

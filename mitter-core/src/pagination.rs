//! Limit/offset pagination
//!
//! [`Page`] holds unsigned values, so everything past the boundary can
//! assume non-negative input. [`Page::from_query`] is the parsing step a
//! boundary layer runs on raw query parameters.

use crate::error::ValidationError;

/// Page size used when the caller does not supply one.
pub const DEFAULT_LIMIT: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// Parse raw `limit`/`offset` query values.
    ///
    /// A missing limit falls back to `default_limit` and a missing offset to
    /// zero. Non-numeric values and negative values are rejected.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mitter_core::pagination::Page;
    ///
    /// let page = Page::from_query(Some("10"), None, 30).unwrap();
    /// assert_eq!(page, Page::new(10, 0));
    /// assert!(Page::from_query(Some("-1"), None, 30).is_err());
    /// ```
    pub fn from_query(
        limit: Option<&str>,
        offset: Option<&str>,
        default_limit: u32,
    ) -> Result<Self, ValidationError> {
        let limit = match limit.filter(|s| !s.is_empty()) {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|_| ValidationError::InvalidPagination("invalid limit".to_string()))?,
            None => i64::from(default_limit),
        };

        let offset = match offset.filter(|s| !s.is_empty()) {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|_| ValidationError::InvalidPagination("invalid offset".to_string()))?,
            None => 0,
        };

        if limit < 0 || offset < 0 {
            return Err(ValidationError::InvalidPagination(
                "limit and offset can't be negative".to_string(),
            ));
        }

        let limit = u32::try_from(limit)
            .map_err(|_| ValidationError::InvalidPagination("invalid limit".to_string()))?;
        let offset = u32::try_from(offset)
            .map_err(|_| ValidationError::InvalidPagination("invalid offset".to_string()))?;

        Ok(Self { limit, offset })
    }
}

//! Builder pattern for constructing Mitter instances
//!
//! This module provides a type-safe builder for creating [`Mitter`] instances
//! with compile-time validation of storage configuration.
//!
//! # Example
//!
//! ```rust,no_run
//! use mitter::MitterBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build with SQLite and auto-migration
//!     let mitter = MitterBuilder::new()
//!         .with_sqlite("sqlite::memory:")
//!         .await?
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     // Or build from the environment
//!     let config = mitter::MitterConfig::from_env()?;
//!     let mitter = MitterBuilder::from_config(&config).await?;
//!
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use chrono::Duration;
use mitter_core::{
    MetricsDispatcher, MittMetrics, PrometheusMetrics, RepositoryProvider, UserMetrics,
};
use prometheus::Registry;

use crate::{Mitter, MitterConfig, SessionConfig};

/// Errors that can occur when building a Mitter instance.
#[derive(Debug, thiserror::Error)]
pub enum MitterBuilderError {
    /// Failed to connect to storage backend
    #[error("Storage connection failed: {0}")]
    StorageConnection(String),

    /// Failed to run database migrations
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Marker type indicating no storage has been configured yet.
///
/// This is the initial state of [`MitterBuilder`].
pub struct NoStorage;

/// Marker type indicating storage has been configured.
pub struct WithStorage<R: RepositoryProvider> {
    repositories: Arc<R>,
}

/// A type-safe builder for constructing [`Mitter`] instances.
///
/// Storage must be configured before `build` becomes available:
///
/// - [`NoStorage`]: initial state
/// - [`WithStorage<R>`]: storage configured, ready to build or add more configuration
///
/// # Example
///
/// ```rust,no_run
/// use mitter::MitterBuilder;
/// use chrono::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mitter = MitterBuilder::new()
///         .with_sqlite("sqlite::memory:")
///         .await?
///         .with_session_expiry(Duration::hours(1))
///         .apply_migrations(true)
///         .build()
///         .await?;
///
///     Ok(())
/// }
/// ```
pub struct MitterBuilder<Storage> {
    storage: Storage,
    session_config: SessionConfig,
    default_page_limit: u32,
    apply_migrations: bool,
    user_metrics: Option<Arc<dyn UserMetrics>>,
    mitt_metrics: Option<Arc<dyn MittMetrics>>,
}

impl Default for MitterBuilder<NoStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl MitterBuilder<NoStorage> {
    /// Create a new builder with default configuration.
    ///
    /// # Defaults
    ///
    /// - Session expiry: 24 hours
    /// - Default page limit: 30
    /// - Apply migrations: false
    /// - Metrics: no-op
    pub fn new() -> Self {
        Self {
            storage: NoStorage,
            session_config: SessionConfig::default(),
            default_page_limit: mitter_core::pagination::DEFAULT_LIMIT,
            apply_migrations: false,
            user_metrics: None,
            mitt_metrics: None,
        }
    }

    /// Use an already constructed repository provider.
    pub fn with_repositories<R: RepositoryProvider>(
        self,
        repositories: Arc<R>,
    ) -> MitterBuilder<WithStorage<R>> {
        MitterBuilder {
            storage: WithStorage { repositories },
            session_config: self.session_config,
            default_page_limit: self.default_page_limit,
            apply_migrations: self.apply_migrations,
            user_metrics: self.user_metrics,
            mitt_metrics: self.mitt_metrics,
        }
    }
}

#[cfg(feature = "sqlite")]
impl MitterBuilder<NoStorage> {
    /// Configure SQLite storage by connecting to the given URL.
    ///
    /// # Arguments
    ///
    /// * `url` - SQLite connection URL (e.g., "sqlite::memory:" or "sqlite://path/to/db.sqlite")
    pub async fn with_sqlite(
        self,
        url: &str,
    ) -> Result<MitterBuilder<WithStorage<crate::SqliteRepositoryProvider>>, MitterBuilderError>
    {
        let repositories = crate::SqliteRepositoryProvider::connect(url)
            .await
            .map_err(|e| MitterBuilderError::StorageConnection(e.to_string()))?;

        Ok(self.with_repositories(Arc::new(repositories)))
    }

    /// Configure SQLite storage with an existing connection pool.
    ///
    /// The pool should have foreign keys enabled, otherwise deleting a user
    /// leaves their sessions, follow edges and likes behind.
    pub fn with_sqlite_pool(
        self,
        pool: sqlx::SqlitePool,
    ) -> MitterBuilder<WithStorage<crate::SqliteRepositoryProvider>> {
        self.with_repositories(Arc::new(crate::SqliteRepositoryProvider::new(pool)))
    }

    /// Connect, configure and build in one step from a [`MitterConfig`].
    pub async fn from_config(
        config: &MitterConfig,
    ) -> Result<Mitter<crate::SqliteRepositoryProvider>, MitterBuilderError> {
        MitterBuilder::new()
            .with_sqlite(&config.database_url)
            .await?
            .with_session_expiry(config.session_expiry)
            .with_default_page_limit(config.default_page_limit)
            .apply_migrations(config.apply_migrations)
            .build()
            .await
    }
}

impl<R: RepositoryProvider> MitterBuilder<WithStorage<R>> {
    /// Set the session expiration duration.
    ///
    /// Default: 24 hours
    pub fn with_session_expiry(mut self, duration: Duration) -> Self {
        self.session_config.expires_in = duration;
        self
    }

    /// Set the page size used when a caller supplies no limit.
    ///
    /// Default: 30
    pub fn with_default_page_limit(mut self, limit: u32) -> Self {
        self.default_page_limit = limit;
        self
    }

    /// Report user metrics to `sink` instead of discarding them.
    pub fn with_user_metrics(mut self, sink: Arc<dyn UserMetrics>) -> Self {
        self.user_metrics = Some(sink);
        self
    }

    /// Report mitt metrics to `sink` instead of discarding them.
    pub fn with_mitt_metrics(mut self, sink: Arc<dyn MittMetrics>) -> Self {
        self.mitt_metrics = Some(sink);
        self
    }

    /// Register the Prometheus metrics with `registry` and report both user
    /// and mitt metrics to them.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use mitter::MitterBuilder;
    /// use prometheus::Registry;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let registry = Registry::new();
    /// let mitter = MitterBuilder::new()
    ///     .with_sqlite("sqlite::memory:")
    ///     .await?
    ///     .with_prometheus_metrics(&registry)?
    ///     .apply_migrations(true)
    ///     .build()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_prometheus_metrics(self, registry: &Registry) -> Result<Self, MitterBuilderError> {
        let metrics = Arc::new(PrometheusMetrics::new(registry).map_err(|e| {
            MitterBuilderError::InvalidConfiguration(format!("metrics registration: {e}"))
        })?);

        Ok(self
            .with_user_metrics(metrics.clone())
            .with_mitt_metrics(metrics))
    }

    /// Set whether to automatically apply database migrations during build.
    ///
    /// Default: false
    ///
    /// When `false`, call [`Mitter::migrate`] after building.
    pub fn apply_migrations(mut self, apply: bool) -> Self {
        self.apply_migrations = apply;
        self
    }

    /// Build the Mitter instance, applying migrations first if requested.
    pub async fn build(self) -> Result<Mitter<R>, MitterBuilderError> {
        if self.session_config.expires_in <= Duration::zero() {
            return Err(MitterBuilderError::InvalidConfiguration(
                "session expiry must be positive".to_string(),
            ));
        }
        if self.default_page_limit == 0 {
            return Err(MitterBuilderError::InvalidConfiguration(
                "default page limit must be positive".to_string(),
            ));
        }

        if self.apply_migrations {
            self.storage
                .repositories
                .migrate()
                .await
                .map_err(|e| MitterBuilderError::Migration(e.to_string()))?;
        }

        let user_metrics = match self.user_metrics {
            Some(sink) => MetricsDispatcher::new(sink),
            None => MetricsDispatcher::noop_users(),
        };
        let mitt_metrics = match self.mitt_metrics {
            Some(sink) => MetricsDispatcher::new(sink),
            None => MetricsDispatcher::noop_mitts(),
        };

        Ok(Mitter::from_parts(
            self.storage.repositories,
            self.session_config,
            self.default_page_limit,
            user_metrics,
            mitt_metrics,
        ))
    }
}

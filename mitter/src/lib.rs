//! # Mitter
//!
//! Mitter is the domain service layer of a small social network: accounts
//! with opaque session tokens, a follow graph, and short text posts
//! ("mitts") that can be liked and read through a global feed.
//!
//! The crate wires the services of `mitter-core` over a storage backend and
//! exposes them through a single [`Mitter`] coordinator. Transport concerns
//! (routing, request decoding, status mapping) belong to the caller: every
//! operation returns either a value or an [`Error`] whose [`ErrorKind`]
//! carries the status a boundary layer should answer with.
//!
//! ## Storage Support
//!
//! - SQLite (the `sqlite` feature, enabled by default)
//!
//! ## Example
//!
//! ```rust,no_run
//! use mitter::MitterBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mitter = MitterBuilder::new()
//!         .with_sqlite("sqlite::memory:")
//!         .await?
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     let alice = mitter.sign_up("alice", "Alice", "longenough1").await?;
//!     let token = mitter.sign_in("alice", "longenough1").await?;
//!     assert_eq!(mitter.authenticate(&token).await?, alice);
//!
//!     mitter.create_mitt(&alice, "hello world").await?;
//!     Ok(())
//! }
//! ```
use std::sync::Arc;

use chrono::Duration;
use mitter_core::{
    MetricsDispatcher,
    repositories::{
        FollowRepositoryAdapter, LikeRepositoryAdapter, MittRepositoryAdapter,
        PasswordRepositoryAdapter, SessionRepositoryAdapter, UserRepositoryAdapter,
    },
    services::{AuthService, MittService, UserService},
};

mod builder;
mod config;

pub use builder::{MitterBuilder, MitterBuilderError, NoStorage, WithStorage};
pub use config::{MitterConfig, SessionConfig};

/// Re-export core types from mitter_core
///
/// These types are commonly used when working with the Mitter API.
pub use mitter_core::{
    Error, ErrorKind, Mitt, MittId, MittMetrics, NoopMetrics, Page, PrometheusMetrics,
    RepositoryProvider, SessionToken, StorageError, User, UserId, UserMetrics, UserUpdate,
};

#[cfg(feature = "sqlite")]
pub use mitter_storage_sqlite::SqliteRepositoryProvider;

type Users<R> = UserRepositoryAdapter<R>;

/// The coordinator that owns the services and the storage they run on.
///
/// `Mitter` is cheap to share behind an `Arc`: the services hold no mutable
/// state and every operation takes `&self`.
///
/// # Example
///
/// ```rust,no_run
/// use mitter::{Mitter, SqliteRepositoryProvider};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let repositories = SqliteRepositoryProvider::connect("sqlite::memory:").await?;
///     let mitter = Mitter::new(Arc::new(repositories));
///     mitter.migrate().await?;
///
///     let feed = mitter.feed(mitter.page(None, None)?).await?;
///     assert!(feed.is_empty());
///     Ok(())
/// }
/// ```
pub struct Mitter<R: RepositoryProvider> {
    repositories: Arc<R>,
    auth_service:
        Arc<AuthService<Users<R>, PasswordRepositoryAdapter<R>, SessionRepositoryAdapter<R>>>,
    user_service: Arc<UserService<Users<R>, FollowRepositoryAdapter<R>>>,
    mitt_service: Arc<MittService<MittRepositoryAdapter<R>, LikeRepositoryAdapter<R>, Users<R>>>,
    session_config: SessionConfig,
    default_page_limit: u32,
}

impl<R: RepositoryProvider> Mitter<R> {
    /// Create a new Mitter instance with default settings and no-op metrics
    pub fn new(repositories: Arc<R>) -> Self {
        Self::from_parts(
            repositories,
            SessionConfig::default(),
            mitter_core::pagination::DEFAULT_LIMIT,
            MetricsDispatcher::noop_users(),
            MetricsDispatcher::noop_mitts(),
        )
    }

    pub(crate) fn from_parts(
        repositories: Arc<R>,
        session_config: SessionConfig,
        default_page_limit: u32,
        user_metrics: MetricsDispatcher<dyn UserMetrics>,
        mitt_metrics: MetricsDispatcher<dyn MittMetrics>,
    ) -> Self {
        let user_repo = Arc::new(UserRepositoryAdapter::new(repositories.clone()));

        let auth_service = AuthService::new(
            user_repo.clone(),
            Arc::new(PasswordRepositoryAdapter::new(repositories.clone())),
            Arc::new(SessionRepositoryAdapter::new(repositories.clone())),
            user_metrics.clone(),
        )
        .with_session_expiry(session_config.expires_in);

        let user_service = UserService::new(
            user_repo.clone(),
            Arc::new(FollowRepositoryAdapter::new(repositories.clone())),
            user_metrics,
        );

        let mitt_service = MittService::new(
            Arc::new(MittRepositoryAdapter::new(repositories.clone())),
            Arc::new(LikeRepositoryAdapter::new(repositories.clone())),
            user_repo,
            mitt_metrics,
        );

        Self {
            repositories,
            auth_service: Arc::new(auth_service),
            user_service: Arc::new(user_service),
            mitt_service: Arc::new(mitt_service),
            session_config,
            default_page_limit,
        }
    }

    /// Run migrations for all repositories
    pub async fn migrate(&self) -> Result<(), StorageError> {
        self.repositories.migrate().await
    }

    /// Health check for all repositories
    pub async fn health_check(&self) -> Result<(), StorageError> {
        self.repositories.health_check().await
    }

    pub fn session_expiry(&self) -> Duration {
        self.session_config.expires_in
    }

    pub fn default_page_limit(&self) -> u32 {
        self.default_page_limit
    }

    /// Parse raw `limit`/`offset` query values, falling back to the configured
    /// default page size.
    pub fn page(&self, limit: Option<&str>, offset: Option<&str>) -> Result<Page, Error> {
        Ok(Page::from_query(limit, offset, self.default_page_limit)?)
    }

    // Auth

    /// Register an account and return its id
    pub async fn sign_up(&self, login: &str, name: &str, password: &str) -> Result<UserId, Error> {
        self.auth_service.sign_up(login, name, password).await
    }

    /// Exchange credentials for a session token
    pub async fn sign_in(&self, login: &str, password: &str) -> Result<SessionToken, Error> {
        self.auth_service.sign_in(login, password).await
    }

    pub async fn change_password(
        &self,
        user_id: &UserId,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), Error> {
        self.auth_service
            .change_password(user_id, old_password, new_password)
            .await
    }

    /// Resolve a bearer token to the user it was issued for
    ///
    /// This is the lookup a request guard runs before any authenticated
    /// operation.
    pub async fn authenticate(&self, token: &SessionToken) -> Result<UserId, Error> {
        self.auth_service.authenticate(token).await
    }

    /// Remove every expired session and return how many were deleted
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, Error> {
        self.auth_service.cleanup_expired_sessions().await
    }

    // Users

    pub async fn get_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.user_service.get_user(user_id).await
    }

    pub async fn update_user(&self, user_id: &UserId, update: &UserUpdate) -> Result<(), Error> {
        self.user_service.update_user(user_id, update).await
    }

    pub async fn delete_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.user_service.delete_user(user_id).await
    }

    pub async fn follow_user(&self, follower: &UserId, followee: &UserId) -> Result<(), Error> {
        self.user_service.follow_user(follower, followee).await
    }

    pub async fn unfollow_user(&self, follower: &UserId, followee: &UserId) -> Result<(), Error> {
        self.user_service.unfollow_user(follower, followee).await
    }

    /// Users that `user_id` follows
    pub async fn get_user_follows(&self, user_id: &UserId, page: Page) -> Result<Vec<User>, Error> {
        self.user_service.get_user_follows(user_id, page).await
    }

    /// Users that follow `user_id`
    pub async fn get_user_followers(
        &self,
        user_id: &UserId,
        page: Page,
    ) -> Result<Vec<User>, Error> {
        self.user_service.get_user_followers(user_id, page).await
    }

    /// Users that follow `user_id` and are followed back
    pub async fn get_user_friends(&self, user_id: &UserId) -> Result<Vec<User>, Error> {
        self.user_service.get_user_friends(user_id).await
    }

    // Mitts

    pub async fn create_mitt(&self, author: &UserId, content: &str) -> Result<Mitt, Error> {
        self.mitt_service.create_mitt(author, content).await
    }

    pub async fn get_mitt(&self, mitt_id: &MittId) -> Result<Mitt, Error> {
        self.mitt_service.get_mitt(mitt_id).await
    }

    pub async fn get_all_user_mitts(&self, author: &UserId, page: Page) -> Result<Vec<Mitt>, Error> {
        self.mitt_service.get_all_user_mitts(author, page).await
    }

    pub async fn update_mitt(
        &self,
        acting_user: &UserId,
        mitt_id: &MittId,
        content: &str,
    ) -> Result<Mitt, Error> {
        self.mitt_service
            .update_mitt(acting_user, mitt_id, content)
            .await
    }

    pub async fn delete_mitt(&self, acting_user: &UserId, mitt_id: &MittId) -> Result<(), Error> {
        self.mitt_service.delete_mitt(acting_user, mitt_id).await
    }

    /// Toggle a like and return whether the mitt is now liked by `user`
    pub async fn switch_like(&self, user: &UserId, mitt_id: &MittId) -> Result<bool, Error> {
        self.mitt_service.switch_like(user, mitt_id).await
    }

    /// The newest mitts from every author
    pub async fn feed(&self, page: Page) -> Result<Vec<Mitt>, Error> {
        self.mitt_service.feed(page).await
    }
}

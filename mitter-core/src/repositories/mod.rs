//! Repository traits for the data access layer
//!
//! Services reach storage only through these traits. Each returns
//! [`StorageError`]; translating storage failures into the service
//! [`Error`](crate::Error) taxonomy happens in the services.
//!
//! # Trait Hierarchy
//!
//! - Individual `*Repository` traits define the operations for each data domain
//! - Individual `*RepositoryProvider` traits provide access to each repository type
//! - [`RepositoryProvider`] combines all provider traits plus lifecycle methods
//!
//! The `*RepositoryAdapter` types in [`adapter`] turn a shared
//! `Arc<impl RepositoryProvider>` back into individual repositories, which is
//! how the services are wired over a single storage backend.

pub mod adapter;
pub mod follow;
pub mod like;
pub mod mitt;
pub mod password;
pub mod session;
pub mod user;

pub use adapter::{
    FollowRepositoryAdapter, LikeRepositoryAdapter, MittRepositoryAdapter,
    PasswordRepositoryAdapter, SessionRepositoryAdapter, UserRepositoryAdapter,
};
pub use follow::FollowRepository;
pub use like::LikeRepository;
pub use mitt::MittRepository;
pub use password::PasswordRepository;
pub use session::SessionRepository;
pub use user::UserRepository;

use async_trait::async_trait;

use crate::StorageError;

/// Provider trait for user repository access.
pub trait UserRepositoryProvider: Send + Sync + 'static {
    type UserRepo: UserRepository;

    fn user(&self) -> &Self::UserRepo;
}

/// Provider trait for password repository access.
pub trait PasswordRepositoryProvider: Send + Sync + 'static {
    type PasswordRepo: PasswordRepository;

    fn password(&self) -> &Self::PasswordRepo;
}

/// Provider trait for session store access.
pub trait SessionRepositoryProvider: Send + Sync + 'static {
    type SessionRepo: SessionRepository;

    fn session(&self) -> &Self::SessionRepo;
}

/// Provider trait for follow graph access.
pub trait FollowRepositoryProvider: Send + Sync + 'static {
    type FollowRepo: FollowRepository;

    fn graph(&self) -> &Self::FollowRepo;
}

/// Provider trait for mitt repository access.
pub trait MittRepositoryProvider: Send + Sync + 'static {
    type MittRepo: MittRepository;

    fn mitt(&self) -> &Self::MittRepo;
}

/// Provider trait for like repository access.
pub trait LikeRepositoryProvider: Send + Sync + 'static {
    type LikeRepo: LikeRepository;

    fn likes(&self) -> &Self::LikeRepo;
}

/// Provider trait that storage implementations implement to provide all
/// repositories.
///
/// # Implementing a Custom Storage Backend
///
/// 1. Implement each individual `*Repository` trait for your backend
/// 2. Implement each individual `*RepositoryProvider` trait
/// 3. Implement this trait with `migrate()` and `health_check()`
///
/// ```rust,ignore
/// use mitter_core::repositories::*;
///
/// struct MyStorage { /* ... */ }
///
/// impl UserRepositoryProvider for MyStorage {
///     type UserRepo = MyUserRepository;
///     fn user(&self) -> &Self::UserRepo { &self.user_repo }
/// }
///
/// // ... implement other provider traits ...
///
/// #[async_trait]
/// impl RepositoryProvider for MyStorage {
///     async fn migrate(&self) -> Result<(), StorageError> { /* ... */ }
///     async fn health_check(&self) -> Result<(), StorageError> { /* ... */ }
/// }
/// ```
#[async_trait]
pub trait RepositoryProvider:
    UserRepositoryProvider
    + PasswordRepositoryProvider
    + SessionRepositoryProvider
    + FollowRepositoryProvider
    + MittRepositoryProvider
    + LikeRepositoryProvider
{
    /// Run migrations for all repositories
    async fn migrate(&self) -> Result<(), StorageError>;

    /// Check that the backing store is reachable
    async fn health_check(&self) -> Result<(), StorageError>;
}

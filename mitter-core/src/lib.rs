//! Core functionality for mitter
//!
//! This crate holds the domain service layer of the mitter social network:
//! account management, opaque session tokens, the follow graph and short
//! text posts ("mitts") with likes and a global feed.
//!
//! Services never talk to a database directly. They are constructed with
//! repository implementations (see [`repositories`]) and a metrics sink, and
//! they return either a typed result or a structured [`Error`] whose
//! [`ErrorKind`] the boundary layer maps to a transport status.
//!
//! See [`services::AuthService`], [`services::UserService`] and
//! [`services::MittService`] for the operations.
pub mod crypto;
pub mod error;
pub mod id;
pub mod metrics;
pub mod mitt;
pub mod pagination;
pub mod repositories;
pub mod services;
pub mod session;
pub mod user;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, ErrorKind, StorageError};
pub use metrics::{MetricsDispatcher, MittMetrics, NoopMetrics, PrometheusMetrics, UserMetrics};
pub use mitt::{Mitt, MittId, NewMitt};
pub use pagination::Page;
pub use repositories::RepositoryProvider;
pub use session::{Session, SessionToken};
pub use user::{NewUser, User, UserId, UserUpdate};

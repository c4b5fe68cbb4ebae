//! Service layer for business logic
//!
//! Each service is generic over the repository contracts it needs and holds
//! no mutable state of its own, so a single instance can be shared across
//! concurrent requests.

pub mod auth;
pub mod mitt;
pub mod user;

pub use auth::AuthService;
pub use mitt::MittService;
pub use user::UserService;

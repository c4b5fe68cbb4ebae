use crate::{
    Error, NewUser, Session, StorageError, UserId,
    crypto::{hash_password, verify_password},
    error::StorageResultExt,
    metrics::{MetricsDispatcher, UserMetrics},
    repositories::{PasswordRepository, SessionRepository, UserRepository},
    session::{SessionToken, default_session_expiry},
    validation::{validate_login, validate_name, validate_password},
};
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const INVALID_CREDENTIALS: &str = "Invalid login or password";
const USER_EXISTS: &str = "User already exists";
const USER_DOES_NOT_EXIST: &str = "User does not exist";
const OLD_PASSWORD_MISMATCH: &str = "Old password doesn't match";
const UNAUTHORIZED: &str = "Unauthorized";

/// Service for sign-up, sign-in, password changes and session resolution
pub struct AuthService<U: UserRepository, P: PasswordRepository, S: SessionRepository> {
    users: Arc<U>,
    passwords: Arc<P>,
    sessions: Arc<S>,
    metrics: MetricsDispatcher<dyn UserMetrics>,
    session_expiry: Duration,
}

impl<U: UserRepository, P: PasswordRepository, S: SessionRepository> AuthService<U, P, S> {
    /// Create a new AuthService issuing sessions with the default 24 hour expiry
    pub fn new(
        users: Arc<U>,
        passwords: Arc<P>,
        sessions: Arc<S>,
        metrics: MetricsDispatcher<dyn UserMetrics>,
    ) -> Self {
        Self {
            users,
            passwords,
            sessions,
            metrics,
            session_expiry: default_session_expiry(),
        }
    }

    pub fn with_session_expiry(mut self, expires_in: Duration) -> Self {
        self.session_expiry = expires_in;
        self
    }

    /// Exchange credentials for a fresh session token
    ///
    /// Unknown logins, wrong passwords and malformed credentials all fail with
    /// the same unauthorized error.
    pub async fn sign_in(&self, login: &str, password: &str) -> Result<SessionToken, Error> {
        if validate_login(login).is_err() || validate_password(password).is_err() {
            warn!("Sign-in rejected: malformed credentials");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let user = match self.users.find_by_login(login).await {
            Ok(Some(user)) => user,
            Ok(None) | Err(StorageError::NotFound) => {
                warn!("Sign-in rejected: unknown login");
                return Err(Error::unauthorized(INVALID_CREDENTIALS));
            }
            Err(e) => {
                error!(error = %e, "error getting user by login");
                return Err(Error::internal());
            }
        };

        let password_hash = match self.passwords.get_password_hash(&user.id).await {
            Ok(Some(hash)) => hash,
            Ok(None) | Err(StorageError::NotFound) => {
                warn!(user_id = %user.id, "Sign-in rejected: no password set");
                return Err(Error::unauthorized(INVALID_CREDENTIALS));
            }
            Err(e) => {
                error!(error = %e, user_id = %user.id, "error getting password hash");
                return Err(Error::internal());
            }
        };

        if !verify_password(password, &password_hash)? {
            warn!(user_id = %user.id, "Sign-in rejected: wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let session = Session::issue(&user.id, self.session_expiry)?;
        self.sessions
            .create(&session)
            .await
            .or_internal("error creating session")?;

        debug!(user_id = %user.id, expires_at = %session.expires_at, "Session issued");
        Ok(session.token)
    }

    /// Register a new account and return its id
    pub async fn sign_up(&self, login: &str, name: &str, password: &str) -> Result<UserId, Error> {
        validate_login(login)?;
        validate_name(name)?;
        validate_password(password)?;

        let new_user = NewUser::new(login, name, hash_password(password));
        let user = match self.users.create(new_user).await {
            Ok(user) => user,
            Err(e) if e.is_unique_violation() => return Err(Error::conflict(USER_EXISTS)),
            Err(e) => {
                error!(error = %e, "error creating user");
                return Err(Error::internal());
            }
        };

        self.metrics.dispatch(|m| m.add_user());

        info!(user_id = %user.id, "User signed up");
        Ok(user.id)
    }

    /// Replace a user's password after checking the current one
    pub async fn change_password(
        &self,
        user_id: &UserId,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), Error> {
        validate_password(new_password)?;

        let current_hash = match self.passwords.get_password_hash(user_id).await {
            Ok(Some(hash)) => hash,
            Ok(None) | Err(StorageError::NotFound) => {
                return Err(Error::unauthorized(USER_DOES_NOT_EXIST));
            }
            Err(e) => {
                error!(error = %e, user_id = %user_id, "error getting password hash");
                return Err(Error::internal());
            }
        };

        if !verify_password(old_password, &current_hash)? {
            return Err(Error::bad_request(OLD_PASSWORD_MISMATCH));
        }

        self.passwords
            .set_password_hash(user_id, &hash_password(new_password))
            .await
            .or_internal("error updating password")?;

        debug!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Resolve a session token to the user it authenticates
    ///
    /// Absent and expired tokens are indistinguishable to the caller. An
    /// expired session is removed from the store on the way out.
    pub async fn authenticate(&self, token: &SessionToken) -> Result<UserId, Error> {
        if token.is_empty() {
            return Err(Error::unauthorized(UNAUTHORIZED));
        }

        let session = self
            .sessions
            .find_by_token(token)
            .await
            .or_internal("error getting session")?
            .ok_or_else(|| Error::unauthorized(UNAUTHORIZED))?;

        if session.is_expired() {
            if let Err(e) = self.sessions.delete(token).await {
                warn!(error = %e, "error deleting expired session");
            }
            return Err(Error::unauthorized(UNAUTHORIZED));
        }

        Ok(session.user_id)
    }

    /// Remove every expired session from the store
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, Error> {
        let removed = self
            .sessions
            .cleanup_expired()
            .await
            .or_internal("error cleaning up expired sessions")?;

        if removed > 0 {
            info!(removed, "Expired sessions removed");
        }
        Ok(removed)
    }
}

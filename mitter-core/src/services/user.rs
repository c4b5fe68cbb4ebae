use crate::{
    Error, Page, StorageError, User, UserId, UserUpdate,
    error::{OptionalResultExt, StorageResultExt},
    metrics::{MetricsDispatcher, UserMetrics},
    repositories::{FollowRepository, UserRepository},
    validation::validate_name,
};
use std::sync::Arc;
use tracing::{debug, error};

const USER_NOT_FOUND: &str = "User not found";
const ALREADY_FOLLOWED: &str = "Already followed";
const SELF_FOLLOW: &str = "can't follow yourself";

/// Service for profiles and the follow graph
pub struct UserService<U: UserRepository, F: FollowRepository> {
    users: Arc<U>,
    follows: Arc<F>,
    metrics: MetricsDispatcher<dyn UserMetrics>,
}

impl<U: UserRepository, F: FollowRepository> UserService<U, F> {
    pub fn new(users: Arc<U>, follows: Arc<F>, metrics: MetricsDispatcher<dyn UserMetrics>) -> Self {
        Self {
            users,
            follows,
            metrics,
        }
    }

    pub async fn get_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .or_not_found(USER_NOT_FOUND, "error getting user")
    }

    /// Delete a user
    ///
    /// The account's mitts are left in place; whatever else goes with the
    /// account is up to the store.
    pub async fn delete_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.users
            .delete(user_id)
            .await
            .or_internal("error deleting user")?;

        self.metrics.dispatch(|m| m.delete_user());
        Ok(())
    }

    /// Apply the fields present in `update`
    pub async fn update_user(&self, user_id: &UserId, update: &UserUpdate) -> Result<(), Error> {
        if let Some(name) = &update.name {
            validate_name(name)?;
        }
        if update.is_empty() {
            return Ok(());
        }

        match self.users.update(user_id, update).await {
            Ok(()) => Ok(()),
            Err(StorageError::NotFound) => Err(Error::not_found(USER_NOT_FOUND)),
            Err(e) => {
                error!(error = %e, user_id = %user_id, "error updating user");
                Err(Error::internal())
            }
        }
    }

    pub async fn follow_user(&self, follower: &UserId, followee: &UserId) -> Result<(), Error> {
        if follower == followee {
            return Err(Error::bad_request(SELF_FOLLOW));
        }

        self.get_user(followee).await?;

        match self.follows.follow(follower, followee).await {
            Ok(()) => {
                debug!(follower = %follower, followee = %followee, "User followed");
                Ok(())
            }
            Err(e) if e.is_unique_violation() => Err(Error::conflict(ALREADY_FOLLOWED)),
            Err(e) => {
                error!(error = %e, "error following user");
                Err(Error::internal())
            }
        }
    }

    /// Remove a follow edge. Removing an edge that does not exist succeeds.
    pub async fn unfollow_user(&self, follower: &UserId, followee: &UserId) -> Result<(), Error> {
        self.follows
            .unfollow(follower, followee)
            .await
            .or_internal("error unfollowing user")
    }

    /// Profiles of the users `follower` follows
    pub async fn get_user_follows(&self, follower: &UserId, page: Page) -> Result<Vec<User>, Error> {
        let ids = self
            .follows
            .follows(follower, page)
            .await
            .or_internal("error getting follows")?;
        self.resolve_users(&ids).await
    }

    /// Profiles of the users following `followee`
    pub async fn get_user_followers(
        &self,
        followee: &UserId,
        page: Page,
    ) -> Result<Vec<User>, Error> {
        let ids = self
            .follows
            .followers(followee, page)
            .await
            .or_internal("error getting followers")?;
        self.resolve_users(&ids).await
    }

    /// Profiles of the users that follow `user_id` and are followed back
    pub async fn get_user_friends(&self, user_id: &UserId) -> Result<Vec<User>, Error> {
        let ids = self
            .follows
            .friends(user_id)
            .await
            .or_internal("error getting friends")?;
        self.resolve_users(&ids).await
    }

    // All or nothing: one unresolvable id fails the whole list.
    async fn resolve_users(&self, ids: &[UserId]) -> Result<Vec<User>, Error> {
        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            match self.users.find_by_id(id).await {
                Ok(Some(user)) => users.push(user),
                Ok(None) => {
                    error!(user_id = %id, "error resolving user: no such user");
                    return Err(Error::internal());
                }
                Err(e) => {
                    error!(error = %e, user_id = %id, "error resolving user");
                    return Err(Error::internal());
                }
            }
        }
        Ok(users)
    }
}

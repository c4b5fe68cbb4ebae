use crate::{
    Mitt, MittId, NewMitt, NewUser, Page, Session, StorageError, User, UserId, UserUpdate,
    repositories::{
        FollowRepository, LikeRepository, MittRepository, PasswordRepository,
        RepositoryProvider, SessionRepository, UserRepository,
    },
    session::SessionToken,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Adapter that wraps a RepositoryProvider and implements [`UserRepository`]
pub struct UserRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> UserRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> UserRepository for UserRepositoryAdapter<R> {
    async fn create(&self, user: NewUser) -> Result<User, StorageError> {
        self.provider.user().create(user).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StorageError> {
        self.provider.user().find_by_id(id).await
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StorageError> {
        self.provider.user().find_by_login(login).await
    }

    async fn update(&self, id: &UserId, update: &UserUpdate) -> Result<(), StorageError> {
        self.provider.user().update(id, update).await
    }

    async fn delete(&self, id: &UserId) -> Result<(), StorageError> {
        self.provider.user().delete(id).await
    }
}

pub struct PasswordRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> PasswordRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> PasswordRepository for PasswordRepositoryAdapter<R> {
    async fn set_password_hash(&self, user_id: &UserId, hash: &str) -> Result<(), StorageError> {
        self.provider
            .password()
            .set_password_hash(user_id, hash)
            .await
    }

    async fn get_password_hash(&self, user_id: &UserId) -> Result<Option<String>, StorageError> {
        self.provider.password().get_password_hash(user_id).await
    }
}

pub struct SessionRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> SessionRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> SessionRepository for SessionRepositoryAdapter<R> {
    async fn create(&self, session: &Session) -> Result<(), StorageError> {
        self.provider.session().create(session).await
    }

    async fn find_by_token(&self, token: &SessionToken) -> Result<Option<Session>, StorageError> {
        self.provider.session().find_by_token(token).await
    }

    async fn delete(&self, token: &SessionToken) -> Result<(), StorageError> {
        self.provider.session().delete(token).await
    }

    async fn cleanup_expired(&self) -> Result<u64, StorageError> {
        self.provider.session().cleanup_expired().await
    }
}

pub struct FollowRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> FollowRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> FollowRepository for FollowRepositoryAdapter<R> {
    async fn follow(&self, follower: &UserId, followee: &UserId) -> Result<(), StorageError> {
        self.provider.graph().follow(follower, followee).await
    }

    async fn unfollow(&self, follower: &UserId, followee: &UserId) -> Result<(), StorageError> {
        self.provider.graph().unfollow(follower, followee).await
    }

    async fn follows(&self, follower: &UserId, page: Page) -> Result<Vec<UserId>, StorageError> {
        self.provider.graph().follows(follower, page).await
    }

    async fn followers(
        &self,
        followee: &UserId,
        page: Page,
    ) -> Result<Vec<UserId>, StorageError> {
        self.provider.graph().followers(followee, page).await
    }

    async fn friends(&self, user: &UserId) -> Result<Vec<UserId>, StorageError> {
        self.provider.graph().friends(user).await
    }
}

pub struct MittRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> MittRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> MittRepository for MittRepositoryAdapter<R> {
    async fn create(&self, mitt: NewMitt) -> Result<Mitt, StorageError> {
        self.provider.mitt().create(mitt).await
    }

    async fn find_by_id(&self, id: &MittId) -> Result<Option<Mitt>, StorageError> {
        self.provider.mitt().find_by_id(id).await
    }

    async fn find_by_author(
        &self,
        author: &UserId,
        page: Page,
    ) -> Result<Vec<Mitt>, StorageError> {
        self.provider.mitt().find_by_author(author, page).await
    }

    async fn update(&self, id: &MittId, content: &str) -> Result<Option<Mitt>, StorageError> {
        self.provider.mitt().update(id, content).await
    }

    async fn delete(&self, id: &MittId) -> Result<(), StorageError> {
        self.provider.mitt().delete(id).await
    }

    async fn feed(&self, page: Page) -> Result<Vec<Mitt>, StorageError> {
        self.provider.mitt().feed(page).await
    }
}

pub struct LikeRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> LikeRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> LikeRepository for LikeRepositoryAdapter<R> {
    async fn is_liked(&self, user: &UserId, mitt: &MittId) -> Result<bool, StorageError> {
        self.provider.likes().is_liked(user, mitt).await
    }

    async fn like(&self, user: &UserId, mitt: &MittId) -> Result<bool, StorageError> {
        self.provider.likes().like(user, mitt).await
    }

    async fn unlike(&self, user: &UserId, mitt: &MittId) -> Result<bool, StorageError> {
        self.provider.likes().unlike(user, mitt).await
    }

    async fn count(&self, mitt: &MittId) -> Result<i64, StorageError> {
        self.provider.likes().count(mitt).await
    }
}

//! In-memory fakes shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    MittMetrics, Mitt, MittId, NewMitt, NewUser, Page, Session, StorageError, User, UserId,
    UserMetrics, UserUpdate,
    repositories::{
        FollowRepository, FollowRepositoryProvider, LikeRepository, LikeRepositoryProvider,
        MittRepository, MittRepositoryProvider, PasswordRepository, PasswordRepositoryProvider,
        RepositoryProvider, SessionRepository, SessionRepositoryProvider, UserRepository,
        UserRepositoryProvider,
    },
    session::SessionToken,
};

fn injected() -> StorageError {
    StorageError::Database("injected failure".to_string())
}

fn paginate<T>(items: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    items
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

/// One in-memory store implementing every repository contract.
///
/// The `fail_*` switches make the matching calls return a database error, and
/// `like_counts_not_found` makes [`LikeRepository::count`] report a missing row.
#[derive(Default)]
pub(crate) struct MemoryStore {
    users: Mutex<HashMap<UserId, StoredUser>>,
    sessions: Mutex<HashMap<String, Session>>,
    // (follower, followee) in insertion order
    follows: Mutex<Vec<(UserId, UserId)>>,
    mitts: Mutex<Vec<Mitt>>,
    likes: Mutex<HashSet<(UserId, MittId)>>,

    pub fail_user_reads: AtomicBool,
    pub fail_password_writes: AtomicBool,
    pub fail_session_writes: AtomicBool,
    pub fail_follow_writes: AtomicBool,
    pub fail_mitt_reads: AtomicBool,
    pub fail_like_writes: AtomicBool,
    pub fail_like_counts: AtomicBool,
    pub like_counts_not_found: AtomicBool,
}

impl MemoryStore {
    pub fn set(flag: &AtomicBool, value: bool) {
        flag.store(value, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool) -> Result<(), StorageError> {
        if flag.load(Ordering::SeqCst) {
            Err(injected())
        } else {
            Ok(())
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn stored_password_hash(&self, id: &UserId) -> Option<String> {
        self.users
            .lock()
            .await
            .get(id)
            .map(|u| u.password_hash.clone())
    }

    /// Store a session as-is, bypassing the auth service.
    pub async fn insert_session(&self, session: Session) {
        self.sessions
            .lock()
            .await
            .insert(session.token.token_hash(), session);
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, StorageError> {
        let mut users = self.users.lock().await;
        if users.values().any(|u| u.user.login == user.login) {
            return Err(StorageError::UniqueViolation("users.login".to_string()));
        }

        let now = Utc::now();
        let created = User {
            id: user.id,
            login: user.login,
            name: user.name,
            created_at: now,
            updated_at: now,
        };
        users.insert(
            created.id.clone(),
            StoredUser {
                user: created.clone(),
                password_hash: user.password_hash,
            },
        );
        Ok(created)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StorageError> {
        Self::check(&self.fail_user_reads)?;
        Ok(self.users.lock().await.get(id).map(|u| u.user.clone()))
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StorageError> {
        Self::check(&self.fail_user_reads)?;
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|u| u.user.login == login)
            .map(|u| u.user.clone()))
    }

    async fn update(&self, id: &UserId, update: &UserUpdate) -> Result<(), StorageError> {
        let mut users = self.users.lock().await;
        let stored = users.get_mut(id).ok_or(StorageError::NotFound)?;
        if let Some(name) = &update.name {
            stored.user.name = name.clone();
        }
        stored.user.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<(), StorageError> {
        self.users.lock().await.remove(id);
        Ok(())
    }
}

#[async_trait]
impl PasswordRepository for MemoryStore {
    async fn set_password_hash(&self, user_id: &UserId, hash: &str) -> Result<(), StorageError> {
        Self::check(&self.fail_password_writes)?;
        let mut users = self.users.lock().await;
        let stored = users.get_mut(user_id).ok_or(StorageError::NotFound)?;
        stored.password_hash = hash.to_string();
        Ok(())
    }

    async fn get_password_hash(&self, user_id: &UserId) -> Result<Option<String>, StorageError> {
        Self::check(&self.fail_user_reads)?;
        Ok(self.stored_password_hash(user_id).await)
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn create(&self, session: &Session) -> Result<(), StorageError> {
        Self::check(&self.fail_session_writes)?;
        self.insert_session(session.clone()).await;
        Ok(())
    }

    async fn find_by_token(&self, token: &SessionToken) -> Result<Option<Session>, StorageError> {
        Ok(self
            .sessions
            .lock()
            .await
            .get(&token.token_hash())
            .cloned())
    }

    async fn delete(&self, token: &SessionToken) -> Result<(), StorageError> {
        self.sessions.lock().await.remove(&token.token_hash());
        Ok(())
    }

    async fn cleanup_expired(&self) -> Result<u64, StorageError> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        Ok((before - sessions.len()) as u64)
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn follow(&self, follower: &UserId, followee: &UserId) -> Result<(), StorageError> {
        Self::check(&self.fail_follow_writes)?;
        let mut follows = self.follows.lock().await;
        if follows.iter().any(|(a, b)| a == follower && b == followee) {
            return Err(StorageError::UniqueViolation("follows".to_string()));
        }
        follows.push((follower.clone(), followee.clone()));
        Ok(())
    }

    async fn unfollow(&self, follower: &UserId, followee: &UserId) -> Result<(), StorageError> {
        self.follows
            .lock()
            .await
            .retain(|(a, b)| !(a == follower && b == followee));
        Ok(())
    }

    async fn follows(&self, follower: &UserId, page: Page) -> Result<Vec<UserId>, StorageError> {
        let follows = self.follows.lock().await;
        let newest_first = follows
            .iter()
            .rev()
            .filter(|(a, _)| a == follower)
            .map(|(_, b)| b.clone());
        Ok(paginate(newest_first, page))
    }

    async fn followers(
        &self,
        followee: &UserId,
        page: Page,
    ) -> Result<Vec<UserId>, StorageError> {
        let follows = self.follows.lock().await;
        let newest_first = follows
            .iter()
            .rev()
            .filter(|(_, b)| b == followee)
            .map(|(a, _)| a.clone());
        Ok(paginate(newest_first, page))
    }

    async fn friends(&self, user: &UserId) -> Result<Vec<UserId>, StorageError> {
        let follows = self.follows.lock().await;
        Ok(follows
            .iter()
            .filter(|(_, b)| b == user)
            .filter(|(a, _)| follows.iter().any(|(x, y)| x == user && y == a))
            .map(|(a, _)| a.clone())
            .collect())
    }
}

impl MemoryStore {
    async fn sorted_mitts(&self) -> Vec<Mitt> {
        let mut mitts = self.mitts.lock().await.clone();
        mitts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        mitts
    }
}

#[async_trait]
impl MittRepository for MemoryStore {
    async fn create(&self, mitt: NewMitt) -> Result<Mitt, StorageError> {
        let now = Utc::now();
        let created = Mitt {
            id: mitt.id,
            author: mitt.author,
            author_name: String::new(),
            content: mitt.content,
            created_at: now,
            updated_at: now,
            likes: 0,
        };
        self.mitts.lock().await.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: &MittId) -> Result<Option<Mitt>, StorageError> {
        Self::check(&self.fail_mitt_reads)?;
        Ok(self.mitts.lock().await.iter().find(|m| &m.id == id).cloned())
    }

    async fn find_by_author(
        &self,
        author: &UserId,
        page: Page,
    ) -> Result<Vec<Mitt>, StorageError> {
        Self::check(&self.fail_mitt_reads)?;
        let mitts = self.sorted_mitts().await;
        Ok(paginate(
            mitts.into_iter().filter(|m| &m.author == author),
            page,
        ))
    }

    async fn update(&self, id: &MittId, content: &str) -> Result<Option<Mitt>, StorageError> {
        let mut mitts = self.mitts.lock().await;
        Ok(mitts.iter_mut().find(|m| &m.id == id).map(|m| {
            m.content = content.to_string();
            m.updated_at = Utc::now();
            m.clone()
        }))
    }

    async fn delete(&self, id: &MittId) -> Result<(), StorageError> {
        self.mitts.lock().await.retain(|m| &m.id != id);
        self.likes.lock().await.retain(|(_, m)| m != id);
        Ok(())
    }

    async fn feed(&self, page: Page) -> Result<Vec<Mitt>, StorageError> {
        Self::check(&self.fail_mitt_reads)?;
        Ok(paginate(self.sorted_mitts().await.into_iter(), page))
    }
}

#[async_trait]
impl LikeRepository for MemoryStore {
    async fn is_liked(&self, user: &UserId, mitt: &MittId) -> Result<bool, StorageError> {
        Ok(self
            .likes
            .lock()
            .await
            .contains(&(user.clone(), mitt.clone())))
    }

    async fn like(&self, user: &UserId, mitt: &MittId) -> Result<bool, StorageError> {
        Self::check(&self.fail_like_writes)?;
        Ok(self.likes.lock().await.insert((user.clone(), mitt.clone())))
    }

    async fn unlike(&self, user: &UserId, mitt: &MittId) -> Result<bool, StorageError> {
        Self::check(&self.fail_like_writes)?;
        Ok(self
            .likes
            .lock()
            .await
            .remove(&(user.clone(), mitt.clone())))
    }

    async fn count(&self, mitt: &MittId) -> Result<i64, StorageError> {
        Self::check(&self.fail_like_counts)?;
        if self.like_counts_not_found.load(Ordering::SeqCst) {
            return Err(StorageError::NotFound);
        }
        let likes = self.likes.lock().await;
        Ok(likes.iter().filter(|(_, m)| m == mitt).count() as i64)
    }
}

impl UserRepositoryProvider for MemoryStore {
    type UserRepo = Self;

    fn user(&self) -> &Self::UserRepo {
        self
    }
}

impl PasswordRepositoryProvider for MemoryStore {
    type PasswordRepo = Self;

    fn password(&self) -> &Self::PasswordRepo {
        self
    }
}

impl SessionRepositoryProvider for MemoryStore {
    type SessionRepo = Self;

    fn session(&self) -> &Self::SessionRepo {
        self
    }
}

impl FollowRepositoryProvider for MemoryStore {
    type FollowRepo = Self;

    fn graph(&self) -> &Self::FollowRepo {
        self
    }
}

impl MittRepositoryProvider for MemoryStore {
    type MittRepo = Self;

    fn mitt(&self) -> &Self::MittRepo {
        self
    }
}

impl LikeRepositoryProvider for MemoryStore {
    type LikeRepo = Self;

    fn likes(&self) -> &Self::LikeRepo {
        self
    }
}

#[async_trait]
impl RepositoryProvider for MemoryStore {
    async fn migrate(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Metrics sink that counts what it receives.
#[derive(Debug, Default)]
pub(crate) struct RecordingMetrics {
    users: AtomicI64,
    mitts: AtomicI64,
    likes: AtomicI64,
    feed_viewed: AtomicU64,
}

impl RecordingMetrics {
    pub fn users(&self) -> i64 {
        self.users.load(Ordering::SeqCst)
    }

    pub fn mitts(&self) -> i64 {
        self.mitts.load(Ordering::SeqCst)
    }

    pub fn likes(&self) -> i64 {
        self.likes.load(Ordering::SeqCst)
    }

    pub fn feed_viewed(&self) -> u64 {
        self.feed_viewed.load(Ordering::SeqCst)
    }

    /// Poll until `condition` holds. Updates arrive on detached tasks, so
    /// they are never visible synchronously.
    pub async fn wait_until(&self, condition: impl Fn(&Self) -> bool) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !condition(self) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("metrics update was not observed in time");
    }
}

impl UserMetrics for RecordingMetrics {
    fn add_user(&self) {
        self.users.fetch_add(1, Ordering::SeqCst);
    }

    fn delete_user(&self) {
        self.users.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MittMetrics for RecordingMetrics {
    fn add_mitt(&self) {
        self.mitts.fetch_add(1, Ordering::SeqCst);
    }

    fn delete_mitt(&self) {
        self.mitts.fetch_sub(1, Ordering::SeqCst);
    }

    fn add_like(&self) {
        self.likes.fetch_add(1, Ordering::SeqCst);
    }

    fn delete_like(&self) {
        self.likes.fetch_sub(1, Ordering::SeqCst);
    }

    fn view_in_feed(&self, count: usize) {
        self.feed_viewed.fetch_add(count as u64, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MittRepositoryAdapter, UserRepositoryAdapter};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_adapters_delegate_to_provider() {
        let store = Arc::new(MemoryStore::default());
        let users = UserRepositoryAdapter::new(store.clone());
        let mitts = MittRepositoryAdapter::new(store.clone());

        let user = users
            .create(NewUser::new("alice", "Alice", "hash".to_string()))
            .await
            .unwrap();
        mitts.create(NewMitt::new(&user.id, "hi")).await.unwrap();

        assert_eq!(
            store.find_by_login("alice").await.unwrap().map(|u| u.id),
            Some(user.id.clone())
        );
        assert_eq!(store.feed(Page::default()).await.unwrap().len(), 1);
    }
}

use crate::{
    Error, Mitt, MittId, NewMitt, Page, StorageError, UserId,
    error::{OptionalResultExt, StorageResultExt},
    metrics::{MetricsDispatcher, MittMetrics},
    repositories::{LikeRepository, MittRepository, UserRepository},
    validation::validate_content,
};
use std::sync::Arc;
use tracing::{debug, error};

const MITT_NOT_FOUND: &str = "Mitt not found";
const NOT_AUTHOR: &str = "You are not the author of this mitt";

/// Service for mitts, likes and the feed
///
/// Every mitt handed out is enriched with its like count and its author's
/// display name. Both lookups are soft: a missing row leaves the field at
/// its zero value, so mitts from deleted accounts still render. Any other
/// lookup failure fails the whole call.
pub struct MittService<M: MittRepository, L: LikeRepository, U: UserRepository> {
    mitts: Arc<M>,
    likes: Arc<L>,
    users: Arc<U>,
    metrics: MetricsDispatcher<dyn MittMetrics>,
}

impl<M: MittRepository, L: LikeRepository, U: UserRepository> MittService<M, L, U> {
    pub fn new(
        mitts: Arc<M>,
        likes: Arc<L>,
        users: Arc<U>,
        metrics: MetricsDispatcher<dyn MittMetrics>,
    ) -> Self {
        Self {
            mitts,
            likes,
            users,
            metrics,
        }
    }

    pub async fn create_mitt(&self, author: &UserId, content: &str) -> Result<Mitt, Error> {
        validate_content(content)?;

        let mut mitt = self
            .mitts
            .create(NewMitt::new(author, content))
            .await
            .or_internal("error creating mitt")?;
        self.set_author_name(&mut mitt).await?;

        self.metrics.dispatch(|m| m.add_mitt());

        debug!(mitt_id = %mitt.id, author = %author, "Mitt created");
        Ok(mitt)
    }

    pub async fn get_mitt(&self, mitt_id: &MittId) -> Result<Mitt, Error> {
        let mut mitt = self
            .mitts
            .find_by_id(mitt_id)
            .await
            .or_not_found(MITT_NOT_FOUND, "error getting mitt")?;
        self.enrich(&mut mitt).await?;
        Ok(mitt)
    }

    /// One author's mitts, newest first
    pub async fn get_all_user_mitts(&self, author: &UserId, page: Page) -> Result<Vec<Mitt>, Error> {
        let mut mitts = self
            .mitts
            .find_by_author(author, page)
            .await
            .or_internal("error getting mitts")?;
        for mitt in &mut mitts {
            self.enrich(mitt).await?;
        }
        Ok(mitts)
    }

    /// Replace a mitt's content. Only its author may do so.
    pub async fn update_mitt(
        &self,
        acting_user: &UserId,
        mitt_id: &MittId,
        content: &str,
    ) -> Result<Mitt, Error> {
        validate_content(content)?;

        let existing = self.get_mitt(mitt_id).await?;
        if !existing.is_authored_by(acting_user) {
            return Err(Error::forbidden(NOT_AUTHOR));
        }

        let mut mitt = self
            .mitts
            .update(mitt_id, content)
            .await
            .or_not_found(MITT_NOT_FOUND, "error updating mitt")?;
        self.enrich(&mut mitt).await?;
        Ok(mitt)
    }

    /// Delete a mitt. Only its author may do so.
    pub async fn delete_mitt(&self, acting_user: &UserId, mitt_id: &MittId) -> Result<(), Error> {
        let existing = self.get_mitt(mitt_id).await?;
        if !existing.is_authored_by(acting_user) {
            return Err(Error::forbidden(NOT_AUTHOR));
        }

        self.mitts
            .delete(mitt_id)
            .await
            .or_internal("error deleting mitt")?;

        self.metrics.dispatch(|m| m.delete_mitt());
        Ok(())
    }

    /// Toggle `user`'s like on a mitt and return whether it is now liked
    ///
    /// The write is conditional on the state read just before it. When a
    /// concurrent toggle got there first the write changes nothing, no metric
    /// is reported, and the state the write aimed for is returned.
    pub async fn switch_like(&self, user: &UserId, mitt_id: &MittId) -> Result<bool, Error> {
        self.mitts
            .find_by_id(mitt_id)
            .await
            .or_not_found(MITT_NOT_FOUND, "error getting mitt")?;

        let liked = self
            .likes
            .is_liked(user, mitt_id)
            .await
            .or_internal("error checking like")?;

        if liked {
            let removed = self
                .likes
                .unlike(user, mitt_id)
                .await
                .or_internal("error unliking mitt")?;
            if removed {
                self.metrics.dispatch(|m| m.delete_like());
            }
            debug!(mitt_id = %mitt_id, user_id = %user, removed, "Mitt unliked");
            Ok(false)
        } else {
            let inserted = self
                .likes
                .like(user, mitt_id)
                .await
                .or_internal("error liking mitt")?;
            if inserted {
                self.metrics.dispatch(|m| m.add_like());
            }
            debug!(mitt_id = %mitt_id, user_id = %user, inserted, "Mitt liked");
            Ok(true)
        }
    }

    /// Mitts across all authors, newest first
    pub async fn feed(&self, page: Page) -> Result<Vec<Mitt>, Error> {
        let mut mitts = self
            .mitts
            .feed(page)
            .await
            .or_internal("error getting feed")?;
        for mitt in &mut mitts {
            self.enrich(mitt).await?;
        }

        let count = mitts.len();
        self.metrics.dispatch(move |m| m.view_in_feed(count));
        Ok(mitts)
    }

    async fn enrich(&self, mitt: &mut Mitt) -> Result<(), Error> {
        self.set_likes_count(mitt).await?;
        self.set_author_name(mitt).await
    }

    async fn set_likes_count(&self, mitt: &mut Mitt) -> Result<(), Error> {
        match self.likes.count(&mitt.id).await {
            Ok(count) => mitt.likes = count,
            Err(StorageError::NotFound) => {}
            Err(e) => {
                error!(error = %e, mitt_id = %mitt.id, "error getting likes count");
                return Err(Error::internal());
            }
        }
        Ok(())
    }

    async fn set_author_name(&self, mitt: &mut Mitt) -> Result<(), Error> {
        match self.users.find_by_id(&mitt.author).await {
            Ok(Some(author)) => mitt.author_name = author.name,
            Ok(None) | Err(StorageError::NotFound) => {}
            Err(e) => {
                error!(error = %e, mitt_id = %mitt.id, "error getting author");
                return Err(Error::internal());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ErrorKind, NewUser, User,
        testing::{MemoryStore, RecordingMetrics},
    };

    type TestMittService = MittService<MemoryStore, MemoryStore, MemoryStore>;

    fn service(store: &Arc<MemoryStore>) -> TestMittService {
        MittService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            MetricsDispatcher::noop_mitts(),
        )
    }

    fn recorded_service(
        store: &Arc<MemoryStore>,
    ) -> (TestMittService, Arc<RecordingMetrics>) {
        let metrics = Arc::new(RecordingMetrics::default());
        let service = MittService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            MetricsDispatcher::new(metrics.clone()),
        );
        (service, metrics)
    }

    async fn create_user(store: &MemoryStore, login: &str, name: &str) -> User {
        UserRepository::create(store, NewUser::new(login, name, "hash".to_string()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_mitt_is_enriched() {
        let store = Arc::new(MemoryStore::default());
        let mitts = service(&store);
        let alice = create_user(&store, "alice", "Alice").await;

        let mitt = mitts.create_mitt(&alice.id, "hi").await.unwrap();

        assert_eq!(mitt.content, "hi");
        assert_eq!(mitt.author, alice.id);
        assert_eq!(mitt.author_name, "Alice");
        assert_eq!(mitt.likes, 0);
        assert_eq!(mitts.get_mitt(&mitt.id).await.unwrap(), mitt);
    }

    #[tokio::test]
    async fn test_create_mitt_rejects_blank_content() {
        let store = Arc::new(MemoryStore::default());
        let mitts = service(&store);
        let alice = create_user(&store, "alice", "Alice").await;

        let err = mitts.create_mitt(&alice.id, "   ").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert!(mitts.feed(Page::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_mitt_reports_metric() {
        let store = Arc::new(MemoryStore::default());
        let (mitts, metrics) = recorded_service(&store);
        let alice = create_user(&store, "alice", "Alice").await;

        let mitt = mitts.create_mitt(&alice.id, "hi").await.unwrap();
        metrics.wait_until(|m| m.mitts() == 1).await;

        mitts.delete_mitt(&alice.id, &mitt.id).await.unwrap();
        metrics.wait_until(|m| m.mitts() == 0).await;
    }

    #[tokio::test]
    async fn test_get_missing_mitt_is_not_found() {
        let store = Arc::new(MemoryStore::default());
        let mitts = service(&store);

        let err = mitts.get_mitt(&MittId::new_random()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), "Mitt not found");
    }

    #[tokio::test]
    async fn test_switch_like_toggles() {
        let store = Arc::new(MemoryStore::default());
        let mitts = service(&store);
        let alice = create_user(&store, "alice", "Alice").await;
        let bob = create_user(&store, "bob", "Bob").await;
        let mitt = mitts.create_mitt(&alice.id, "hi").await.unwrap();

        assert!(mitts.switch_like(&bob.id, &mitt.id).await.unwrap());
        assert_eq!(mitts.get_mitt(&mitt.id).await.unwrap().likes, 1);

        assert!(!mitts.switch_like(&bob.id, &mitt.id).await.unwrap());
        assert_eq!(mitts.get_mitt(&mitt.id).await.unwrap().likes, 0);
    }

    #[tokio::test]
    async fn test_switch_like_reports_metrics() {
        let store = Arc::new(MemoryStore::default());
        let (mitts, metrics) = recorded_service(&store);
        let alice = create_user(&store, "alice", "Alice").await;
        let mitt = mitts.create_mitt(&alice.id, "hi").await.unwrap();

        mitts.switch_like(&alice.id, &mitt.id).await.unwrap();
        metrics.wait_until(|m| m.likes() == 1).await;

        mitts.switch_like(&alice.id, &mitt.id).await.unwrap();
        metrics.wait_until(|m| m.likes() == 0).await;
    }

    #[tokio::test]
    async fn test_switch_like_on_missing_mitt_is_not_found() {
        let store = Arc::new(MemoryStore::default());
        let mitts = service(&store);
        let alice = create_user(&store, "alice", "Alice").await;

        let err = mitts
            .switch_like(&alice.id, &MittId::new_random())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_switch_like_write_failure_is_internal() {
        let store = Arc::new(MemoryStore::default());
        let mitts = service(&store);
        let alice = create_user(&store, "alice", "Alice").await;
        let mitt = mitts.create_mitt(&alice.id, "hi").await.unwrap();

        MemoryStore::set(&store.fail_like_writes, true);
        let err = mitts.switch_like(&alice.id, &mitt.id).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_non_author_cannot_update_or_delete() {
        let store = Arc::new(MemoryStore::default());
        let mitts = service(&store);
        let alice = create_user(&store, "alice", "Alice").await;
        let bob = create_user(&store, "bob", "Bob").await;
        let mitt = mitts.create_mitt(&alice.id, "hi").await.unwrap();

        let update = mitts
            .update_mitt(&bob.id, &mitt.id, "hijacked")
            .await
            .unwrap_err();
        let delete = mitts.delete_mitt(&bob.id, &mitt.id).await.unwrap_err();

        assert_eq!(update.kind(), ErrorKind::Forbidden);
        assert_eq!(delete.kind(), ErrorKind::Forbidden);
        assert_eq!(mitts.get_mitt(&mitt.id).await.unwrap().content, "hi");
    }

    #[tokio::test]
    async fn test_author_updates_and_deletes() {
        let store = Arc::new(MemoryStore::default());
        let mitts = service(&store);
        let alice = create_user(&store, "alice", "Alice").await;
        let bob = create_user(&store, "bob", "Bob").await;
        let mitt = mitts.create_mitt(&alice.id, "hi").await.unwrap();
        mitts.switch_like(&bob.id, &mitt.id).await.unwrap();

        let updated = mitts
            .update_mitt(&alice.id, &mitt.id, "hello")
            .await
            .unwrap();
        assert_eq!(updated.content, "hello");
        assert_eq!(updated.author_name, "Alice");
        assert_eq!(updated.likes, 1);

        mitts.delete_mitt(&alice.id, &mitt.id).await.unwrap();
        assert_eq!(
            mitts.get_mitt(&mitt.id).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_update_missing_mitt_is_not_found() {
        let store = Arc::new(MemoryStore::default());
        let mitts = service(&store);
        let alice = create_user(&store, "alice", "Alice").await;

        let err = mitts
            .update_mitt(&alice.id, &MittId::new_random(), "hello")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_user_mitts_pagination() {
        let store = Arc::new(MemoryStore::default());
        let mitts = service(&store);
        let alice = create_user(&store, "alice", "Alice").await;
        let bob = create_user(&store, "bob", "Bob").await;
        for content in ["one", "two", "three"] {
            mitts.create_mitt(&alice.id, content).await.unwrap();
        }
        mitts.create_mitt(&bob.id, "not alice's").await.unwrap();

        let all = mitts
            .get_all_user_mitts(&alice.id, Page::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|m| m.author_name == "Alice"));

        let first = mitts
            .get_all_user_mitts(&alice.id, Page::new(1, 0))
            .await
            .unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, all[0].id);

        let rest = mitts
            .get_all_user_mitts(&alice.id, Page::new(30, 1))
            .await
            .unwrap();
        assert_eq!(rest, all[1..].to_vec());
    }

    #[tokio::test]
    async fn test_feed_orders_newest_first_and_reports_views() {
        let store = Arc::new(MemoryStore::default());
        let (mitts, metrics) = recorded_service(&store);
        let alice = create_user(&store, "alice", "Alice").await;
        let bob = create_user(&store, "bob", "Bob").await;
        mitts.create_mitt(&alice.id, "first").await.unwrap();
        mitts.create_mitt(&bob.id, "second").await.unwrap();

        let feed = mitts.feed(Page::default()).await.unwrap();

        assert_eq!(feed.len(), 2);
        assert!(feed[0].created_at >= feed[1].created_at);
        assert!(feed.iter().all(|m| !m.author_name.is_empty()));
        metrics.wait_until(|m| m.feed_viewed() == 2).await;
    }

    #[tokio::test]
    async fn test_deleted_author_soft_fails_enrichment() {
        let store = Arc::new(MemoryStore::default());
        let mitts = service(&store);
        let alice = create_user(&store, "alice", "Alice").await;
        let mitt = mitts.create_mitt(&alice.id, "hi").await.unwrap();

        UserRepository::delete(store.as_ref(), &alice.id).await.unwrap();

        let orphan = mitts.get_mitt(&mitt.id).await.unwrap();
        assert_eq!(orphan.author_name, "");
        assert_eq!(orphan.content, "hi");
        assert_eq!(mitts.feed(Page::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_like_count_soft_fails() {
        let store = Arc::new(MemoryStore::default());
        let mitts = service(&store);
        let alice = create_user(&store, "alice", "Alice").await;
        let mitt = mitts.create_mitt(&alice.id, "hi").await.unwrap();

        MemoryStore::set(&store.like_counts_not_found, true);
        let fetched = mitts.get_mitt(&mitt.id).await.unwrap();

        assert_eq!(fetched.likes, 0);
        assert_eq!(fetched.author_name, "Alice");
    }

    #[tokio::test]
    async fn test_enrichment_failures_are_internal() {
        let store = Arc::new(MemoryStore::default());
        let mitts = service(&store);
        let alice = create_user(&store, "alice", "Alice").await;
        let mitt = mitts.create_mitt(&alice.id, "hi").await.unwrap();

        MemoryStore::set(&store.fail_like_counts, true);
        let err = mitts.get_mitt(&mitt.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(
            mitts.feed(Page::default()).await.unwrap_err().kind(),
            ErrorKind::Internal
        );

        MemoryStore::set(&store.fail_like_counts, false);
        MemoryStore::set(&store.fail_user_reads, true);
        let err = mitts.get_mitt(&mitt.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_mitt_read_failure_is_internal() {
        let store = Arc::new(MemoryStore::default());
        let mitts = service(&store);

        MemoryStore::set(&store.fail_mitt_reads, true);

        assert_eq!(
            mitts.get_mitt(&MittId::new_random()).await.unwrap_err().kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            mitts.feed(Page::default()).await.unwrap_err().kind(),
            ErrorKind::Internal
        );
    }
}

//! Cake catalog store: CRUD plus the top-rated and latest showcase views.

use std::sync::Arc;

use crate::backend::Backend;
use crate::cache::EntityStore;
use crate::error::StoreResult;
use crate::model::{Cake, CakeDraft, CakePatch};
use crate::stores::ViewSlot;

/// Entity store for the cake catalog.
#[derive(Debug)]
pub struct CakesStore<B: Backend> {
    cache: EntityStore<Cake, B>,
    top_rated: ViewSlot<Vec<Cake>>,
    latest: ViewSlot<Vec<Cake>>,
}

impl<B: Backend> CakesStore<B> {
    /// Creates an empty store over the given backend handle.
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            cache: EntityStore::new(backend),
            top_rated: ViewSlot::default(),
            latest: ViewSlot::default(),
        }
    }

    /// Read access to the underlying cache: selectors, request status and
    /// error slots.
    #[must_use]
    pub fn cache(&self) -> &EntityStore<Cake, B> {
        &self.cache
    }

    /// Replaces the cache with the full catalog.
    pub async fn fetch_all(&self) -> StoreResult<Vec<Cake>> {
        self.cache.fetch_all().await
    }

    /// Fetches one cake, upserting it when found.
    pub async fn fetch_by_id(&self, id: &str) -> StoreResult<Option<Cake>> {
        self.cache.fetch_by_id(id).await
    }

    /// Creates a cake after backend confirmation.
    pub async fn create(&self, draft: CakeDraft) -> StoreResult<Cake> {
        self.cache.create(draft).await
    }

    /// Applies a partial update after backend confirmation.
    pub async fn update(&self, id: &str, patch: CakePatch) -> StoreResult<Cake> {
        self.cache.update(id, patch).await
    }

    /// Deletes a cake after backend confirmation.
    pub async fn remove(&self, id: &str) -> StoreResult<()> {
        self.cache.remove(id).await
    }

    /// Fetches the cakes carrying `tag`, upserting them without evicting
    /// cakes that no longer match.
    pub async fn fetch_by_tag(&self, tag: &str) -> StoreResult<Vec<Cake>> {
        self.cache.fetch_where(|cake| cake.has_tag(tag)).await
    }

    /// Fetches the `limit` best-rated cakes and snapshots them into the
    /// top-rated view.
    pub async fn fetch_top_rated(&self, limit: usize) -> StoreResult<Vec<Cake>> {
        let view = self
            .cache
            .fetch_view(|a, b| b.rating.total_cmp(&a.rating), limit)
            .await?;
        self.top_rated.set("cakes.top_rated", view.clone())?;
        Ok(view)
    }

    /// Fetches the `limit` newest cakes and snapshots them into the latest
    /// view.
    pub async fn fetch_latest(&self, limit: usize) -> StoreResult<Vec<Cake>> {
        let view = self
            .cache
            .fetch_view(|a, b| b.created_at.cmp(&a.created_at), limit)
            .await?;
        self.latest.set("cakes.latest", view.clone())?;
        Ok(view)
    }

    /// Snapshot of the last [`CakesStore::fetch_top_rated`] payload.
    pub fn top_rated(&self) -> StoreResult<Vec<Cake>> {
        self.top_rated.get("cakes.top_rated")
    }

    /// Snapshot of the last [`CakesStore::fetch_latest`] payload.
    pub fn latest(&self) -> StoreResult<Vec<Cake>> {
        self.latest.get("cakes.latest")
    }

    /// Live view of the cached cakes carrying `tag`.
    pub fn by_tag(&self, tag: &str) -> StoreResult<Vec<Cake>> {
        self.cache.select_where(|cake| cake.has_tag(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::backend::InMemoryBackend;

    fn store() -> CakesStore<InMemoryBackend> {
        CakesStore::new(Arc::new(InMemoryBackend::new()))
    }

    fn draft(name: &str, price: f64, tags: &[&str]) -> CakeDraft {
        CakeDraft::new(
            name,
            "",
            "",
            price,
            10,
            tags.iter().map(|t| (*t).to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn top_rated_view_ranks_by_rating_and_stays_a_snapshot() {
        let store = store();
        let low = store.create(draft("Low", 5.0, &[])).await.unwrap();
        let high = store.create(draft("High", 5.0, &[])).await.unwrap();
        store
            .update(&low.id, CakePatch::default().with_rating(2.0, 4))
            .await
            .unwrap();
        store
            .update(&high.id, CakePatch::default().with_rating(4.5, 9))
            .await
            .unwrap();

        let view = store.fetch_top_rated(10).await.unwrap();
        assert_eq!(view[0].id, high.id);
        assert_eq!(store.top_rated().unwrap().len(), 2);

        // A later cache mutation does not rewrite the snapshot.
        store
            .update(&low.id, CakePatch::default().with_rating(5.0, 5))
            .await
            .unwrap();
        let snapshot = store.top_rated().unwrap();
        assert_eq!(snapshot[0].id, high.id);
        assert_eq!(
            snapshot.iter().find(|c| c.id == low.id).unwrap().rating,
            2.0
        );
        // The live cache sees the new rating.
        assert_eq!(
            store.cache().select_by_id(&low.id).unwrap().unwrap().rating,
            5.0
        );
    }

    #[tokio::test]
    async fn tag_queries_filter_without_evicting() {
        let store = store();
        store
            .create(draft("Choco", 12.0, &["chocolate", "birthday"]))
            .await
            .unwrap();
        store.create(draft("Plain", 8.0, &[])).await.unwrap();

        let matches = store.fetch_by_tag("birthday").await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "Choco");
        assert_eq!(store.cache().total().unwrap(), 2);

        assert_eq!(store.by_tag("chocolate").unwrap().len(), 1);
        assert!(store.by_tag("vanilla").unwrap().is_empty());
    }

    #[tokio::test]
    async fn latest_view_is_limited() {
        let store = store();
        for name in ["A", "B", "C"] {
            store.create(draft(name, 1.0, &[])).await.unwrap();
        }
        let view = store.fetch_latest(2).await.unwrap();
        assert_eq!(view.len(), 2);
        assert!(view[0].created_at >= view[1].created_at);
        assert_eq!(store.latest().unwrap().len(), 2);
    }
}

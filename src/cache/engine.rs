//! The generic entity store engine.
//!
//! One [`EntityStore`] maintains the normalized cache for a single entity
//! kind: a `by_id` map plus a separately tracked id ordering, a request-status
//! state machine for bulk fetches, and the last surfaced error. Every cache
//! mutation is mediated through the backend adapter and applied only after the
//! backend confirms; there is no optimistic local insertion, so a failed call
//! always leaves the cache exactly as it was.
//!
//! Mutations are applied in the order their backend confirmations arrive, not
//! the order requests were issued; the last confirmed write to an id wins.
//! Callers needing strict per-id ordering must serialize issuance themselves.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use log::{debug, warn};

use crate::backend::{Backend, Document};
use crate::cache::record::{decode, to_fields, Draft, Patch, Record};
use crate::cache::status::RequestStatus;
use crate::error::{BackendError, StoreError, StoreResult};

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[derive(Debug)]
struct CacheState<R> {
    by_id: HashMap<String, R>,
    order: Vec<String>,
    status: RequestStatus,
    last_error: Option<String>,
}

impl<R> Default for CacheState<R> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
            order: Vec::new(),
            status: RequestStatus::Idle,
            last_error: None,
        }
    }
}

/// Normalized cache of one entity kind, synchronized against a remote backend.
#[derive(Debug)]
pub struct EntityStore<R: Record, B: Backend> {
    backend: Arc<B>,
    state: RwLock<CacheState<R>>,
}

impl<R: Record, B: Backend> EntityStore<R, B> {
    /// Creates an empty store over the given backend handle.
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: RwLock::new(CacheState::default()),
        }
    }

    fn read(&self, context: &'static str) -> StoreResult<RwLockReadGuard<'_, CacheState<R>>> {
        self.state
            .read()
            .map_err(|_| StoreError::internal(format!("poisoned lock: {context}")))
    }

    fn write(&self, context: &'static str) -> StoreResult<RwLockWriteGuard<'_, CacheState<R>>> {
        self.state
            .write()
            .map_err(|_| StoreError::internal(format!("poisoned lock: {context}")))
    }

    /// Records a backend failure in `last_error` and converts it into the
    /// store error returned to the caller. Does not touch the bulk-fetch
    /// status; only `fetch_all` transitions that machine.
    fn backend_failure(&self, err: BackendError) -> StoreError {
        warn!("{}: backend call failed: {err}", R::COLLECTION);
        if let Ok(mut state) = self.state.write() {
            state.last_error = Some(err.to_string());
        }
        StoreError::Backend(err)
    }

    // ---- operations -------------------------------------------------------

    /// Replaces the cache wholesale with the backend's current collection.
    ///
    /// Drives the request-status machine: `Loading` while in flight, then
    /// `Succeeded` (cache replaced) or `Failed` (`last_error` set, previously
    /// cached entities left intact).
    pub async fn fetch_all(&self) -> StoreResult<Vec<R>> {
        self.write("fetch_all")?.status = RequestStatus::Loading;

        let outcome = match self.backend.fetch_all(R::COLLECTION).await {
            Ok(docs) => docs.iter().map(decode::<R>).collect::<StoreResult<Vec<R>>>(),
            Err(err) => Err(StoreError::Backend(err)),
        };

        match outcome {
            Ok(mut records) => {
                records.sort_by(R::sort_order);
                let mut state = self.write("fetch_all")?;
                Self::set_all_locked(&mut state, records.clone());
                state.status = RequestStatus::Succeeded;
                debug!("{}: fetched {} records", R::COLLECTION, records.len());
                Ok(records)
            }
            Err(err) => {
                warn!("{}: fetch_all failed: {err}", R::COLLECTION);
                let mut state = self.write("fetch_all")?;
                state.status = RequestStatus::Failed;
                state.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Fetches one record by id, upserting it into the cache when found.
    ///
    /// An absent id is an explicit `Ok(None)`, never an error, and the global
    /// request status is untouched either way.
    pub async fn fetch_by_id(&self, id: &str) -> StoreResult<Option<R>> {
        match self.backend.fetch_one(R::COLLECTION, id).await {
            Ok(Some(doc)) => {
                let record = decode::<R>(&doc)?;
                self.reconcile(record.clone())?;
                Ok(Some(record))
            }
            Ok(None) => Ok(None),
            Err(err) => Err(self.backend_failure(err)),
        }
    }

    /// Validates and creates a record, inserting it into the cache only after
    /// the backend confirms and assigns id and timestamps.
    pub async fn create(&self, draft: R::Draft) -> StoreResult<R> {
        draft.validate()?;
        let fields = to_fields(&draft)?;
        let doc = self
            .backend
            .insert(R::COLLECTION, fields)
            .await
            .map_err(|err| self.backend_failure(err))?;
        let record = decode::<R>(&doc)?;
        self.reconcile(record.clone())?;
        Ok(record)
    }

    /// Like [`EntityStore::create`], for kinds keyed by a caller-supplied
    /// natural key.
    pub async fn create_with_id(&self, id: &str, draft: R::Draft) -> StoreResult<R> {
        draft.validate()?;
        let fields = to_fields(&draft)?;
        let doc = self
            .backend
            .insert_with_id(R::COLLECTION, id, fields)
            .await
            .map_err(|err| self.backend_failure(err))?;
        let record = decode::<R>(&doc)?;
        self.reconcile(record.clone())?;
        Ok(record)
    }

    /// Validates and applies a partial update, merging the changes into the
    /// cached entry only after the backend confirms. `updated_at` is
    /// refreshed on the merged record.
    ///
    /// When the backend confirms a patch for an id the cache has never seen,
    /// the confirmed record is fetched and reconciled instead of inserting a
    /// partial entry.
    pub async fn update(&self, id: &str, patch: R::Patch) -> StoreResult<R> {
        patch.validate()?;
        let fields = to_fields(&patch)?;
        self.backend
            .patch(R::COLLECTION, id, fields)
            .await
            .map_err(|err| self.backend_failure(err))?;

        let cached = self.read("update")?.by_id.get(id).cloned();
        if let Some(mut record) = cached {
            record.apply_patch(&patch);
            record.touch(now_millis());
            self.reconcile(record.clone())?;
            return Ok(record);
        }

        match self.backend.fetch_one(R::COLLECTION, id).await {
            Ok(Some(doc)) => {
                let record = decode::<R>(&doc)?;
                self.reconcile(record.clone())?;
                Ok(record)
            }
            Ok(None) => Err(self.backend_failure(BackendError::Missing {
                collection: R::COLLECTION.to_string(),
                id: id.to_string(),
            })),
            Err(err) => Err(self.backend_failure(err)),
        }
    }

    /// Deletes a record, removing it from the cache only after the backend
    /// confirms. Removing an id the cache does not hold is a no-op locally.
    pub async fn remove(&self, id: &str) -> StoreResult<()> {
        self.backend
            .delete(R::COLLECTION, id)
            .await
            .map_err(|err| self.backend_failure(err))?;

        let mut state = self.write("remove")?;
        if state.by_id.remove(id).is_some() {
            state.order.retain(|oid| oid != id);
            debug!("{}: removed '{id}'", R::COLLECTION);
        }
        Ok(())
    }

    /// Query variant: fetches the collection, keeps the records matching
    /// `predicate`, upserts them into the cache (entities no longer matching
    /// are not evicted) and returns them in comparator order.
    pub async fn fetch_where<F>(&self, predicate: F) -> StoreResult<Vec<R>>
    where
        F: Fn(&R) -> bool,
    {
        let records = self.fetch_collection().await?;
        let mut matches: Vec<R> = records.into_iter().filter(|r| predicate(r)).collect();
        matches.sort_by(R::sort_order);
        self.reconcile_many(matches.clone())?;
        Ok(matches)
    }

    /// Query variant feeding materialized views: fetches the collection,
    /// sorts it by `rank`, keeps the first `limit` records and upserts them
    /// into the cache. The returned sequence follows `rank`, not the cache
    /// comparator.
    pub async fn fetch_view<F>(&self, rank: F, limit: usize) -> StoreResult<Vec<R>>
    where
        F: Fn(&R, &R) -> Ordering,
    {
        let mut records = self.fetch_collection().await?;
        records.sort_by(|a, b| rank(a, b));
        records.truncate(limit);
        self.reconcile_many(records.clone())?;
        Ok(records)
    }

    async fn fetch_collection(&self) -> StoreResult<Vec<R>> {
        let docs = self
            .backend
            .fetch_all(R::COLLECTION)
            .await
            .map_err(|err| self.backend_failure(err))?;
        docs.iter().map(decode::<R>).collect()
    }

    /// Real-time refresh hook: replaces the cache wholesale from a pushed
    /// collection snapshot. The request-status machine is untouched; it
    /// reflects explicit bulk fetches only.
    pub fn apply_snapshot(&self, docs: &[Document]) -> StoreResult<Vec<R>> {
        let mut records = docs
            .iter()
            .map(decode::<R>)
            .collect::<StoreResult<Vec<R>>>()?;
        records.sort_by(R::sort_order);
        let mut state = self.write("apply_snapshot")?;
        Self::set_all_locked(&mut state, records.clone());
        Ok(records)
    }

    // ---- cache mutation ---------------------------------------------------

    /// The single cache-mutation-after-confirmation primitive. Upserts a
    /// backend-confirmed record, keeping `order` sorted by the comparator and
    /// never duplicating an id.
    pub(crate) fn reconcile(&self, record: R) -> StoreResult<()> {
        let mut state = self.write("reconcile")?;
        Self::reconcile_locked(&mut state, record);
        Ok(())
    }

    fn reconcile_many(&self, records: Vec<R>) -> StoreResult<()> {
        let mut state = self.write("reconcile_many")?;
        for record in records {
            Self::reconcile_locked(&mut state, record);
        }
        Ok(())
    }

    fn reconcile_locked(state: &mut CacheState<R>, record: R) {
        let id = record.id().to_string();
        if state.by_id.contains_key(&id) {
            state.order.retain(|oid| *oid != id);
        }
        let by_id = &state.by_id;
        let position = state
            .order
            .iter()
            .position(|oid| {
                by_id
                    .get(oid)
                    .is_some_and(|existing| R::sort_order(&record, existing) == Ordering::Less)
            })
            .unwrap_or(state.order.len());
        state.order.insert(position, id.clone());
        state.by_id.insert(id, record);
    }

    fn set_all_locked(state: &mut CacheState<R>, records: Vec<R>) {
        state.by_id.clear();
        state.order.clear();
        for record in records {
            let id = record.id().to_string();
            if state.by_id.insert(id.clone(), record).is_none() {
                state.order.push(id);
            }
        }
    }

    // ---- selectors --------------------------------------------------------

    /// All cached records in comparator order.
    pub fn select_all(&self) -> StoreResult<Vec<R>> {
        let state = self.read("select_all")?;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.by_id.get(id).cloned())
            .collect())
    }

    /// Lookup by id against the cache only.
    pub fn select_by_id(&self, id: &str) -> StoreResult<Option<R>> {
        Ok(self.read("select_by_id")?.by_id.get(id).cloned())
    }

    /// Cached ids in comparator order.
    pub fn select_ids(&self) -> StoreResult<Vec<String>> {
        Ok(self.read("select_ids")?.order.clone())
    }

    /// Number of cached records.
    pub fn total(&self) -> StoreResult<usize> {
        Ok(self.read("total")?.by_id.len())
    }

    /// Cached records matching `predicate`, in comparator order.
    pub fn select_where<F>(&self, predicate: F) -> StoreResult<Vec<R>>
    where
        F: Fn(&R) -> bool,
    {
        let state = self.read("select_where")?;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.by_id.get(id))
            .filter(|r| predicate(r))
            .cloned()
            .collect())
    }

    /// Status of the most recent bulk fetch.
    pub fn status(&self) -> StoreResult<RequestStatus> {
        Ok(self.read("status")?.status)
    }

    /// Last error message surfaced by a failed operation, if any.
    pub fn last_error(&self) -> StoreResult<Option<String>> {
        Ok(self.read("last_error")?.last_error.clone())
    }

    /// Returns the bulk-fetch status machine to `Idle` from any state.
    pub fn reset_status(&self) -> StoreResult<()> {
        self.write("reset_status")?.status = RequestStatus::Idle;
        Ok(())
    }

    /// Clears the recorded error message.
    pub fn clear_error(&self) -> StoreResult<()> {
        self.write("clear_error")?.last_error = None;
        Ok(())
    }
}

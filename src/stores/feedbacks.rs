//! Feedback store: submission, the approval queue and the per-cake rating
//! aggregate.

use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::Backend;
use crate::cache::EntityStore;
use crate::error::StoreResult;
use crate::model::{Feedback, FeedbackDraft, FeedbackPatch};
use crate::stores::ViewSlot;

/// Entity store for customer feedback.
#[derive(Debug)]
pub struct FeedbacksStore<B: Backend> {
    cache: EntityStore<Feedback, B>,
    cake_feedbacks: ViewSlot<HashMap<String, Vec<Feedback>>>,
    pending_approval: ViewSlot<Vec<Feedback>>,
}

impl<B: Backend> FeedbacksStore<B> {
    /// Creates an empty store over the given backend handle.
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            cache: EntityStore::new(backend),
            cake_feedbacks: ViewSlot::default(),
            pending_approval: ViewSlot::default(),
        }
    }

    /// Read access to the underlying cache: selectors, request status and
    /// error slots.
    #[must_use]
    pub fn cache(&self) -> &EntityStore<Feedback, B> {
        &self.cache
    }

    /// Replaces the cache with all feedback and recomputes the approval
    /// queue from the payload.
    pub async fn fetch_all(&self) -> StoreResult<Vec<Feedback>> {
        let all = self.cache.fetch_all().await?;
        let pending: Vec<Feedback> = all.iter().filter(|f| !f.approved).cloned().collect();
        self.pending_approval
            .set("feedbacks.pending_approval", pending)?;
        Ok(all)
    }

    /// Fetches one feedback, upserting it when found.
    pub async fn fetch_by_id(&self, id: &str) -> StoreResult<Option<Feedback>> {
        self.cache.fetch_by_id(id).await
    }

    /// Fetches every feedback for one cake, approved or not, and snapshots
    /// the result into the per-cake view.
    pub async fn fetch_by_cake(&self, cake_id: &str) -> StoreResult<Vec<Feedback>> {
        let feedbacks = self
            .cache
            .fetch_where(|feedback| feedback.cake_id == cake_id)
            .await?;
        self.set_cake_view(cake_id, feedbacks.clone())?;
        Ok(feedbacks)
    }

    /// Fetches the approved feedback for one cake and snapshots the result
    /// into the per-cake view.
    pub async fn fetch_approved(&self, cake_id: &str) -> StoreResult<Vec<Feedback>> {
        let feedbacks = self
            .cache
            .fetch_where(|feedback| feedback.cake_id == cake_id && feedback.approved)
            .await?;
        self.set_cake_view(cake_id, feedbacks.clone())?;
        Ok(feedbacks)
    }

    /// Fetches one user's feedback, upserting without snapshotting.
    pub async fn fetch_by_user(&self, user_id: &str) -> StoreResult<Vec<Feedback>> {
        self.cache
            .fetch_where(|feedback| feedback.user_id == user_id)
            .await
    }

    /// Submits feedback after backend confirmation. New feedback lands in the
    /// approval queue.
    pub async fn create(&self, draft: FeedbackDraft) -> StoreResult<Feedback> {
        let feedback = self.cache.create(draft).await?;
        if !feedback.approved {
            let pushed = feedback.clone();
            self.pending_approval
                .with_mut("feedbacks.pending_approval", |queue| queue.push(pushed))?;
        }
        Ok(feedback)
    }

    /// Applies a partial update after backend confirmation.
    pub async fn update(&self, id: &str, patch: FeedbackPatch) -> StoreResult<Feedback> {
        self.cache.update(id, patch).await
    }

    /// Approves a feedback and drops it from the approval queue.
    pub async fn approve(&self, id: &str) -> StoreResult<Feedback> {
        let feedback = self
            .cache
            .update(id, FeedbackPatch::default().with_approved(true))
            .await?;
        self.pending_approval
            .with_mut("feedbacks.pending_approval", |queue| {
                queue.retain(|f| f.id != id);
            })?;
        Ok(feedback)
    }

    /// Deletes a feedback after backend confirmation and drops it from the
    /// approval queue.
    pub async fn remove(&self, id: &str) -> StoreResult<()> {
        self.cache.remove(id).await?;
        self.pending_approval
            .with_mut("feedbacks.pending_approval", |queue| {
                queue.retain(|f| f.id != id);
            })
    }

    /// Snapshot of the last per-cake fetch for `cake_id`, empty when no fetch
    /// has run.
    pub fn by_cake_snapshot(&self, cake_id: &str) -> StoreResult<Vec<Feedback>> {
        Ok(self
            .cake_feedbacks
            .get("feedbacks.cake_feedbacks")?
            .remove(cake_id)
            .unwrap_or_default())
    }

    /// Drops the per-cake snapshot for `cake_id`.
    pub fn clear_cake_feedbacks(&self, cake_id: &str) -> StoreResult<()> {
        self.cake_feedbacks
            .with_mut("feedbacks.cake_feedbacks", |map| {
                map.remove(cake_id);
            })
    }

    /// Snapshot of the approval queue.
    pub fn pending_approval(&self) -> StoreResult<Vec<Feedback>> {
        self.pending_approval.get("feedbacks.pending_approval")
    }

    /// Live view of the cached approved feedback.
    pub fn approved(&self) -> StoreResult<Vec<Feedback>> {
        self.cache.select_where(|feedback| feedback.approved)
    }

    /// Live view of the cached feedback for one cake.
    pub fn by_cake(&self, cake_id: &str) -> StoreResult<Vec<Feedback>> {
        self.cache
            .select_where(|feedback| feedback.cake_id == cake_id)
    }

    /// Mean rating over the cached approved feedback for one cake, rounded
    /// to one decimal. Zero when no approved feedback is cached.
    pub fn average_rating(&self, cake_id: &str) -> StoreResult<f64> {
        let approved = self
            .cache
            .select_where(|feedback| feedback.cake_id == cake_id && feedback.approved)?;
        if approved.is_empty() {
            return Ok(0.0);
        }
        let sum: f64 = approved.iter().map(|f| f64::from(f.rating)).sum();
        #[allow(clippy::cast_precision_loss)]
        let mean = sum / approved.len() as f64;
        Ok((mean * 10.0).round() / 10.0)
    }

    fn set_cake_view(&self, cake_id: &str, feedbacks: Vec<Feedback>) -> StoreResult<()> {
        self.cake_feedbacks
            .with_mut("feedbacks.cake_feedbacks", |map| {
                map.insert(cake_id.to_string(), feedbacks);
            })
    }
}

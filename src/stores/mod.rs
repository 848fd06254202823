//! Per-kind store configurations and the [`Storefront`] bundle.
//!
//! Each store is a thin configuration of the generic engine plus the
//! kind-specific operations and materialized-view slots the storefront UI
//! reads. Materialized views are point-in-time snapshots: they reflect the
//! payload of the fetch that produced them and are deliberately not kept in
//! sync with later cache mutations. The live selectors on each store are the
//! always-current alternative.

mod cakes;
mod feedbacks;
mod orders;
mod users;

pub use cakes::CakesStore;
pub use feedbacks::FeedbacksStore;
pub use orders::OrdersStore;
pub use users::UsersStore;

use std::sync::{Arc, RwLock};

use crate::backend::Backend;
use crate::error::{StoreError, StoreResult};

/// Holder for one materialized view snapshot.
///
/// The snapshot-vs-live distinction is part of the store contract: a slot is
/// overwritten by the operation that feeds it and by nothing else.
#[derive(Debug, Default)]
pub(crate) struct ViewSlot<T> {
    inner: RwLock<T>,
}

impl<T: Clone> ViewSlot<T> {
    pub(crate) fn get(&self, context: &'static str) -> StoreResult<T> {
        self.inner
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| StoreError::internal(format!("poisoned lock: {context}")))
    }

    pub(crate) fn set(&self, context: &'static str, value: T) -> StoreResult<()> {
        *self
            .inner
            .write()
            .map_err(|_| StoreError::internal(format!("poisoned lock: {context}")))? = value;
        Ok(())
    }

    pub(crate) fn with_mut<F>(&self, context: &'static str, mutate: F) -> StoreResult<()>
    where
        F: FnOnce(&mut T),
    {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| StoreError::internal(format!("poisoned lock: {context}")))?;
        mutate(&mut guard);
        Ok(())
    }
}

/// The explicit state container: one entity store per kind, sharing one
/// backend handle. Created once at process start and passed by reference to
/// whichever component needs it; there are no process-wide statics.
#[derive(Debug)]
pub struct Storefront<B: Backend> {
    pub cakes: CakesStore<B>,
    pub users: UsersStore<B>,
    pub orders: OrdersStore<B>,
    pub feedbacks: FeedbacksStore<B>,
}

impl<B: Backend> Storefront<B> {
    /// Builds the container over a shared backend handle.
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            cakes: CakesStore::new(Arc::clone(&backend)),
            users: UsersStore::new(Arc::clone(&backend)),
            orders: OrdersStore::new(Arc::clone(&backend)),
            feedbacks: FeedbacksStore::new(backend),
        }
    }
}

//! Order store: CRUD, the per-user order snapshot, status transitions and the
//! admin status filter.

use std::sync::Arc;

use crate::backend::Backend;
use crate::cache::EntityStore;
use crate::error::StoreResult;
use crate::model::{Order, OrderDraft, OrderPatch, OrderStatus, PaymentStatus};
use crate::stores::ViewSlot;

/// Entity store for customer orders.
#[derive(Debug)]
pub struct OrdersStore<B: Backend> {
    cache: EntityStore<Order, B>,
    user_orders: ViewSlot<Vec<Order>>,
    status_filter: ViewSlot<Option<OrderStatus>>,
}

impl<B: Backend> OrdersStore<B> {
    /// Creates an empty store over the given backend handle.
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            cache: EntityStore::new(backend),
            user_orders: ViewSlot::default(),
            status_filter: ViewSlot::default(),
        }
    }

    /// Read access to the underlying cache: selectors, request status and
    /// error slots.
    #[must_use]
    pub fn cache(&self) -> &EntityStore<Order, B> {
        &self.cache
    }

    /// Replaces the cache with all orders.
    pub async fn fetch_all(&self) -> StoreResult<Vec<Order>> {
        self.cache.fetch_all().await
    }

    /// Fetches one order, upserting it when found.
    pub async fn fetch_by_id(&self, id: &str) -> StoreResult<Option<Order>> {
        self.cache.fetch_by_id(id).await
    }

    /// Places an order after backend confirmation.
    pub async fn create(&self, draft: OrderDraft) -> StoreResult<Order> {
        self.cache.create(draft).await
    }

    /// Applies a partial update after backend confirmation.
    pub async fn update(&self, id: &str, patch: OrderPatch) -> StoreResult<Order> {
        self.cache.update(id, patch).await
    }

    /// Deletes an order after backend confirmation.
    pub async fn remove(&self, id: &str) -> StoreResult<()> {
        self.cache.remove(id).await
    }

    /// Fetches one user's orders, upserting them and snapshotting the result
    /// into the per-user view.
    pub async fn fetch_by_user(&self, user_id: &str) -> StoreResult<Vec<Order>> {
        let orders = self
            .cache
            .fetch_where(|order| order.user_id == user_id)
            .await?;
        self.user_orders.set("orders.user_orders", orders.clone())?;
        Ok(orders)
    }

    /// Fetches the orders in `status`, upserting them without snapshotting.
    pub async fn fetch_by_status(&self, status: OrderStatus) -> StoreResult<Vec<Order>> {
        self.cache.fetch_where(|order| order.status == status).await
    }

    /// Moves an order to a new fulfillment status.
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> StoreResult<Order> {
        self.cache
            .update(id, OrderPatch::default().with_status(status))
            .await
    }

    /// Moves an order to a new payment status.
    pub async fn update_payment_status(
        &self,
        id: &str,
        payment_status: PaymentStatus,
    ) -> StoreResult<Order> {
        self.cache
            .update(id, OrderPatch::default().with_payment_status(payment_status))
            .await
    }

    /// Snapshot of the last [`OrdersStore::fetch_by_user`] payload.
    pub fn user_orders(&self) -> StoreResult<Vec<Order>> {
        self.user_orders.get("orders.user_orders")
    }

    /// Sets the admin status filter applied by [`OrdersStore::filtered`].
    pub fn set_status_filter(&self, status: OrderStatus) -> StoreResult<()> {
        self.status_filter.set("orders.status_filter", Some(status))
    }

    /// Clears the admin status filter.
    pub fn clear_status_filter(&self) -> StoreResult<()> {
        self.status_filter.set("orders.status_filter", None)
    }

    /// Currently applied status filter, if any.
    pub fn status_filter(&self) -> StoreResult<Option<OrderStatus>> {
        self.status_filter.get("orders.status_filter")
    }

    /// Live view of the cached orders, narrowed by the status filter when one
    /// is set.
    pub fn filtered(&self) -> StoreResult<Vec<Order>> {
        match self.status_filter()? {
            Some(status) => self.by_status(status),
            None => self.cache.select_all(),
        }
    }

    /// Live view of the cached orders in `status`.
    pub fn by_status(&self, status: OrderStatus) -> StoreResult<Vec<Order>> {
        self.cache.select_where(|order| order.status == status)
    }

    /// Live view of the cached orders still awaiting payment.
    pub fn unpaid(&self) -> StoreResult<Vec<Order>> {
        self.cache
            .select_where(|order| order.payment_status == PaymentStatus::Pending)
    }
}

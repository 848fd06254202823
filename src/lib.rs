//! # bakeshop-store - Normalized entity cache with remote synchronization
//!
//! bakeshop-store keeps an in-memory, normalized cache of storefront entities
//! (cakes, users, orders, feedback) synchronized with a remote document-style
//! backend. Mutations are confirm-then-apply: nothing enters the cache until
//! the backend has acknowledged it, so the cache only ever holds confirmed
//! state.
//!
//! ## Core Concepts
//!
//! - **Record**: a cached entity kind with a stable string id and timestamps
//! - **EntityStore**: the generic cache engine, one per kind
//! - **Backend**: the async adapter to the remote document store
//! - **Storefront**: the explicit container bundling one store per kind
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bakeshop_store::{CakeDraft, InMemoryBackend, Storefront};
//!
//! let backend = Arc::new(InMemoryBackend::new());
//! let front = Storefront::new(backend);
//!
//! let draft = CakeDraft::new("Chocolate Dream", "Rich and dark", "", 24.5, 10, vec![]);
//! let cake = front.cakes.create(draft).await?;
//! assert_eq!(front.cakes.cache().total()?, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod backend;
pub mod cache;
pub mod error;
pub mod media;
pub mod model;
pub mod stores;

// Re-export primary types at crate root for convenience
pub use backend::{Backend, Document, Fields, InMemoryBackend};
pub use cache::{Draft, EntityStore, Patch, Record, RequestStatus};
pub use error::{BackendError, StoreError, StoreResult, ValidationError};
pub use media::{InMemoryObjectStore, ObjectStore};
pub use model::{
    generate_order_id, Cake, CakeDraft, CakePatch, Feedback, FeedbackDraft, FeedbackPatch, Order,
    OrderDraft, OrderItem, OrderPatch, OrderStatus, PaymentStatus, User, UserDraft, UserPatch,
    UserRole,
};
pub use stores::{CakesStore, FeedbacksStore, OrdersStore, Storefront, UsersStore};

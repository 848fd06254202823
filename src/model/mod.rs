//! Typed entity kinds for the storefront collections.
//!
//! Every kind carries the common envelope (string id, `created_at` /
//! `updated_at` in milliseconds since epoch, assigned by the backend adapter)
//! plus its own fields, and comes with an explicit `Draft` (creation input)
//! and `Patch` (partial update) type. Wire field names are camelCase and
//! unknown fields are rejected on decode.

mod cake;
mod feedback;
mod order;
mod user;

pub use cake::{Cake, CakeDraft, CakePatch};
pub use feedback::{Feedback, FeedbackDraft, FeedbackPatch};
pub use order::{
    generate_order_id, Order, OrderDraft, OrderItem, OrderPatch, OrderStatus, PaymentStatus,
};
pub use user::{User, UserDraft, UserPatch, UserRole};

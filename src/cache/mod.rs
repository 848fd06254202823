//! Generic entity cache engine.
//!
//! The engine is parameterized by entity kind ([`Record`]) and backend
//! ([`crate::backend::Backend`]); the per-kind configurations live in
//! [`crate::stores`].

mod engine;
mod record;
mod status;

pub use engine::EntityStore;
pub use record::{Draft, Patch, Record};
pub use status::RequestStatus;

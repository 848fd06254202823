//! Remote backend adapter contract.
//!
//! The store never talks to the wire directly; it goes through the [`Backend`]
//! trait, which models a document-style key/value database: named collections
//! holding JSON documents addressed by string id. All calls are asynchronous
//! request/response; there is no streaming in the core contract.
//!
//! The adapter, not the caller, assigns record ids and both timestamps on
//! insert and refreshes the update timestamp on patch.

mod memory;

pub use memory::InMemoryBackend;

use serde_json::{Map, Value};

use crate::error::BackendError;

/// Field name the adapter writes the creation timestamp under.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Field name the adapter writes the update timestamp under.
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// JSON object carried in a document body.
pub type Fields = Map<String, Value>;

/// A single record as stored by the backend: a stable string key plus a JSON
/// object of fields. The id is the collection key and is not duplicated inside
/// `fields` unless the entity kind uses a natural key.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Collection key for this record.
    pub id: String,
    /// Document body.
    pub fields: Fields,
}

impl Document {
    /// Creates a document from a key and body.
    #[must_use]
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Asynchronous document-store contract the entity cache synchronizes against.
///
/// Implementations must be safe to share across tasks; every method is a
/// single request/response exchange and may fail with [`BackendError`].
pub trait Backend: Send + Sync + 'static {
    /// Fetch every document in a collection. An unknown collection is empty,
    /// not an error.
    fn fetch_all(
        &self,
        collection: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Document>, BackendError>> + Send;

    /// Fetch one document by id, `None` when absent.
    fn fetch_one(
        &self,
        collection: &str,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Document>, BackendError>> + Send;

    /// Insert a new document. The adapter assigns the id and writes
    /// [`CREATED_AT_FIELD`] / [`UPDATED_AT_FIELD`], returning the stored
    /// document.
    fn insert(
        &self,
        collection: &str,
        fields: Fields,
    ) -> impl std::future::Future<Output = Result<Document, BackendError>> + Send;

    /// Insert a new document under a caller-supplied natural key. Rejects a
    /// duplicate id instead of overwriting.
    fn insert_with_id(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> impl std::future::Future<Output = Result<Document, BackendError>> + Send;

    /// Merge `fields` into an existing document and refresh
    /// [`UPDATED_AT_FIELD`]. Reports [`BackendError::Missing`] for an absent
    /// id.
    fn patch(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> impl std::future::Future<Output = Result<(), BackendError>> + Send;

    /// Delete a document. Idempotent: deleting an absent id succeeds.
    fn delete(
        &self,
        collection: &str,
        id: &str,
    ) -> impl std::future::Future<Output = Result<(), BackendError>> + Send;
}

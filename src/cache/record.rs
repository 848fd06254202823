//! Trait seams between the generic engine and the entity kinds.
//!
//! A [`Record`] is one cached entity kind; its [`Draft`] is the validated
//! creation input (no id, no timestamps) and its [`Patch`] the validated
//! partial update. Both serialize to wire fields explicitly, field by field;
//! there is no dynamic shape merging anywhere in the crate.

use std::cmp::Ordering;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::backend::{Document, Fields};
use crate::error::{StoreError, StoreResult, ValidationError};

/// Creation input for one entity kind.
pub trait Draft: Serialize + Send + Sync {
    /// Checks kind-specific field constraints. Runs before any backend call.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Partial update for one entity kind. Unset fields are not sent to the
/// backend and leave the cached entry untouched.
pub trait Patch: Serialize + Send + Sync {
    /// Checks kind-specific field constraints. Runs before any backend call.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// A cached entity kind.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Backend collection this kind lives in.
    const COLLECTION: &'static str;

    /// Field the stable identifier is exposed under when decoding a document.
    const ID_FIELD: &'static str = "id";

    /// Creation input type.
    type Draft: Draft;

    /// Partial update type.
    type Patch: Patch;

    /// Stable unique identifier.
    fn id(&self) -> &str;

    /// Creation timestamp in milliseconds since epoch.
    fn created_at(&self) -> i64;

    /// Merges a confirmed patch into this record.
    fn apply_patch(&mut self, patch: &Self::Patch);

    /// Refreshes the update timestamp.
    fn touch(&mut self, at_millis: i64);

    /// Comparator defining the cache's id ordering. Default: newest first by
    /// creation time, id as tiebreak.
    #[must_use]
    fn sort_order(a: &Self, b: &Self) -> Ordering {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| a.id().cmp(b.id()))
    }
}

/// Decodes a backend document into a typed record, injecting the document key
/// under [`Record::ID_FIELD`]. Unknown fields are rejected by the entity
/// types' serde contracts.
pub(crate) fn decode<R: Record>(doc: &Document) -> StoreResult<R> {
    let mut object = doc.fields.clone();
    object.insert(R::ID_FIELD.to_string(), Value::from(doc.id.clone()));
    serde_json::from_value(Value::Object(object)).map_err(|e| StoreError::Decode {
        collection: R::COLLECTION,
        message: e.to_string(),
    })
}

/// Serializes a draft or patch into wire fields.
pub(crate) fn to_fields<T: Serialize>(value: &T) -> StoreResult<Fields> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::internal(format!(
            "expected a JSON object for wire fields, got {other}"
        ))),
        Err(e) => Err(StoreError::internal(format!(
            "failed to serialize wire fields: {e}"
        ))),
    }
}

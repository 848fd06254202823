//! Named-object storage for entity media.
//!
//! Entities reference uploads by URL string only; the bucket itself is an
//! opaque collaborator behind the [`ObjectStore`] trait.

use std::collections::HashMap;
use std::future::Future;
use std::sync::RwLock;

use crate::error::BackendError;

/// An opaque named-object bucket.
pub trait ObjectStore: Send + Sync + 'static {
    /// Stores `bytes` under `name` and returns the URL to reference it by.
    /// Re-uploading a name overwrites the previous object.
    fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<String, BackendError>> + Send;

    /// Retrieves the object stored under `name`, if any.
    fn fetch(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, BackendError>> + Send;
}

/// In-memory bucket handing out `mem://` URLs.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObjectStore for InMemoryObjectStore {
    async fn upload(&self, name: &str, bytes: Vec<u8>) -> Result<String, BackendError> {
        let mut objects = self.objects.write().map_err(|_| BackendError::Unavailable {
            message: "poisoned lock: media.objects".to_string(),
        })?;
        objects.insert(name.to_string(), bytes);
        Ok(format!("mem://{name}"))
    }

    async fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let objects = self.objects.read().map_err(|_| BackendError::Unavailable {
            message: "poisoned lock: media.objects".to_string(),
        })?;
        Ok(objects.get(name).cloned())
    }
}

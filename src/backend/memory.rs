//! In-memory backend adapter.
//!
//! Reference implementation of the [`Backend`] contract for embedded usage and
//! tests. It mimics the hosted document store the storefront syncs against:
//! adapter-assigned keys and timestamps, idempotent deletes, and an optional
//! collection-change subscription that pushes whole-collection snapshots after
//! every mutation.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::backend::{Backend, Document, Fields, CREATED_AT_FIELD, UPDATED_AT_FIELD};
use crate::error::BackendError;

const SNAPSHOT_CHANNEL_CAPACITY: usize = 16;

fn lock_err(context: &'static str) -> BackendError {
    BackendError::Unavailable {
        message: format!("poisoned lock: {context}"),
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

type Collection = BTreeMap<String, Fields>;

/// Thread-safe in-memory document store with failure injection.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    collections: RwLock<HashMap<String, Collection>>,
    subscribers: RwLock<HashMap<String, broadcast::Sender<Vec<Document>>>>,
    offline: AtomicBool,
}

impl InMemoryBackend {
    /// Create a new empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle failure injection. While offline, every call fails with
    /// [`BackendError::Unavailable`] and no state changes.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Subscribe to whole-collection snapshots pushed after each mutation of
    /// `collection`. This is the optional real-time refresh primitive; the
    /// core CRUD contract does not depend on it.
    pub fn subscribe(&self, collection: &str) -> broadcast::Receiver<Vec<Document>> {
        let mut subscribers = match self.subscribers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        subscribers
            .entry(collection.to_string())
            .or_insert_with(|| broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    fn check_online(&self) -> Result<(), BackendError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable {
                message: "backend offline".to_string(),
            });
        }
        Ok(())
    }

    fn snapshot_of(collection: &Collection) -> Vec<Document> {
        collection
            .iter()
            .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
            .collect()
    }

    fn notify(&self, collection_name: &str, snapshot: Vec<Document>) {
        let Ok(subscribers) = self.subscribers.read() else {
            return;
        };
        if let Some(sender) = subscribers.get(collection_name) {
            // Lagging or dropped receivers are the subscriber's problem.
            let _ = sender.send(snapshot);
        }
    }

    fn store_new(
        &self,
        collection: &str,
        id: String,
        mut fields: Fields,
    ) -> Result<Document, BackendError> {
        let now = now_millis();
        fields.insert(CREATED_AT_FIELD.to_string(), Value::from(now));
        fields.insert(UPDATED_AT_FIELD.to_string(), Value::from(now));

        let snapshot;
        {
            let mut collections = self
                .collections
                .write()
                .map_err(|_| lock_err("backend.insert"))?;
            let records = collections.entry(collection.to_string()).or_default();
            if records.contains_key(&id) {
                return Err(BackendError::Rejected {
                    message: format!("duplicate id '{id}' in collection '{collection}'"),
                });
            }
            records.insert(id.clone(), fields.clone());
            snapshot = Self::snapshot_of(records);
        }

        self.notify(collection, snapshot);
        Ok(Document::new(id, fields))
    }
}

impl Backend for InMemoryBackend {
    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>, BackendError> {
        self.check_online()?;
        let collections = self
            .collections
            .read()
            .map_err(|_| lock_err("backend.fetch_all"))?;
        Ok(collections
            .get(collection)
            .map(Self::snapshot_of)
            .unwrap_or_default())
    }

    async fn fetch_one(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, BackendError> {
        self.check_online()?;
        let collections = self
            .collections
            .read()
            .map_err(|_| lock_err("backend.fetch_one"))?;
        Ok(collections
            .get(collection)
            .and_then(|records| records.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<Document, BackendError> {
        self.check_online()?;
        self.store_new(collection, Uuid::new_v4().to_string(), fields)
    }

    async fn insert_with_id(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Document, BackendError> {
        self.check_online()?;
        self.store_new(collection, id.to_string(), fields)
    }

    async fn patch(&self, collection: &str, id: &str, fields: Fields) -> Result<(), BackendError> {
        self.check_online()?;

        let snapshot;
        {
            let mut collections = self
                .collections
                .write()
                .map_err(|_| lock_err("backend.patch"))?;
            let records =
                collections
                    .get_mut(collection)
                    .ok_or_else(|| BackendError::Missing {
                        collection: collection.to_string(),
                        id: id.to_string(),
                    })?;
            let record = records.get_mut(id).ok_or_else(|| BackendError::Missing {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

            for (key, value) in fields {
                record.insert(key, value);
            }
            record.insert(UPDATED_AT_FIELD.to_string(), Value::from(now_millis()));
            snapshot = Self::snapshot_of(records);
        }

        self.notify(collection, snapshot);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), BackendError> {
        self.check_online()?;

        let snapshot;
        {
            let mut collections = self
                .collections
                .write()
                .map_err(|_| lock_err("backend.delete"))?;
            let Some(records) = collections.get_mut(collection) else {
                return Ok(());
            };
            if records.remove(id).is_none() {
                return Ok(());
            }
            snapshot = Self::snapshot_of(records);
        }

        self.notify(collection, snapshot);
        Ok(())
    }
}

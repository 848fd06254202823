//! User store: CRUD keyed by the natural `uid`, plus the moderation
//! operations (block/unblock, role changes).

use std::sync::Arc;

use crate::backend::Backend;
use crate::cache::EntityStore;
use crate::error::StoreResult;
use crate::model::{User, UserDraft, UserPatch, UserRole};

/// Entity store for storefront users.
#[derive(Debug)]
pub struct UsersStore<B: Backend> {
    cache: EntityStore<User, B>,
}

impl<B: Backend> UsersStore<B> {
    /// Creates an empty store over the given backend handle.
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            cache: EntityStore::new(backend),
        }
    }

    /// Read access to the underlying cache: selectors, request status and
    /// error slots.
    #[must_use]
    pub fn cache(&self) -> &EntityStore<User, B> {
        &self.cache
    }

    /// Replaces the cache with all users.
    pub async fn fetch_all(&self) -> StoreResult<Vec<User>> {
        self.cache.fetch_all().await
    }

    /// Fetches one user by uid, upserting when found.
    pub async fn fetch_by_uid(&self, uid: &str) -> StoreResult<Option<User>> {
        self.cache.fetch_by_id(uid).await
    }

    /// Creates a user under its natural key after backend confirmation.
    pub async fn create(&self, draft: UserDraft) -> StoreResult<User> {
        let uid = draft.uid.clone();
        self.cache.create_with_id(&uid, draft).await
    }

    /// Applies a partial update after backend confirmation.
    pub async fn update(&self, uid: &str, patch: UserPatch) -> StoreResult<User> {
        self.cache.update(uid, patch).await
    }

    /// Deletes a user after backend confirmation.
    pub async fn remove(&self, uid: &str) -> StoreResult<()> {
        self.cache.remove(uid).await
    }

    /// Blocks or unblocks a user.
    pub async fn toggle_block(&self, uid: &str, blocked: bool) -> StoreResult<User> {
        self.cache
            .update(uid, UserPatch::default().with_blocked(blocked))
            .await
    }

    /// Changes a user's role.
    pub async fn set_role(&self, uid: &str, role: UserRole) -> StoreResult<User> {
        self.cache
            .update(uid, UserPatch::default().with_role(role))
            .await
    }

    /// Live view of the cached admin users.
    pub fn admins(&self) -> StoreResult<Vec<User>> {
        self.cache.select_where(User::is_admin)
    }

    /// Live view of the cached blocked users.
    pub fn blocked(&self) -> StoreResult<Vec<User>> {
        self.cache.select_where(|user| user.blocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::backend::InMemoryBackend;
    use crate::error::StoreError;

    fn store() -> UsersStore<InMemoryBackend> {
        UsersStore::new(Arc::new(InMemoryBackend::new()))
    }

    #[tokio::test]
    async fn create_uses_the_natural_key() {
        let store = store();
        let user = store
            .create(UserDraft::new("uid-1", "Ada", "ada@example.com"))
            .await
            .unwrap();
        assert_eq!(user.uid, "uid-1");
        assert!(user.created_at > 0);

        let cached = store.cache().select_by_id("uid-1").unwrap().unwrap();
        assert_eq!(cached.email, "ada@example.com");

        // Duplicate natural keys are rejected, cache untouched.
        let err = store
            .create(UserDraft::new("uid-1", "Eve", "eve@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert_eq!(store.cache().total().unwrap(), 1);
    }

    #[tokio::test]
    async fn moderation_operations_merge_after_confirmation() {
        let store = store();
        store
            .create(UserDraft::new("uid-1", "Ada", "ada@example.com"))
            .await
            .unwrap();
        store
            .create(UserDraft::new("uid-2", "Eve", "eve@example.com"))
            .await
            .unwrap();

        let blocked = store.toggle_block("uid-2", true).await.unwrap();
        assert!(blocked.blocked);
        assert_eq!(store.blocked().unwrap().len(), 1);

        let admin = store.set_role("uid-1", UserRole::Admin).await.unwrap();
        assert!(admin.is_admin());
        let admins = store.admins().unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].uid, "uid-1");

        store.toggle_block("uid-2", false).await.unwrap();
        assert!(store.blocked().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_by_uid_returns_none_for_unknown_users() {
        let store = store();
        assert!(store.fetch_by_uid("ghost").await.unwrap().is_none());
    }
}

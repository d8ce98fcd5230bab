//! In-memory store repository for tests and local development.
//!
//! Mirrors the `stores` table constraints: IDs are assigned sequentially from
//! 1 and `store_hash` is unique.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use orderman_core::{StoreHash, StoreId};
use secrecy::SecretString;
use tokio::sync::RwLock;

use super::{RepositoryError, StoreRepository, check_access_token};
use crate::models::Store;

/// In-memory implementation of [`StoreRepository`].
#[derive(Debug, Default)]
pub struct MemoryStoreRepository {
    stores: RwLock<Vec<Store>>,
    lookups: AtomicUsize,
}

impl MemoryStoreRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.stores.read().await.len()
    }

    /// Whether no store has been recorded yet.
    pub async fn is_empty(&self) -> bool {
        self.stores.read().await.is_empty()
    }

    /// Number of read lookups (by id or store hash) served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoreRepository for MemoryStoreRepository {
    async fn get_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let stores = self.stores.read().await;
        Ok(stores.iter().find(|s| s.id == id).cloned())
    }

    async fn get_by_store_hash(
        &self,
        store_hash: &StoreHash,
    ) -> Result<Option<Store>, RepositoryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let stores = self.stores.read().await;
        Ok(stores.iter().find(|s| &s.store_hash == store_hash).cloned())
    }

    async fn upsert(
        &self,
        store_hash: &StoreHash,
        access_token: &SecretString,
        scope: &str,
    ) -> Result<Store, RepositoryError> {
        check_access_token(access_token)?;

        // Single write lock for find-or-insert, matching ON CONFLICT semantics.
        let mut stores = self.stores.write().await;

        if let Some(existing) = stores.iter_mut().find(|s| &s.store_hash == store_hash) {
            existing.access_token = access_token.clone();
            existing.scope = scope.to_owned();
            return Ok(existing.clone());
        }

        let next_id = stores.iter().map(|s| s.id.as_i32()).max().unwrap_or(0) + 1;
        let store = Store {
            id: StoreId::new(next_id),
            store_hash: store_hash.clone(),
            access_token: access_token.clone(),
            scope: scope.to_owned(),
        };
        stores.push(store.clone());

        Ok(store)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use secrecy::ExposeSecret;

    use super::*;

    fn hash(s: &str) -> StoreHash {
        StoreHash::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_creates_then_overwrites() {
        let repo = MemoryStoreRepository::new();

        let created = repo
            .upsert(&hash("abc123"), &SecretString::from("token-one"), "scope_a")
            .await
            .unwrap();
        assert_eq!(created.id, StoreId::new(1));

        let updated = repo
            .upsert(&hash("abc123"), &SecretString::from("token-two"), "scope_b")
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.access_token.expose_secret(), "token-two");
        assert_eq!(updated.scope, "scope_b");
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_distinct_hashes_get_distinct_ids() {
        let repo = MemoryStoreRepository::new();
        let token = SecretString::from("token");

        let a = repo.upsert(&hash("aaa"), &token, "s").await.unwrap();
        let b = repo.upsert(&hash("bbb"), &token, "s").await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(
            repo.get_by_id(b.id).await.unwrap().unwrap().store_hash,
            hash("bbb")
        );
        assert!(repo.get_by_store_hash(&hash("ccc")).await.unwrap().is_none());
        assert_eq!(repo.lookups(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_leave_one_record() {
        let repo = Arc::new(MemoryStoreRepository::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move {
                    repo.upsert(
                        &hash("race"),
                        &SecretString::from(format!("token-{i}")),
                        "scope",
                    )
                    .await
                    .unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().id, StoreId::new(1));
        }
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_upsert_rejects_oversized_token() {
        let repo = MemoryStoreRepository::new();
        let result = repo
            .upsert(&hash("abc"), &SecretString::from("t".repeat(200)), "s")
            .await;

        assert!(matches!(result, Err(RepositoryError::InvalidValue(_))));
        assert!(repo.is_empty().await);
    }
}

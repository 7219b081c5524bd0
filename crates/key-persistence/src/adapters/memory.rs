//! In-memory diagnosis key store.
//!
//! Keeps keys in insertion order and skips keys that are already stored.

use crate::domain::diagnosis_key::DiagnosisKey;
use crate::domain::errors::PersistenceError;
use crate::ports::DiagnosisKeyRepository;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Default)]
struct StoreInner {
    keys: Vec<DiagnosisKey>,
    index: HashSet<DiagnosisKey>,
}

/// Thread-safe in-memory implementation of `DiagnosisKeyRepository`.
#[derive(Default)]
pub struct InMemoryDiagnosisKeyStore {
    inner: RwLock<StoreInner>,
    capacity: Option<usize>,
}

impl InMemoryDiagnosisKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that refuses batches which would exceed `capacity` keys.
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            capacity: Some(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &DiagnosisKey) -> bool {
        self.inner.read().index.contains(key)
    }

    /// Snapshot of all stored keys in insertion order.
    pub fn all(&self) -> Vec<DiagnosisKey> {
        self.inner.read().keys.clone()
    }
}

#[async_trait]
impl DiagnosisKeyRepository for InMemoryDiagnosisKeyStore {
    async fn save_diagnosis_keys(&self, keys: Vec<DiagnosisKey>) -> Result<(), PersistenceError> {
        let mut inner = self.inner.write();

        // Count new keys first so a full store rejects the whole batch.
        let mut fresh: Vec<DiagnosisKey> = Vec::with_capacity(keys.len());
        let mut seen = HashSet::with_capacity(keys.len());
        for key in keys {
            if !inner.index.contains(&key) && seen.insert(key.clone()) {
                fresh.push(key);
            }
        }

        if let Some(capacity) = self.capacity {
            if inner.keys.len() + fresh.len() > capacity {
                warn!(
                    stored = inner.keys.len(),
                    capacity,
                    requested = fresh.len(),
                    "Rejecting diagnosis key batch, store is full"
                );
                return Err(PersistenceError::StorageFull {
                    stored: inner.keys.len(),
                    capacity,
                    requested: fresh.len(),
                });
            }
        }

        debug!(new_keys = fresh.len(), "Storing diagnosis keys");
        for key in fresh {
            inner.index.insert(key.clone());
            inner.keys.push(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::diagnosis_key::{EXPECTED_ROLLING_PERIOD, KEY_DATA_LENGTH};

    fn key(data: u8, start: i32) -> DiagnosisKey {
        DiagnosisKey::new(vec![data; KEY_DATA_LENGTH], start, EXPECTED_ROLLING_PERIOD, 3)
    }

    #[tokio::test]
    async fn test_stores_keys_in_order() {
        let store = InMemoryDiagnosisKeyStore::new();
        store
            .save_diagnosis_keys(vec![key(1, 10), key(2, 20)])
            .await
            .unwrap();

        assert_eq!(store.all(), vec![key(1, 10), key(2, 20)]);
    }

    #[tokio::test]
    async fn test_empty_batch_is_accepted() {
        let store = InMemoryDiagnosisKeyStore::new();
        store.save_diagnosis_keys(Vec::new()).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_resubmission_is_idempotent() {
        let store = InMemoryDiagnosisKeyStore::new();
        store.save_diagnosis_keys(vec![key(1, 10)]).await.unwrap();
        store
            .save_diagnosis_keys(vec![key(1, 10), key(1, 10), key(3, 30)])
            .await
            .unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.contains(&key(3, 30)));
    }

    #[tokio::test]
    async fn test_full_store_rejects_whole_batch() {
        let store = InMemoryDiagnosisKeyStore::with_capacity_limit(2);
        store.save_diagnosis_keys(vec![key(1, 10)]).await.unwrap();

        let result = store
            .save_diagnosis_keys(vec![key(2, 20), key(3, 30)])
            .await;

        assert!(matches!(
            result,
            Err(PersistenceError::StorageFull { stored: 1, capacity: 2, requested: 2 })
        ));
        assert_eq!(store.len(), 1);
        assert!(!store.contains(&key(2, 20)));
    }
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{Collection, RecordStore, StoreError};

/// In-process store keeping collections in a map.
///
/// Writes can be switched to fail so callers can exercise their error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, Vec<Value>>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with [`StoreError::Rejected`] (or
    /// succeed again with `false`).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current records of `collection`.
    pub async fn records(&self, collection: Collection) -> Vec<Value> {
        self.collections
            .lock()
            .await
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn replace_all(&self, collection: Collection, records: Vec<Value>) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected(collection));
        }
        let count = records.len();
        self.collections.lock().await.insert(collection, records);
        self.writes.fetch_add(1, Ordering::SeqCst);
        debug!(%collection, count, "Replaced in-memory collection");
        Ok(())
    }

    async fn load_all(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        Ok(self.records(collection).await)
    }
}

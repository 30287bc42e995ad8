//! In-process object store for local development and integration tests.
//!
//! Objects live in a map keyed by object key and vanish with the process.
//! [`MemoryStorage::set_available`] simulates an outage of the backing store.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::StorageError;
use crate::store::ObjectStore;

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct MemoryStorage {
    base_url: String,
    objects: RwLock<HashMap<String, StoredObject>>,
    available: AtomicBool,
}

impl MemoryStorage {
    /// An empty store whose object URLs start with `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    /// Stored keys in lexical order.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// While unavailable every put and delete fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStorage {
    fn object_url(&self, key: &str) -> String {
        format!("{}/{key}", self.base_url)
    }

    async fn put_file(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<String, StorageError> {
        if !self.is_available() {
            return Err(StorageError::Put {
                key: key.to_string(),
                message: "store unavailable".into(),
            });
        }
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| StorageError::Read(e.to_string()))?;
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        tracing::debug!(key, "Object stored in memory");
        Ok(self.object_url(key))
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        if !self.is_available() {
            return Err(StorageError::Delete {
                key: key.to_string(),
                message: "store unavailable".into(),
            });
        }
        self.objects.write().await.remove(key);
        Ok(())
    }
}

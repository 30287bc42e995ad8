//! The object store seam used by the upload handlers.

use std::path::Path;

use async_trait::async_trait;

use crate::StorageError;

/// Somewhere uploaded files are kept, addressed by object key.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Public URL of the object stored under `key`.
    fn object_url(&self, key: &str) -> String;

    /// Stream the file at `path` to `key` and return the object's URL.
    /// An existing object under `key` is replaced.
    async fn put_file(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Delete the object stored under `key`. Deleting a missing key succeeds.
    async fn delete_object(&self, key: &str) -> Result<(), StorageError>;
}

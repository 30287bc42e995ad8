//! Object storage for uploaded rating files.
//!
//! Upload handlers talk to an [`ObjectStore`]: [`S3Storage`] in production,
//! [`MemoryStorage`] for local runs and tests. Keys are built with
//! [`rms_core::storage_key::object_key`].

pub mod memory;
pub mod s3;
pub mod store;

pub use memory::{MemoryStorage, StoredObject};
pub use s3::{S3Config, S3Storage, StorageError};
pub use store::ObjectStore;

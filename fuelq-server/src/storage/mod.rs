//! Object storage access.
//!
//! Station images live in a folder tree `<CATEGORY>/<station>/<image>`.
//! The [`ObjectStore`] trait is the seam the station refresher uses; the
//! production implementation talks to the Firebase Storage REST API and
//! [`MemoryStore`] serves objects from memory.

mod client;
mod error;
mod memory;
mod types;

use std::future::Future;

pub use client::{FirebaseStorage, StorageConfig};
pub use error::StorageError;
pub use memory::MemoryStore;
pub use types::{ItemRef, ListResponse, ObjectMetadata, StorageObject};

/// Read access to hierarchical object storage.
pub trait ObjectStore: Send + Sync {
    /// Names of the immediate sub-folders of `folder`.
    fn list_folders(
        &self,
        folder: &str,
    ) -> impl Future<Output = Result<Vec<String>, StorageError>> + Send;

    /// Every file directly inside `folder`, in name order.
    fn list_files(
        &self,
        folder: &str,
    ) -> impl Future<Output = Result<Vec<StorageObject>, StorageError>> + Send;

    /// Metadata for the object at `path`.
    fn metadata(&self, path: &str)
    -> impl Future<Output = Result<ObjectMetadata, StorageError>> + Send;

    /// A URL the browser can fetch the object from.
    fn download_url(&self, path: &str) -> impl Future<Output = Result<String, StorageError>> + Send;
}

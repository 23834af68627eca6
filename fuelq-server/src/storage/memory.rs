//! In-memory object store.
//!
//! Serves a fixed set of objects as if they were in remote storage, with
//! switches to make individual paths fail. Used by the refresher tests and
//! handy for running the server without cloud credentials.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};

use super::ObjectStore;
use super::error::StorageError;
use super::types::{ObjectMetadata, StorageObject};

#[derive(Debug, Clone)]
struct MemoryObject {
    time_created: Option<DateTime<Utc>>,
    metadata: HashMap<String, String>,
}

/// Object store backed by a map of paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, MemoryObject>>,
    /// Folders (or object paths) whose requests fail.
    failing: Mutex<HashSet<String>>,
    metadata_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object uploaded at `time_created`.
    pub fn insert(&self, path: impl Into<String>, time_created: Option<DateTime<Utc>>) {
        self.insert_with_metadata(path, time_created, HashMap::new());
    }

    /// Add an object with custom metadata.
    pub fn insert_with_metadata(
        &self,
        path: impl Into<String>,
        time_created: Option<DateTime<Utc>>,
        metadata: HashMap<String, String>,
    ) {
        self.objects.lock().unwrap_or_else(|e| e.into_inner()).insert(
            path.into(),
            MemoryObject {
                time_created,
                metadata,
            },
        );
    }

    /// Make every request for `folder` (listing) or `path` (metadata) fail.
    pub fn fail(&self, folder_or_path: impl Into<String>) {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(folder_or_path.into().trim_matches('/').to_string());
    }

    /// How many metadata requests have been served.
    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    fn check(&self, key: &str) -> Result<(), StorageError> {
        let failing = self.failing.lock().unwrap_or_else(|e| e.into_inner());
        if failing.contains(key.trim_matches('/')) {
            return Err(StorageError::Api {
                status: 503,
                message: format!("injected failure for {key}"),
            });
        }
        Ok(())
    }

    /// Paths of objects under `folder`, with the folder prefix removed.
    fn relative_paths(&self, folder: &str) -> Vec<(String, String)> {
        let folder = folder.trim_matches('/');
        let prefix = if folder.is_empty() {
            String::new()
        } else {
            format!("{folder}/")
        };

        let objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        objects
            .keys()
            .filter_map(|path| {
                path.strip_prefix(&prefix)
                    .map(|rest| (path.clone(), rest.to_string()))
            })
            .collect()
    }
}

impl ObjectStore for MemoryStore {
    async fn list_folders(&self, folder: &str) -> Result<Vec<String>, StorageError> {
        self.check(folder)?;

        let folders: BTreeSet<String> = self
            .relative_paths(folder)
            .into_iter()
            .filter_map(|(_, rest)| rest.split_once('/').map(|(dir, _)| dir.to_string()))
            .collect();

        Ok(folders.into_iter().collect())
    }

    async fn list_files(&self, folder: &str) -> Result<Vec<StorageObject>, StorageError> {
        self.check(folder)?;

        Ok(self
            .relative_paths(folder)
            .into_iter()
            .filter(|(_, rest)| !rest.contains('/'))
            .map(|(path, _)| StorageObject::new(path))
            .collect())
    }

    async fn metadata(&self, path: &str) -> Result<ObjectMetadata, StorageError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.check(path)?;

        let objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        let object = objects.get(path).ok_or_else(|| StorageError::NotFound {
            path: path.to_string(),
        })?;

        Ok(ObjectMetadata {
            name: path.to_string(),
            time_created: object.time_created,
            download_tokens: Some("memory".to_string()),
            content_type: Some("image/jpeg".to_string()),
            metadata: object.metadata.clone(),
        })
    }

    async fn download_url(&self, path: &str) -> Result<String, StorageError> {
        let meta = self.metadata(path).await?;
        Ok(format!("memory://{}", meta.name))
    }
}

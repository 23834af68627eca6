//! Realtime key-value database access.
//!
//! Records are JSON values addressed by `/`-separated paths
//! (`UserDetails/jane@example_com`, `Reports/<push id>`).

mod client;
mod error;
mod memory;

use std::future::Future;

use serde_json::Value;

pub use client::{FirebaseDatabase, RealtimeConfig};
pub use error::RealtimeError;
pub use memory::MemoryDatabase;

/// Characters the database forbids inside a path segment.
const FORBIDDEN: [char; 5] = ['.', '#', '$', '[', ']'];

/// Path-addressed JSON records.
pub trait KeyValueStore: Send + Sync {
    /// Read the record at `path`; `None` when nothing is stored there.
    fn get(&self, path: &str) -> impl Future<Output = Result<Option<Value>, RealtimeError>> + Send;

    /// Replace the record at `path`.
    fn set(&self, path: &str, value: &Value) -> impl Future<Output = Result<(), RealtimeError>> + Send;

    /// Append a record under `path` with a generated key, returning the key.
    fn push(&self, path: &str, value: &Value) -> impl Future<Output = Result<String, RealtimeError>> + Send;
}

/// Check a record path and strip surrounding slashes.
pub(crate) fn validate_path(path: &str) -> Result<&str, RealtimeError> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() || trimmed.contains(FORBIDDEN) || trimmed.split('/').any(str::is_empty) {
        return Err(RealtimeError::InvalidPath {
            path: path.to_string(),
        });
    }
    Ok(trimmed)
}

/// Make an email usable as a path segment (`.` is not allowed in keys).
pub fn sanitize_key(s: &str) -> String {
    s.trim().replace('.', "_").replace(['#', '$', '[', ']', '/'], "_")
}

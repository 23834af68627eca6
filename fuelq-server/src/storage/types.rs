//! Object storage wire types.
//!
//! These mirror the JSON returned by the Firebase Storage REST API
//! (`/v0/b/{bucket}/o`).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Response to a list request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    /// Sub-folders, as full prefixes with a trailing slash (`EV/DYP/`).
    #[serde(default)]
    pub prefixes: Vec<String>,

    /// Objects directly under the listed prefix.
    #[serde(default)]
    pub items: Vec<ItemRef>,

    /// Present when more results are available.
    pub next_page_token: Option<String>,
}

/// An object reference in a list response.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemRef {
    /// Full object path.
    pub name: String,
}

/// Object metadata.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    /// Full object path.
    pub name: String,

    /// Upload time.
    pub time_created: Option<DateTime<Utc>>,

    /// Comma-separated tokens usable in public download URLs.
    pub download_tokens: Option<String>,

    pub content_type: Option<String>,

    /// Custom metadata set by the uploader.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ObjectMetadata {
    /// The first download token, if any.
    pub fn download_token(&self) -> Option<&str> {
        self.download_tokens
            .as_deref()
            .and_then(|t| t.split(',').map(str::trim).find(|t| !t.is_empty()))
    }

    /// A custom metadata value parsed as a float.
    pub fn custom_f64(&self, key: &str) -> Option<f64> {
        self.metadata.get(key)?.trim().parse().ok()
    }
}

/// A file in object storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageObject {
    /// Full object path, e.g. `EV/DYP/C3_08-00-00_01-01-2025.jpg`.
    pub path: String,

    /// Last path segment.
    pub name: String,
}

impl StorageObject {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = last_segment(&path).to_string();
        Self { path, name }
    }
}

/// Final non-empty `/`-separated segment of a path.
pub(crate) fn last_segment(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
}

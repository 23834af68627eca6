//! Firebase Storage REST client.

use std::sync::Arc;

use reqwest::Url;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;

use super::ObjectStore;
use super::error::StorageError;
use super::types::{ListResponse, ObjectMetadata, StorageObject, last_segment};

/// Default base URL for the Firebase Storage REST API.
const DEFAULT_BASE_URL: &str = "https://firebasestorage.googleapis.com/v0";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Largest page the list endpoint will return.
const MAX_PAGE_SIZE: usize = 1000;

/// Configuration for the storage client.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket name, e.g. `fuelq-864ff.appspot.com`
    pub bucket: String,
    /// Base URL for the API
    pub base_url: String,
    /// Optional ID token sent as `Authorization: Firebase <token>`
    pub auth_token: Option<String>,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl StorageConfig {
    /// Create a new config for the given bucket.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_token: None,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Authenticate requests with a user's ID token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }
}

/// Client for the Firebase Storage REST API.
///
/// A semaphore bounds the number of in-flight requests so a refresh that
/// fans out over many stations does not flood the service.
#[derive(Debug, Clone)]
pub struct FirebaseStorage {
    http: reqwest::Client,
    objects_url: Url,
    semaphore: Arc<Semaphore>,
}

impl FirebaseStorage {
    /// Create a new storage client.
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.auth_token {
            let value = HeaderValue::from_str(&format!("Firebase {token}")).map_err(|_| {
                StorageError::Api {
                    status: 0,
                    message: "Invalid auth token format".to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        let base = config.base_url.trim_end_matches('/');
        let objects_url = Url::parse(&format!("{base}/b/{}/o", config.bucket)).map_err(|e| {
            StorageError::InvalidUrl {
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            http,
            objects_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// URL addressing a single object (the path is one encoded segment).
    fn object_url(&self, path: &str) -> Result<Url, StorageError> {
        let mut url = self.objects_url.clone();
        url.path_segments_mut()
            .map_err(|_| StorageError::InvalidUrl {
                message: format!("base URL cannot hold object path {path}"),
            })?
            .push(path);
        Ok(url)
    }

    /// List one page under `prefix`.
    async fn list_page(
        &self,
        prefix: &str,
        max_results: usize,
        page_token: Option<&str>,
    ) -> Result<ListResponse, StorageError> {
        let mut url = self.objects_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("prefix", prefix)
                .append_pair("delimiter", "/")
                .append_pair("maxResults", &max_results.clamp(1, MAX_PAGE_SIZE).to_string());
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }

        self.get_json(url, prefix).await
    }

    /// GET a URL and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url, path: &str) -> Result<T, StorageError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| StorageError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(StorageError::Unauthorized);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound {
                path: path.to_string(),
            });
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(StorageError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| StorageError::Json {
            message: e.to_string(),
        })
    }
}

/// Normalise a folder path to the `a/b/` prefix form the API expects.
fn folder_prefix(folder: &str) -> String {
    let trimmed = folder.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

impl ObjectStore for FirebaseStorage {
    async fn list_folders(&self, folder: &str) -> Result<Vec<String>, StorageError> {
        let prefix = folder_prefix(folder);
        let mut folders = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .list_page(&prefix, MAX_PAGE_SIZE, page_token.as_deref())
                .await?;
            folders.extend(page.prefixes.iter().map(|p| last_segment(p).to_string()));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(folders)
    }

    async fn list_files(&self, folder: &str) -> Result<Vec<StorageObject>, StorageError> {
        let prefix = folder_prefix(folder);
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .list_page(&prefix, MAX_PAGE_SIZE, page_token.as_deref())
                .await?;
            files.extend(page.items.into_iter().map(|item| StorageObject::new(item.name)));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(files)
    }

    async fn metadata(&self, path: &str) -> Result<ObjectMetadata, StorageError> {
        let url = self.object_url(path)?;
        self.get_json(url, path).await
    }

    async fn download_url(&self, path: &str) -> Result<String, StorageError> {
        let meta = self.metadata(path).await?;
        let token = meta
            .download_token()
            .ok_or_else(|| StorageError::NoDownloadToken {
                path: path.to_string(),
            })?;

        let mut url = self.object_url(path)?;
        url.query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("token", token);
        Ok(url.to_string())
    }
}

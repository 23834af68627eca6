//! Object storage error types.

/// Errors that can occur when talking to object storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failed
    #[error("unauthorized: storage rules rejected the request")]
    Unauthorized,

    /// The object does not exist
    #[error("object not found: {path}")]
    NotFound { path: String },

    /// Rate limited by the storage service
    #[error("rate limited by object storage")]
    RateLimited,

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// The object has no download token, so no public URL can be built
    #[error("no download token for {path}")]
    NoDownloadToken { path: String },

    /// The configured base URL or object path could not form a URL
    #[error("invalid storage URL: {message}")]
    InvalidUrl { message: String },
}

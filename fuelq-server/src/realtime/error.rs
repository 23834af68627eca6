//! Realtime database error types.

/// Errors that can occur when reading or writing realtime database records.
#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Database rules rejected the request
    #[error("unauthorized: database rules rejected the request")]
    Unauthorized,

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// The record path contains characters the database forbids
    #[error("invalid record path: {path}")]
    InvalidPath { path: String },
}

//! Identity provider error types.

/// Errors from the identity provider.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Unknown email or wrong password
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Sign-up with an email that already has an account
    #[error("email already registered")]
    EmailExists,

    /// The account has been disabled by an administrator
    #[error("account disabled")]
    UserDisabled,

    /// The provider rejected the password as too weak
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// The ID token expired or is not valid
    #[error("session expired")]
    InvalidToken,

    /// Too many attempts from this client
    #[error("too many attempts, try again later")]
    RateLimited,

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json { message: String },
}

impl AuthError {
    /// Map an error code from an Identity Toolkit error body.
    ///
    /// Codes look like `EMAIL_EXISTS` or `WEAK_PASSWORD : Password should be
    /// at least 6 characters`.
    pub fn from_code(status: u16, message: &str) -> Self {
        let (code, detail) = match message.split_once(':') {
            Some((code, detail)) => (code.trim(), detail.trim()),
            None => (message.trim(), ""),
        };

        match code {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_EMAIL"
            | "MISSING_PASSWORD" => AuthError::InvalidCredentials,
            "EMAIL_EXISTS" => AuthError::EmailExists,
            "USER_DISABLED" => AuthError::UserDisabled,
            "WEAK_PASSWORD" => AuthError::WeakPassword(detail.to_string()),
            "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "USER_NOT_FOUND" => AuthError::InvalidToken,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::RateLimited,
            _ => AuthError::Api {
                status,
                message: message.to_string(),
            },
        }
    }
}

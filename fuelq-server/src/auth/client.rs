//! Identity Toolkit REST client.

use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::Authenticator;
use super::error::AuthError;
use super::types::{
    AccountInfo, ErrorResponse, LookupResponse, OobRequest, PasswordRequest, SignedIn, TokenRequest,
    UpdateRequest,
};

/// Default base URL for the Identity Toolkit API.
const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Configuration for the identity client.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Web API key of the Firebase project
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl AuthConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for the auth emulator).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// Client for Firebase Authentication password accounts.
#[derive(Debug, Clone)]
pub struct FirebaseAuth {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FirebaseAuth {
    /// Create a new identity client.
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    /// URL of an `accounts:<method>` endpoint.
    fn endpoint(&self, method: &str) -> Result<Url, AuthError> {
        Url::parse_with_params(
            &format!("{}/accounts:{method}", self.base_url),
            &[("key", self.api_key.as_str())],
        )
        .map_err(|e| AuthError::Api {
            status: 0,
            message: format!("invalid endpoint URL: {e}"),
        })
    }

    /// POST a JSON body and decode the JSON response.
    async fn call<B: Serialize, T: DeserializeOwned>(&self, method: &str, body: &B) -> Result<T, AuthError> {
        let response = self.http.post(self.endpoint(method)?).json(body).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AuthError::RateLimited);
        }

        let text = response.text().await?;

        if !status.is_success() {
            debug!(method, status = status.as_u16(), "identity request rejected");
            return Err(match serde_json::from_str::<ErrorResponse>(&text) {
                Ok(body) => AuthError::from_code(status.as_u16(), &body.error.message),
                Err(_) => AuthError::Api {
                    status: status.as_u16(),
                    message: text,
                },
            });
        }

        serde_json::from_str(&text).map_err(|e| AuthError::Json {
            message: e.to_string(),
        })
    }
}

impl Authenticator for FirebaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, AuthError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        self.call("signInWithPassword", &body).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignedIn, AuthError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        self.call("signUp", &body).await
    }

    async fn lookup(&self, id_token: &str) -> Result<AccountInfo, AuthError> {
        let response: LookupResponse = self.call("lookup", &TokenRequest { id_token }).await?;
        response
            .users
            .into_iter()
            .next()
            .ok_or(AuthError::InvalidToken)
    }

    async fn update_display_name(&self, id_token: &str, name: &str) -> Result<(), AuthError> {
        let body = UpdateRequest {
            id_token,
            display_name: name,
            return_secure_token: false,
        };
        let _: serde_json::Value = self.call("update", &body).await?;
        Ok(())
    }

    async fn send_verification(&self, id_token: &str) -> Result<(), AuthError> {
        let body = OobRequest {
            request_type: "VERIFY_EMAIL",
            id_token,
        };
        let _: serde_json::Value = self.call("sendOobCode", &body).await?;
        Ok(())
    }
}

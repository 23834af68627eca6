//! Firebase Realtime Database REST client.

use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;

use super::error::RealtimeError;
use super::{KeyValueStore, validate_path};

/// Configuration for the realtime database client.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Database URL, e.g. `https://fuelq-864ff-default-rtdb.firebaseio.com`
    pub database_url: String,
    /// Optional ID token passed as the `auth` query parameter
    pub auth_token: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl RealtimeConfig {
    /// Create a new config for the given database URL.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            auth_token: None,
            timeout_secs: 30,
        }
    }

    /// Authenticate requests with a user's ID token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

/// Response to a push (`POST`) request.
#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

/// Client for the Firebase Realtime Database REST API.
#[derive(Debug, Clone)]
pub struct FirebaseDatabase {
    http: reqwest::Client,
    database_url: String,
    auth_token: Option<String>,
}

impl FirebaseDatabase {
    /// Create a new database client.
    pub fn new(config: RealtimeConfig) -> Result<Self, RealtimeError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            database_url: config.database_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token,
        })
    }

    /// REST URL of a record.
    fn record_url(&self, path: &str) -> Result<String, RealtimeError> {
        let path = validate_path(path)?;
        Ok(format!("{}/{}.json", self.database_url, path))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, RealtimeError> {
        let mut request = self.http.request(method, self.record_url(path)?);
        if let Some(token) = &self.auth_token {
            request = request.query(&[("auth", token)]);
        }
        Ok(request)
    }

    /// Map error statuses and return the body of a successful response.
    async fn read_body(response: Response) -> Result<String, RealtimeError> {
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(RealtimeError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RealtimeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.text().await?)
    }
}

impl KeyValueStore for FirebaseDatabase {
    async fn get(&self, path: &str) -> Result<Option<Value>, RealtimeError> {
        let response = self.request(Method::GET, path)?.send().await?;
        let body = Self::read_body(response).await?;

        let value: Value = serde_json::from_str(&body).map_err(|e| RealtimeError::Json {
            message: e.to_string(),
        })?;

        Ok((!value.is_null()).then_some(value))
    }

    async fn set(&self, path: &str, value: &Value) -> Result<(), RealtimeError> {
        let response = self.request(Method::PUT, path)?.json(value).send().await?;
        Self::read_body(response).await?;
        Ok(())
    }

    async fn push(&self, path: &str, value: &Value) -> Result<String, RealtimeError> {
        let response = self.request(Method::POST, path)?.json(value).send().await?;
        let body = Self::read_body(response).await?;

        let pushed: PushResponse = serde_json::from_str(&body).map_err(|e| RealtimeError::Json {
            message: e.to_string(),
        })?;

        Ok(pushed.name)
    }
}

//! OpenRouteService directions client.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::domain::Coordinates;

use super::DistanceProvider;
use super::error::DirectionsError;

/// Default base URL for the directions API.
const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";

/// Routing profile used for station distances.
const DEFAULT_PROFILE: &str = "driving-car";

/// Configuration for the directions client.
#[derive(Debug, Clone)]
pub struct DirectionsConfig {
    /// API key sent in the `Authorization` header; empty disables lookups
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Routing profile (`driving-car`, `cycling-regular`, ...)
    pub profile: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl DirectionsConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            profile: DEFAULT_PROFILE.to_string(),
            timeout_secs: 10,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Request body: coordinates as `[longitude, latitude]` pairs.
#[derive(Debug, Serialize)]
struct DirectionsRequest {
    coordinates: [[f64; 2]; 2],
}

impl DirectionsRequest {
    fn new(origin: Coordinates, destination: Coordinates) -> Self {
        Self {
            coordinates: [
                [origin.longitude, origin.latitude],
                [destination.longitude, destination.latitude],
            ],
        }
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    summary: Option<Summary>,
    #[serde(default)]
    segments: Vec<Summary>,
}

#[derive(Debug, Deserialize)]
struct Summary {
    distance: Option<f64>,
}

impl DirectionsResponse {
    /// Distance of the first route: its first segment, else its summary.
    fn distance_meters(&self) -> Option<f64> {
        let route = self.routes.first()?;
        route
            .segments
            .first()
            .and_then(|s| s.distance)
            .or_else(|| route.summary.as_ref().and_then(|s| s.distance))
    }
}

/// Client for the OpenRouteService directions API.
#[derive(Debug, Clone)]
pub struct OpenRouteService {
    http: reqwest::Client,
    url: String,
    enabled: bool,
}

impl OpenRouteService {
    /// Create a new directions client.
    pub fn new(config: DirectionsConfig) -> Result<Self, DirectionsError> {
        let mut headers = HeaderMap::new();
        let enabled = !config.api_key.trim().is_empty();

        if enabled {
            let key = HeaderValue::from_str(config.api_key.trim()).map_err(|_| {
                DirectionsError::Api {
                    status: 0,
                    message: "Invalid API key format".to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, key);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: format!(
                "{}/v2/directions/{}",
                config.base_url.trim_end_matches('/'),
                config.profile
            ),
            enabled,
        })
    }

    /// Whether an API key was configured.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl DistanceProvider for OpenRouteService {
    async fn road_distance_meters(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<f64, DirectionsError> {
        if !self.enabled {
            return Err(DirectionsError::NotConfigured(
                "no directions API key".to_string(),
            ));
        }

        let response = self
            .http
            .post(&self.url)
            .json(&DirectionsRequest::new(origin, destination))
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(DirectionsError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DirectionsError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectionsError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let parsed: DirectionsResponse =
            serde_json::from_str(&body).map_err(|e| DirectionsError::Json {
                message: e.to_string(),
            })?;

        parsed.distance_meters().ok_or(DirectionsError::NoRoute)
    }
}

//! Data transfer objects for web requests and responses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Category, Coordinates, Distance, LatestImage, Station, WaitTime};

/// Query for a station list refresh.
#[derive(Debug, Default, Deserialize)]
pub struct StationsQuery {
    /// `EV`, `CNG` or `PETROL` (defaults to `EV`)
    pub category: Option<String>,

    /// Name filter
    pub q: Option<String>,

    /// User latitude, for distances
    pub lat: Option<f64>,

    /// User longitude, for distances
    pub lon: Option<f64>,
}

/// Query naming a category and optional name filter.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

/// Login form.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Profile form.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    #[serde(default)]
    pub name: String,
}

/// Report form.
#[derive(Debug, Default, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
}

/// Outcome of an account action.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub message: String,

    /// Page the client should go to next
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Submitted report.
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub message: &'static str,
    pub id: String,
}

/// A station in list and detail responses.
#[derive(Debug, Serialize)]
pub struct StationResult {
    /// Storage path, e.g. `EV/DYP`
    pub id: String,

    pub name: String,

    pub category: Category,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    /// Minutes, or `"N/A"`
    pub wait: WaitTime,

    /// Wait as displayed, e.g. `"20 mins"`
    pub wait_text: String,

    /// Kilometres, or `"N/A"`
    pub distance: Distance,

    /// Distance as displayed, e.g. `"4.87 km"`
    pub distance_text: String,

    /// Image the wait was derived from
    pub latest: Option<LatestImage>,
}

impl StationResult {
    /// Create from a domain Station.
    pub fn from_station(station: &Station) -> Self {
        Self {
            id: station.id.clone(),
            name: station.name.clone(),
            category: station.category,
            latitude: station.location.map(|c| c.latitude),
            longitude: station.location.map(|c| c.longitude),
            wait: station.wait,
            wait_text: station.wait.to_string(),
            distance: station.distance,
            distance_text: station.distance.to_string(),
            latest: station.latest.clone(),
        }
    }
}

/// Station list for one category.
#[derive(Debug, Serialize)]
pub struct StationListResponse {
    pub category: Category,
    pub query: String,

    /// When the list was published; `None` if the category was never
    /// refreshed
    pub refreshed_at: Option<DateTime<Utc>>,

    pub stations: Vec<StationResult>,
}

/// Result of dropping a cached scan.
#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub category: Category,
    pub invalidated: bool,
}

/// A station with its latest image.
#[derive(Debug, Serialize)]
pub struct StationDetailResponse {
    pub station: StationResult,

    /// Download URL of the latest image
    pub image_url: Option<String>,
}

/// A station on the map.
#[derive(Debug, Serialize)]
pub struct MarkerResult {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub wait_text: String,
    pub distance_text: String,
}

impl MarkerResult {
    /// A marker for a station, if it has a position.
    pub fn from_station(station: &Station) -> Option<Self> {
        let location = station.location?;
        Some(Self {
            id: station.id.clone(),
            name: station.name.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            wait_text: station.wait.to_string(),
            distance_text: station.distance.to_string(),
        })
    }
}

/// Map markers for one category.
#[derive(Debug, Serialize)]
pub struct MapResponse {
    pub category: Category,
    pub center: Coordinates,
    pub markers: Vec<MarkerResult>,
}

/// Submitted form fields echoed back so the form can be re-filled.
pub type FormFields = BTreeMap<&'static str, String>;

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: FormFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_result_texts() {
        let mut station = Station::unknown(Category::Cng, "HP");
        station.wait = WaitTime::Minutes(9.0);
        station.location = Coordinates::new(16.7, 74.2);

        let result = StationResult::from_station(&station);
        assert_eq!(result.id, "CNG/HP");
        assert_eq!(result.wait_text, "9 mins");
        assert_eq!(result.distance_text, "N/A");
        assert_eq!(result.latitude, Some(16.7));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["category"], "CNG");
        assert_eq!(json["wait"], 9.0);
        assert_eq!(json["distance"], "N/A");
    }

    #[test]
    fn marker_needs_location() {
        let station = Station::unknown(Category::Ev, "DYP");
        assert!(MarkerResult::from_station(&station).is_none());
    }

    #[test]
    fn error_response_hides_empty_fields() {
        let body = ErrorResponse {
            error: "nope".into(),
            fields: FormFields::new(),
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"error":"nope"}"#);
    }
}

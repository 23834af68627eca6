//! Coordinates and distances.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use super::wait::NOT_AVAILABLE;

/// Mean Earth radius used by the great-circle estimate.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Create coordinates, rejecting values outside the valid ranges.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            latitude,
            longitude,
        })
    }

    /// Parse a `"lat,lon"` pair.
    pub fn parse_pair(s: &str) -> Option<Self> {
        let (lat, lon) = s.split_once(',')?;
        Self::new(lat.trim().parse().ok()?, lon.trim().parse().ok()?)
    }

    /// Great-circle distance to `other` in kilometres (haversine formula).
    pub fn haversine_km(&self, other: &Coordinates) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }
}

/// Distance from the user to a station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distance {
    /// Kilometres, rounded to two decimals.
    Km(f64),
    /// No distance (no user location, no station location, or lookup failed).
    NotAvailable,
}

impl Distance {
    /// Build a distance from metres, rounding to two decimal places of km.
    pub fn from_meters(meters: f64) -> Self {
        Distance::from_km(meters / 1000.0)
    }

    /// Build a distance from kilometres, rounding to two decimal places.
    pub fn from_km(km: f64) -> Self {
        if !km.is_finite() || km < 0.0 {
            return Distance::NotAvailable;
        }
        Distance::Km((km * 100.0).round() / 100.0)
    }

    pub fn km(&self) -> Option<f64> {
        match self {
            Distance::Km(km) => Some(*km),
            Distance::NotAvailable => None,
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Km(km) => write!(f, "{km:.2} km"),
            Distance::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

/// Serialised as a number of kilometres, or `"N/A"`.
impl Serialize for Distance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Distance::Km(km) => serializer.serialize_f64(*km),
            Distance::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

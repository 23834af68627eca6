//! Wait time estimation.

use std::fmt;

use serde::{Serialize, Serializer};

use super::category::Category;

/// Text shown wherever a value could not be determined.
pub const NOT_AVAILABLE: &str = "N/A";

/// Estimated queueing time at a station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaitTime {
    /// Estimated minutes of queueing.
    Minutes(f64),
    /// No estimate (unknown category, or no usable image).
    NotAvailable,
}

impl WaitTime {
    /// Minutes of queueing, if known.
    pub fn minutes(&self) -> Option<f64> {
        match self {
            WaitTime::Minutes(m) => Some(*m),
            WaitTime::NotAvailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, WaitTime::Minutes(_))
    }
}

impl fmt::Display for WaitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitTime::Minutes(m) => write!(f, "{m} mins"),
            WaitTime::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

/// Serialised as a number of minutes, or `"N/A"`.
impl Serialize for WaitTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WaitTime::Minutes(m) => serializer.serialize_f64(*m),
            WaitTime::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// Estimate the wait for `vehicle_count` queued vehicles at a station of
/// the given category.
pub fn estimate(vehicle_count: u32, category: Category) -> WaitTime {
    WaitTime::Minutes(f64::from(vehicle_count) * category.minutes_per_vehicle())
}

/// Estimate from an unparsed category name; unknown names give `N/A`.
pub fn estimate_named(vehicle_count: u32, category: &str) -> WaitTime {
    match Category::parse(category) {
        Ok(category) => estimate(vehicle_count, category),
        Err(_) => WaitTime::NotAvailable,
    }
}

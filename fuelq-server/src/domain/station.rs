//! Station snapshots.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::category::Category;
use super::distance::{Coordinates, Distance};
use super::wait::WaitTime;

/// The image a station's wait time was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestImage {
    /// Full storage path of the image.
    pub path: String,

    /// File name within the station folder.
    pub filename: String,

    /// Vehicles counted in the image.
    pub vehicle_count: u32,

    /// When the image was captured.
    pub captured_at: DateTime<Utc>,
}

/// A station as shown in the station list.
///
/// Stations are rebuilt from object storage on every refresh and are never
/// persisted by this program.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    /// Storage path of the station folder, e.g. `EV/DYP`.
    pub id: String,

    /// Display name (the folder name).
    pub name: String,

    pub category: Category,

    /// Station position, when the latest image carries one.
    pub location: Option<Coordinates>,

    pub wait: WaitTime,

    pub distance: Distance,

    /// Image the wait time was derived from.
    pub latest: Option<LatestImage>,
}

impl Station {
    /// A station with nothing known beyond its folder.
    pub fn unknown(category: Category, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: format!("{}/{}", category.folder(), name),
            name,
            category,
            location: None,
            wait: WaitTime::NotAvailable,
            distance: Distance::NotAvailable,
            latest: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_station() {
        let s = Station::unknown(Category::Cng, "STATION1");
        assert_eq!(s.id, "CNG/STATION1");
        assert_eq!(s.name, "STATION1");
        assert_eq!(s.wait, WaitTime::NotAvailable);
        assert_eq!(s.distance, Distance::NotAvailable);
        assert!(s.location.is_none());
        assert!(s.latest.is_none());
    }

    #[test]
    fn serializes_not_available_fields() {
        let s = Station::unknown(Category::Ev, "DYP");
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["category"], "EV");
        assert_eq!(json["wait"], "N/A");
        assert_eq!(json["distance"], "N/A");
        assert!(json["latest"].is_null());
    }
}

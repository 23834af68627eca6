//! Station refresh: object storage scan plus road distances.
//!
//! A refresh of one category works in two phases:
//!
//! 1. **Scan.** List the station folders under the category, then for each
//!    station (concurrently) list its images, fetch their metadata, pick
//!    the most recently captured one and derive the wait time from its
//!    filename. A station whose folder cannot be read gets an `N/A` wait;
//!    only a failure to list the category itself aborts the refresh.
//! 2. **Distances.** When the user's position is known, ask the directions
//!    service for the road distance to every station that has a position.
//!    A failed lookup falls back per [`DistanceFallback`] and never touches
//!    the wait time.
//!
//! The scan depends only on storage, so it can be cached and shared; the
//! distances depend on who is asking.

use chrono::{DateTime, Utc};
use futures::future::{join_all, try_join_all};
use tracing::{debug, warn};

use crate::directions::DistanceProvider;
use crate::domain::{
    Category, Coordinates, Distance, ImageName, LatestImage, Station, estimate,
};
use crate::storage::{ObjectMetadata, ObjectStore, StorageError, StorageObject};

use super::config::{DistanceFallback, RefreshConfig};
use super::error::RefreshError;

/// Custom metadata keys carrying a station's position.
const LATITUDE_KEY: &str = "latitude";
const LONGITUDE_KEY: &str = "longitude";

/// The newest image in a station folder.
#[derive(Debug, Clone)]
pub struct Newest {
    pub object: StorageObject,
    pub metadata: ObjectMetadata,
    pub captured_at: DateTime<Utc>,
}

/// Builds station lists from object storage and the directions service.
pub struct StationRefresher<S, D> {
    storage: S,
    directions: D,
    config: RefreshConfig,
}

impl<S: ObjectStore, D: DistanceProvider> StationRefresher<S, D> {
    pub fn new(storage: S, directions: D, config: RefreshConfig) -> Self {
        Self {
            storage,
            directions,
            config,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn directions(&self) -> &D {
        &self.directions
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// Scan and measure in one go.
    pub async fn refresh(
        &self,
        category: Category,
        origin: Option<Coordinates>,
    ) -> Result<Vec<Station>, RefreshError> {
        let scanned = self.scan_category(category).await?;
        Ok(self.attach_distances(&scanned, origin).await)
    }

    /// Build every station of a category from storage.
    ///
    /// Stations come back in folder listing order. Distances are left `N/A`.
    pub async fn scan_category(&self, category: Category) -> Result<Vec<Station>, RefreshError> {
        let folders = self
            .storage
            .list_folders(category.folder())
            .await
            .map_err(|source| RefreshError::Listing { category, source })?;

        debug!(%category, stations = folders.len(), "scanning station folders");

        let scans: Vec<_> = folders
            .iter()
            .map(|name| self.scan_station(category, name))
            .collect();

        Ok(join_all(scans).await)
    }

    /// Build one station from its folder. Never fails: storage errors give
    /// an `N/A` wait.
    pub async fn scan_station(&self, category: Category, name: &str) -> Station {
        let mut station = Station::unknown(category, name);
        let newest = self.newest_image(&station.id).await;

        match newest {
            Ok(Some(newest)) => {
                let parsed = ImageName::parse(&newest.object.name);
                station.wait = estimate(parsed.vehicle_count, category);
                station.location = station_location(&newest.metadata);
                station.latest = Some(LatestImage {
                    path: newest.object.path,
                    filename: newest.object.name,
                    vehicle_count: parsed.vehicle_count,
                    captured_at: newest.captured_at,
                });
            }
            Ok(None) => {
                debug!(station = %station.id, "no dated images in station folder");
            }
            Err(e) => {
                warn!(station = %station.id, error = %e, "failed to read station folder");
            }
        }

        station
    }

    /// Find the most recently captured image in a station folder.
    ///
    /// Every file is listed, but metadata is fetched only for the
    /// `max_files_per_station` newest by filename instant. Returns `None`
    /// when the folder is empty or no image has a capture time.
    pub async fn newest_image(&self, folder: &str) -> Result<Option<Newest>, StorageError> {
        let files = newest_by_name(
            self.storage.list_files(folder).await?,
            self.config.max_files_per_station,
        );

        let lookups: Vec<_> = files
            .into_iter()
            .map(|object| async move {
                let metadata = self.storage.metadata(&object.path).await?;
                Ok::<_, StorageError>((object, metadata))
            })
            .collect();

        let described = try_join_all(lookups).await?;

        let mut dated: Vec<Newest> = described
            .into_iter()
            .filter_map(|(object, metadata)| {
                let captured_at = capture_time(&object, &metadata)?;
                Some(Newest {
                    object,
                    metadata,
                    captured_at,
                })
            })
            .collect();

        dated.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));
        Ok(dated.into_iter().next())
    }

    /// Copy stations, filling in the distance from `origin` where possible.
    pub async fn attach_distances(
        &self,
        stations: &[Station],
        origin: Option<Coordinates>,
    ) -> Vec<Station> {
        let lookups: Vec<_> = stations
            .iter()
            .cloned()
            .map(|mut station| async move {
                if let (Some(origin), Some(location)) = (origin, station.location) {
                    station.distance = self.distance(&station.id, origin, location).await;
                }
                station
            })
            .collect();

        join_all(lookups).await
    }

    async fn distance(&self, id: &str, origin: Coordinates, destination: Coordinates) -> Distance {
        match self
            .directions
            .road_distance_meters(origin, destination)
            .await
        {
            Ok(meters) => Distance::from_meters(meters),
            Err(e) => {
                warn!(station = %id, error = %e, "road distance lookup failed");
                match self.config.distance_fallback {
                    DistanceFallback::NotAvailable => Distance::NotAvailable,
                    DistanceFallback::Haversine => Distance::from_km(origin.haversine_km(&destination)),
                }
            }
        }
    }
}

/// The `limit` files whose names carry the latest instants. Files without
/// one sort after every dated file.
fn newest_by_name(files: Vec<StorageObject>, limit: usize) -> Vec<StorageObject> {
    let mut keyed: Vec<_> = files
        .into_iter()
        .map(|object| (ImageName::parse(&object.name).captured_at, object))
        .collect();

    // `None` orders below every `Some`, so descending puts undated files last.
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    keyed.truncate(limit);
    keyed.into_iter().map(|(_, object)| object).collect()
}

/// Upload time from metadata, else the instant encoded in the filename.
fn capture_time(object: &StorageObject, metadata: &ObjectMetadata) -> Option<DateTime<Utc>> {
    metadata.time_created.or_else(|| {
        ImageName::parse(&object.name)
            .captured_at
            .map(|naive| naive.and_utc())
    })
}

/// Station position from the image's custom metadata.
fn station_location(metadata: &ObjectMetadata) -> Option<Coordinates> {
    Coordinates::new(
        metadata.custom_f64(LATITUDE_KEY)?,
        metadata.custom_f64(LONGITUDE_KEY)?,
    )
}

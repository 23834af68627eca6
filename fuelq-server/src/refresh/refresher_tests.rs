//! Scenario tests for station refresh.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, TimeZone, Utc};

use super::*;
use crate::cache::{CacheConfig, CachedRefresher};
use crate::directions::{DirectionsError, DistanceProvider};
use crate::domain::{Category, Coordinates, Distance, WaitTime};
use crate::storage::MemoryStore;

fn at(h: u32, m: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2025, 3, 15, h, m, 0).single()
}

fn located(lat: f64, lon: f64) -> HashMap<String, String> {
    HashMap::from([
        ("latitude".to_string(), lat.to_string()),
        ("longitude".to_string(), lon.to_string()),
    ])
}

fn user() -> Option<Coordinates> {
    Coordinates::new(16.7320901, 74.237955)
}

/// Directions fake with a fixed answer.
struct FakeDirections {
    meters: Option<f64>,
    calls: AtomicUsize,
    /// Board whose category gets re-refreshed during every lookup.
    interrupt: Option<(Arc<StationBoard>, Category)>,
}

impl FakeDirections {
    fn answering(meters: f64) -> Self {
        Self {
            meters: Some(meters),
            calls: AtomicUsize::new(0),
            interrupt: None,
        }
    }

    fn failing() -> Self {
        Self {
            meters: None,
            calls: AtomicUsize::new(0),
            interrupt: None,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DistanceProvider for FakeDirections {
    async fn road_distance_meters(
        &self,
        _origin: Coordinates,
        _destination: Coordinates,
    ) -> Result<f64, DirectionsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some((board, category)) = &self.interrupt {
            board.begin(*category);
        }
        self.meters.ok_or(DirectionsError::RateLimited)
    }
}

fn refresher(
    store: MemoryStore,
    directions: FakeDirections,
) -> StationRefresher<MemoryStore, FakeDirections> {
    StationRefresher::new(store, directions, RefreshConfig::default())
}

/// Three EV stations: two images at DYP, one at KOP, and an empty folder.
fn ev_store() -> MemoryStore {
    let store = MemoryStore::new();
    // Listed first (lexicographic) but captured later.
    store.insert_with_metadata(
        "EV/DYP/C2_10-30-00_15-03-2025.jpg",
        at(10, 30),
        located(16.70, 74.24),
    );
    store.insert_with_metadata(
        "EV/DYP/C9_08-00-00_15-03-2025.jpg",
        at(8, 0),
        located(16.70, 74.24),
    );
    store.insert("EV/KOP/C1_09-00-00_15-03-2025.jpg", at(9, 0));
    // Only a nested folder, so no images directly inside.
    store.insert("EV/EMPTY/archive/C4_09-00-00_01-01-2024.jpg", at(9, 0));
    store
}

#[tokio::test]
async fn latest_image_decides_wait() {
    let refresher = refresher(ev_store(), FakeDirections::failing());
    let stations = refresher.scan_category(Category::Ev).await.unwrap();

    let dyp = stations.iter().find(|s| s.name == "DYP").unwrap();
    assert_eq!(dyp.wait, WaitTime::Minutes(20.0));

    let latest = dyp.latest.as_ref().unwrap();
    assert_eq!(latest.filename, "C2_10-30-00_15-03-2025.jpg");
    assert_eq!(latest.vehicle_count, 2);
    assert_eq!(Some(latest.captured_at), at(10, 30));
}

#[tokio::test]
async fn empty_folder_is_not_available() {
    let refresher = refresher(ev_store(), FakeDirections::failing());
    let stations = refresher.scan_category(Category::Ev).await.unwrap();

    let names: Vec<&str> = stations.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["DYP", "EMPTY", "KOP"]);

    let empty = &stations[1];
    assert_eq!(empty.wait, WaitTime::NotAvailable);
    assert!(empty.latest.is_none());

    assert_eq!(stations[2].wait, WaitTime::Minutes(10.0));
}

#[tokio::test]
async fn station_failure_is_isolated() {
    let store = ev_store();
    store.fail("EV/DYP");
    let refresher = refresher(store, FakeDirections::failing());

    let stations = refresher.scan_category(Category::Ev).await.unwrap();
    assert_eq!(stations.len(), 3);
    assert_eq!(stations[0].wait, WaitTime::NotAvailable);
    assert_eq!(stations[2].wait, WaitTime::Minutes(10.0));
}

#[tokio::test]
async fn metadata_failure_is_isolated() {
    let store = ev_store();
    store.fail("EV/DYP/C9_08-00-00_15-03-2025.jpg");
    let refresher = refresher(store, FakeDirections::failing());

    let stations = refresher.scan_category(Category::Ev).await.unwrap();
    assert_eq!(stations[0].wait, WaitTime::NotAvailable);
    assert_eq!(stations[2].wait, WaitTime::Minutes(10.0));
}

#[tokio::test]
async fn category_listing_failure_aborts() {
    let store = ev_store();
    store.fail("EV");
    let refresher = refresher(store, FakeDirections::failing());

    let result = refresher.scan_category(Category::Ev).await;
    assert!(matches!(
        result,
        Err(RefreshError::Listing {
            category: Category::Ev,
            ..
        })
    ));
}

#[tokio::test]
async fn unknown_category_folder_is_empty() {
    let refresher = refresher(ev_store(), FakeDirections::failing());
    let stations = refresher.scan_category(Category::Cng).await.unwrap();
    assert!(stations.is_empty());
}

#[tokio::test]
async fn undated_images_are_ignored() {
    let store = MemoryStore::new();
    store.insert("PETROL/HP/photo.jpg", None);
    store.insert("PETROL/HP/C6_07-00-00_15-03-2025.jpg", None);
    let refresher = refresher(store, FakeDirections::failing());

    let stations = refresher.scan_category(Category::Petrol).await.unwrap();
    // Only the filename-dated image qualifies.
    assert_eq!(stations[0].wait, WaitTime::Minutes(3.0));
    assert_eq!(
        stations[0].latest.as_ref().unwrap().filename,
        "C6_07-00-00_15-03-2025.jpg"
    );
}

#[tokio::test]
async fn files_scanned_per_station_are_capped() {
    let store = MemoryStore::new();
    for minute in 0..5 {
        store.insert(
            format!("CNG/STATION1/C{minute}_10-{minute:02}-00_15-03-2025.jpg"),
            at(10, minute),
        );
    }
    let refresher = StationRefresher::new(
        store,
        FakeDirections::failing(),
        RefreshConfig::new(2, DistanceFallback::NotAvailable),
    );

    let stations = refresher.scan_category(Category::Cng).await.unwrap();
    assert_eq!(refresher.storage().metadata_calls(), 2);

    // Name order follows the count, so the cap must not pick by listing order.
    let latest = stations[0].latest.as_ref().unwrap();
    assert_eq!(latest.filename, "C4_10-04-00_15-03-2025.jpg");
    assert_eq!(stations[0].wait, WaitTime::Minutes(12.0));
}

#[tokio::test]
async fn newest_image_found_beyond_cap_in_name_order() {
    let store = MemoryStore::new();
    for n in 1..=5u32 {
        store.insert(
            format!("CNG/STATION1/C{n}_10-0{}-00_15-03-2025.jpg", n - 1),
            at(10, n - 1),
        );
    }
    // Large count, early capture: first in name order, never the newest.
    store.insert("CNG/STATION1/C9_09-00-00_15-03-2025.jpg", at(9, 0));
    let refresher = StationRefresher::new(
        store,
        FakeDirections::failing(),
        RefreshConfig::new(2, DistanceFallback::NotAvailable),
    );

    let stations = refresher.scan_category(Category::Cng).await.unwrap();
    let latest = stations[0].latest.as_ref().unwrap();
    assert_eq!(latest.filename, "C5_10-04-00_15-03-2025.jpg");
    assert_eq!(stations[0].wait, WaitTime::Minutes(15.0));
}

#[tokio::test]
async fn distances_from_directions() {
    let refresher = refresher(ev_store(), FakeDirections::answering(4870.3));
    let stations = refresher.refresh(Category::Ev, user()).await.unwrap();

    // Only DYP has a position.
    assert_eq!(stations[0].distance, Distance::Km(4.87));
    assert_eq!(stations[1].distance, Distance::NotAvailable);
    assert_eq!(stations[2].distance, Distance::NotAvailable);
}

#[tokio::test]
async fn no_user_position_skips_directions() {
    let refresher = refresher(ev_store(), FakeDirections::answering(1000.0));
    let stations = refresher.refresh(Category::Ev, None).await.unwrap();

    assert!(stations.iter().all(|s| s.distance == Distance::NotAvailable));
    assert_eq!(stations[0].wait, WaitTime::Minutes(20.0));
    assert_eq!(refresher.directions().calls(), 0);
}

#[tokio::test]
async fn directions_failure_keeps_wait() {
    let refresher = refresher(ev_store(), FakeDirections::failing());
    let stations = refresher.refresh(Category::Ev, user()).await.unwrap();

    assert_eq!(stations[0].distance, Distance::NotAvailable);
    assert_eq!(stations[0].wait, WaitTime::Minutes(20.0));
}

#[tokio::test]
async fn haversine_fallback() {
    let refresher = StationRefresher::new(
        ev_store(),
        FakeDirections::failing(),
        RefreshConfig::new(50, DistanceFallback::Haversine),
    );
    let stations = refresher.refresh(Category::Ev, user()).await.unwrap();

    let km = stations[0].distance.km().unwrap();
    let expected = user()
        .unwrap()
        .haversine_km(&Coordinates::new(16.70, 74.24).unwrap());
    assert!((km - expected).abs() < 0.01);
}

#[tokio::test]
async fn board_publishes_refresh() {
    let board = StationBoard::new();
    let cached = CachedRefresher::new(
        refresher(ev_store(), FakeDirections::answering(2000.0)),
        &CacheConfig::default(),
    );

    let published = board.refresh(&cached, Category::Ev, user()).await.unwrap();
    assert_eq!(published.stations[0].distance, Distance::Km(2.0));

    let current = board.current(Category::Ev).await.unwrap();
    assert_eq!(current.stations, published.stations);
    assert_eq!(current.refreshed_at, published.refreshed_at);
}

#[tokio::test]
async fn superseded_refresh_is_not_published() {
    let board = Arc::new(StationBoard::new());
    let mut directions = FakeDirections::answering(2000.0);
    directions.interrupt = Some((board.clone(), Category::Ev));
    let cached = CachedRefresher::new(refresher(ev_store(), directions), &CacheConfig::default());

    let result = board.refresh(&cached, Category::Ev, user()).await;
    assert!(matches!(result, Err(RefreshError::Superseded { .. })));
    assert!(board.current(Category::Ev).await.is_none());
    assert_eq!(cached.refresher().directions().calls(), 1);
}

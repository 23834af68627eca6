//! Caching layer for storage scans.
//!
//! A category scan costs one listing per station plus one metadata fetch
//! per image, so repeated refreshes within a few seconds (a user flicking
//! between categories) are served from cache. Only the scan is cached:
//! distances depend on the user's position and are computed per request.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::directions::DistanceProvider;
use crate::domain::{Category, Coordinates, Station};
use crate::refresh::{RefreshError, StationRefresher};
use crate::storage::ObjectStore;

/// Cached scan entry.
type ScanEntry = Arc<Vec<Station>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl CacheConfig {
    /// Set a custom TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            max_capacity: 16,
        }
    }
}

/// Station refresher with a cache of category scans.
pub struct CachedRefresher<S, D> {
    refresher: StationRefresher<S, D>,
    scans: MokaCache<Category, ScanEntry>,
}

impl<S: ObjectStore, D: DistanceProvider> CachedRefresher<S, D> {
    /// Create a new cached refresher.
    pub fn new(refresher: StationRefresher<S, D>, config: &CacheConfig) -> Self {
        let scans = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { refresher, scans }
    }

    /// Scan a category, using the cache if available.
    pub async fn scan_category(&self, category: Category) -> Result<ScanEntry, RefreshError> {
        if let Some(cached) = self.scans.get(&category).await {
            debug!(%category, "scan served from cache");
            return Ok(cached);
        }

        let entry = Arc::new(self.refresher.scan_category(category).await?);
        self.scans.insert(category, entry.clone()).await;

        Ok(entry)
    }

    /// Fill in distances from `origin`. Never cached.
    pub async fn attach_distances(
        &self,
        stations: &[Station],
        origin: Option<Coordinates>,
    ) -> Vec<Station> {
        self.refresher.attach_distances(stations, origin).await
    }

    /// Access the underlying refresher for operations that bypass cache.
    pub fn refresher(&self) -> &StationRefresher<S, D> {
        &self.refresher
    }

    /// Drop the cached scan of one category.
    pub async fn invalidate(&self, category: Category) {
        self.scans.invalidate(&category).await;
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.scans.invalidate_all();
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.scans.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directions::DirectionsError;
    use crate::refresh::RefreshConfig;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};

    struct NoDirections;

    impl DistanceProvider for NoDirections {
        async fn road_distance_meters(
            &self,
            _origin: Coordinates,
            _destination: Coordinates,
        ) -> Result<f64, DirectionsError> {
            Err(DirectionsError::NoRoute)
        }
    }

    fn cached(store: MemoryStore) -> CachedRefresher<MemoryStore, NoDirections> {
        let refresher = StationRefresher::new(store, NoDirections, RefreshConfig::default());
        CachedRefresher::new(refresher, &CacheConfig::default())
    }

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert(
            "EV/DYP/C2_09-00-00_01-01-2025.jpg",
            Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).single(),
        );
        store
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(30));
        assert_eq!(config.max_capacity, 16);
    }

    #[tokio::test]
    async fn second_scan_hits_cache() {
        let cached = cached(store());

        let first = cached.scan_category(Category::Ev).await.unwrap();
        let calls = cached.refresher().storage().metadata_calls();
        let second = cached.scan_category(Category::Ev).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cached.refresher().storage().metadata_calls(), calls);
    }

    #[tokio::test]
    async fn invalidate_forces_rescan() {
        let cached = cached(store());

        cached.scan_category(Category::Ev).await.unwrap();
        let calls = cached.refresher().storage().metadata_calls();

        cached.invalidate(Category::Ev).await;
        cached.scan_category(Category::Ev).await.unwrap();

        assert!(cached.refresher().storage().metadata_calls() > calls);
    }

    #[tokio::test]
    async fn failed_scan_is_not_cached() {
        let store = store();
        store.fail("PETROL");
        let cached = cached(store);

        assert!(cached.scan_category(Category::Petrol).await.is_err());
        assert!(cached.scan_category(Category::Petrol).await.is_err());
    }
}

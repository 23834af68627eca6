//! Refresh configuration.

use std::str::FromStr;

/// Default cap on files examined per station folder.
pub const DEFAULT_MAX_FILES_PER_STATION: usize = 50;

/// What to report when the road distance lookup fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceFallback {
    /// Report the distance as `N/A`.
    #[default]
    NotAvailable,
    /// Report the straight-line (haversine) distance instead.
    Haversine,
}

impl FromStr for DistanceFallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "n/a" | "na" => Ok(DistanceFallback::NotAvailable),
            "haversine" => Ok(DistanceFallback::Haversine),
            other => Err(format!("unknown distance fallback: {other}")),
        }
    }
}

/// Configuration parameters for a station refresh.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Maximum number of files listed (and metadata fetches issued) per
    /// station folder. Bounds the latency of a category refresh.
    pub max_files_per_station: usize,

    /// Distance to report when the directions lookup fails.
    pub distance_fallback: DistanceFallback,
}

impl RefreshConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(max_files_per_station: usize, distance_fallback: DistanceFallback) -> Self {
        Self {
            max_files_per_station: max_files_per_station.max(1),
            distance_fallback,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            max_files_per_station: DEFAULT_MAX_FILES_PER_STATION,
            distance_fallback: DistanceFallback::NotAvailable,
        }
    }
}

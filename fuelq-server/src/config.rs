//! Application configuration from the environment.

use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::Coordinates;
use crate::refresh::{DEFAULT_MAX_FILES_PER_STATION, DistanceFallback};

/// Default map centre (Kolhapur).
pub const DEFAULT_MAP_CENTER: Coordinates = Coordinates {
    latitude: 16.7320901,
    longitude: 74.237955,
};

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Everything `main` needs to wire up the server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: SocketAddr,
    pub firebase_api_key: String,
    pub storage_bucket: String,
    pub database_url: String,
    /// Empty disables road distance lookups.
    pub ors_api_key: String,
    pub session_path: PathBuf,
    pub static_dir: PathBuf,
    pub max_files_per_station: usize,
    pub distance_fallback: DistanceFallback,
    pub scan_ttl: Duration,
    pub map_center: Coordinates,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value
    /// if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars { lookup };

        let ttl_secs: u64 = vars.parse_or("FUELQ_SCAN_TTL_SECS", 30)?;
        let map_center = match vars.get("FUELQ_MAP_CENTER") {
            Some(raw) => Coordinates::parse_pair(&raw).ok_or_else(|| {
                warn!("Invalid FUELQ_MAP_CENTER value: {raw}");
                ConfigError::Invalid {
                    key: "FUELQ_MAP_CENTER",
                    message: format!("expected \"lat,lon\", got {raw:?}"),
                }
            })?,
            None => DEFAULT_MAP_CENTER,
        };

        let ors_api_key = vars.get("ORS_API_KEY").unwrap_or_default();
        if ors_api_key.is_empty() {
            warn!("ORS_API_KEY not set, road distances disabled");
        }

        Ok(Self {
            addr: vars.parse_or("FUELQ_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?,
            firebase_api_key: vars.required("FIREBASE_API_KEY")?,
            storage_bucket: vars.required("FIREBASE_STORAGE_BUCKET")?,
            database_url: vars.required("FIREBASE_DATABASE_URL")?,
            ors_api_key,
            session_path: vars.parse_or("FUELQ_SESSION_PATH", PathBuf::from("fuelq_session.json"))?,
            static_dir: vars.parse_or("FUELQ_STATIC_DIR", PathBuf::from("static"))?,
            max_files_per_station: vars
                .parse_or("FUELQ_MAX_FILES_PER_STATION", DEFAULT_MAX_FILES_PER_STATION)?,
            distance_fallback: vars.parse_or("FUELQ_DISTANCE_FALLBACK", DistanceFallback::default())?,
            scan_ttl: Duration::from_secs(ttl_secs),
            map_center,
        })
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    /// A non-blank value, trimmed.
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or_else(|| {
            warn!("Environment variable {key} not set");
            ConfigError::Missing(key)
        })
    }

    fn parse_or<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr + std::fmt::Debug,
        T::Err: Display,
    {
        match self.get(key) {
            Some(raw) => raw.parse().map_err(|e: T::Err| {
                warn!("Invalid {key} value: {e}");
                ConfigError::Invalid {
                    key,
                    message: e.to_string(),
                }
            }),
            None => {
                info!("{key} not set, using default: {default:?}");
                Ok(default)
            }
        }
    }
}

use fuelq_server::account::AccountService;
use fuelq_server::auth::{AuthConfig, FirebaseAuth};
use fuelq_server::cache::{CacheConfig, CachedRefresher};
use fuelq_server::config::AppConfig;
use fuelq_server::directions::{DirectionsConfig, OpenRouteService};
use fuelq_server::realtime::{FirebaseDatabase, RealtimeConfig};
use fuelq_server::refresh::{RefreshConfig, StationRefresher};
use fuelq_server::session::SessionStore;
use fuelq_server::storage::{FirebaseStorage, StorageConfig};
use fuelq_server::web::{AppState, Firebase, create_router};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fuelq_server=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    // Station data
    let storage = FirebaseStorage::new(StorageConfig::new(&config.storage_bucket))
        .expect("Failed to create storage client");
    let directions = OpenRouteService::new(DirectionsConfig::new(&config.ors_api_key))
        .expect("Failed to create directions client");
    let refresher = StationRefresher::new(
        storage,
        directions,
        RefreshConfig::new(config.max_files_per_station, config.distance_fallback),
    );
    let stations = CachedRefresher::new(
        refresher,
        &CacheConfig::default().with_ttl(config.scan_ttl),
    );

    // Accounts
    let auth = FirebaseAuth::new(AuthConfig::new(&config.firebase_api_key))
        .expect("Failed to create auth client");
    let database = FirebaseDatabase::new(RealtimeConfig::new(&config.database_url))
        .expect("Failed to create database client");
    let session = SessionStore::new(&config.session_path);
    if session.load().is_logged_in {
        info!(path = %config.session_path.display(), "resuming saved session");
    }
    let accounts = AccountService::new(auth, database, session);

    let state: AppState<Firebase> = AppState::new(stations, accounts, config.map_center);
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .expect("Failed to bind address");
    info!("FuelQ listening on http://{}", config.addr);

    axum::serve(listener, app).await.expect("Server error");
}

//! Application state for the web layer.

use std::sync::Arc;

use crate::account::AccountService;
use crate::auth::{Authenticator, FirebaseAuth};
use crate::cache::CachedRefresher;
use crate::directions::{DistanceProvider, OpenRouteService};
use crate::domain::Coordinates;
use crate::realtime::{FirebaseDatabase, KeyValueStore};
use crate::refresh::StationBoard;
use crate::storage::{FirebaseStorage, ObjectStore};

/// The set of external services the app runs against.
pub trait Backend: Send + Sync + 'static {
    type Storage: ObjectStore + 'static;
    type Directions: DistanceProvider + 'static;
    type Auth: Authenticator + 'static;
    type Database: KeyValueStore + 'static;
}

/// Firebase for storage, accounts and data; OpenRouteService for roads.
pub struct Firebase;

impl Backend for Firebase {
    type Storage = FirebaseStorage;
    type Directions = OpenRouteService;
    type Auth = FirebaseAuth;
    type Database = FirebaseDatabase;
}

/// Shared application state.
///
/// Built once in `main` and handed to every handler.
pub struct AppState<B: Backend = Firebase> {
    /// Station refresher with its scan cache
    pub stations: Arc<CachedRefresher<B::Storage, B::Directions>>,

    /// Latest published station list per category
    pub board: Arc<StationBoard>,

    /// Login, signup, profile and reports
    pub accounts: Arc<AccountService<B::Auth, B::Database>>,

    /// Where the map opens
    pub map_center: Coordinates,
}

impl<B: Backend> AppState<B> {
    /// Create a new app state.
    pub fn new(
        stations: CachedRefresher<B::Storage, B::Directions>,
        accounts: AccountService<B::Auth, B::Database>,
        map_center: Coordinates,
    ) -> Self {
        Self {
            stations: Arc::new(stations),
            board: Arc::new(StationBoard::new()),
            accounts: Arc::new(accounts),
            map_center,
        }
    }
}

impl<B: Backend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            stations: self.stations.clone(),
            board: self.board.clone(),
            accounts: self.accounts.clone(),
            map_center: self.map_center,
        }
    }
}

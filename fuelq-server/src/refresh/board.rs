//! Published station lists and refresh generations.
//!
//! Every refresh of a category takes a [`RefreshToken`]. Starting another
//! refresh of the same category supersedes all earlier tokens, and results
//! carrying a superseded token are dropped instead of published. This keeps
//! a slow, stale refresh (say, from before the user toggled categories twice)
//! from overwriting a newer list.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::CachedRefresher;
use crate::directions::DistanceProvider;
use crate::domain::{Category, Coordinates, Station};
use crate::storage::ObjectStore;

use super::error::RefreshError;

/// Identifies one refresh of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshToken {
    pub category: Category,
    pub generation: u64,
}

/// A station list as last published for a category.
#[derive(Debug, Clone)]
pub struct Published {
    pub generation: u64,
    pub stations: Arc<Vec<Station>>,
    pub refreshed_at: DateTime<Utc>,
}

/// The latest station list of every category.
#[derive(Debug, Default)]
pub struct StationBoard {
    generations: [AtomicU64; 3],
    published: RwLock<HashMap<Category, Published>>,
}

impl StationBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a refresh, superseding any in flight for the same category.
    pub fn begin(&self, category: Category) -> RefreshToken {
        let generation = self.generations[category.index()].fetch_add(1, Ordering::SeqCst) + 1;
        RefreshToken {
            category,
            generation,
        }
    }

    /// Whether no newer refresh of the token's category has started.
    pub fn is_current(&self, token: &RefreshToken) -> bool {
        self.generations[token.category.index()].load(Ordering::SeqCst) == token.generation
    }

    /// Publish the result of a refresh, returning the record as stored.
    ///
    /// Fails with [`RefreshError::Superseded`] when a newer refresh of the
    /// category has started or already published.
    pub async fn publish(
        &self,
        token: RefreshToken,
        stations: Vec<Station>,
    ) -> Result<Published, RefreshError> {
        let superseded = RefreshError::Superseded {
            category: token.category,
        };

        let mut published = self.published.write().await;

        if !self.is_current(&token) {
            debug!(category = %token.category, generation = token.generation, "dropping stale refresh");
            return Err(superseded);
        }

        if let Some(existing) = published.get(&token.category) {
            if existing.generation > token.generation {
                return Err(superseded);
            }
        }

        let record = Published {
            generation: token.generation,
            stations: Arc::new(stations),
            refreshed_at: Utc::now(),
        };
        published.insert(token.category, record.clone());

        Ok(record)
    }

    /// The last published list of a category.
    pub async fn current(&self, category: Category) -> Option<Published> {
        let published = self.published.read().await;
        published.get(&category).cloned()
    }

    /// Refresh a category and publish the result.
    ///
    /// Gives up before the distance lookups if a newer refresh has started
    /// while storage was being scanned.
    pub async fn refresh<S: ObjectStore, D: DistanceProvider>(
        &self,
        refresher: &CachedRefresher<S, D>,
        category: Category,
        origin: Option<Coordinates>,
    ) -> Result<Published, RefreshError> {
        let token = self.begin(category);
        let scanned = refresher.scan_category(category).await?;

        if !self.is_current(&token) {
            return Err(RefreshError::Superseded { category });
        }

        let stations = refresher.attach_distances(&scanned, origin).await;
        self.publish(token, stations).await
    }
}

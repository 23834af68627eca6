//! Station list view.
//!
//! One view type serves every category: the category picks which published
//! list to read from the board and the query narrows it by name.

use crate::domain::{Category, Station};
use crate::refresh::StationBoard;

/// Stations whose name contains `query`, ignoring case, in original order.
///
/// An empty query keeps everything.
pub fn filter_by_name<'a>(stations: &'a [Station], query: &str) -> Vec<&'a Station> {
    let query = query.trim().to_lowercase();
    stations
        .iter()
        .filter(|s| query.is_empty() || s.name.to_lowercase().contains(&query))
        .collect()
}

/// What the station list is currently showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationListView {
    pub category: Category,
    pub query: String,
}

impl StationListView {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            query: String::new(),
        }
    }

    /// Narrow the list to names containing `query`.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Apply the query to a station list.
    pub fn apply(&self, stations: &[Station]) -> Vec<Station> {
        filter_by_name(stations, &self.query)
            .into_iter()
            .filter(|s| s.category == self.category)
            .cloned()
            .collect()
    }

    /// The filtered list from the board's last published refresh, or `None`
    /// if the category has not been refreshed yet.
    pub async fn render(&self, board: &StationBoard) -> Option<Vec<Station>> {
        let published = board.current(self.category).await?;
        Some(self.apply(&published.stations))
    }
}

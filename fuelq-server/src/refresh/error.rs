//! Refresh error types.

use crate::domain::Category;
use crate::storage::StorageError;

/// Errors that abort a whole category refresh.
///
/// Failures confined to one station never surface here; they turn that
/// station's wait time into `N/A` instead.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    /// The category folder itself could not be listed
    #[error("failed to list {category} stations: {source}")]
    Listing {
        category: Category,
        #[source]
        source: StorageError,
    },

    /// A newer refresh of the same category started before this one finished
    #[error("refresh of {category} superseded by a newer request")]
    Superseded { category: Category },
}
